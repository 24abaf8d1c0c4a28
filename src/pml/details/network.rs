use crate::pml::bytes::{ByteReader, ReadResult};
use crate::pml::consts::NetworkOperation;

use super::{DetailContext, EventDetails};

const SOURCE_IPV4: u16 = 0x1;
const DESTINATION_IPV4: u16 = 0x2;
const TCP: u16 = 0x4;

/// Network details: protocol prefix, `Length`, a `src:port -> dst:port`
/// path and the free-form key/value pairs the driver appends.
pub(super) fn decode(
    op: NetworkOperation,
    r: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    let flags = r.u16()?;
    let is_tcp = flags & TCP != 0;
    let name: &str = op.into();
    out.refined_operation = Some(format!("{} {name}", if is_tcp { "TCP" } else { "UDP" }));

    r.skip(2)?;
    let length = r.u32()?;
    let source: [u8; 16] = r.array()?;
    let destination: [u8; 16] = r.array()?;
    let source_port = r.u16()?;
    let destination_port = r.u16()?;

    out.path = format!(
        "{}:{} -> {}:{}",
        ctx.hosts.lookup(&source, flags & SOURCE_IPV4 != 0),
        ctx.ports.lookup(source_port, is_tcp),
        ctx.hosts.lookup(&destination, flags & DESTINATION_IPV4 != 0),
        ctx.ports.lookup(destination_port, is_tcp),
    );

    out.details.insert("Length", length);
    let words = r.utf16_multisz(None);
    for pair in words.chunks_exact(2) {
        out.details.insert(pair[0].as_str(), pair[1].as_str());
    }
    Ok(())
}
