//! File system details.
//!
//! Every file system detail region starts the same way: the sub-operation
//! byte, three bytes of padding, a window holding the IRP parameters
//! (`5 * pointer + 0x14` bytes), the path info word, two bytes of padding and
//! the path. Operation-specific fields are read either from the IRP window
//! or from what follows the path.

use crate::pml::bytes::{ByteReader, ReadResult};
use crate::pml::consts::{
    DirectoryControlOperation, FilesystemOperation, FilesystemSubOperation,
    SetInformationOperation, SubOperation, UNKNOWN_OPERATION,
};
use crate::pml::ioctl::control_code;
use crate::pml::masks::{
    CreateDisposition, OpenResult, create_options, file_access_mask, file_attributes,
    file_information_class, io_flags_and_priority, notify_filter, page_protection, share_mode,
    sync_type,
};

use super::{Category, DetailContext, DetailMap, DetailValue, EventDetails};

use FilesystemSubOperation as Sub;

pub(super) fn decode(
    op: FilesystemOperation,
    r: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    use FilesystemOperation as Op;

    let sub = FilesystemSubOperation::decode(op, r.u8()?);
    out.refined_operation = match sub {
        SubOperation::Known(s) => Some(s.name().to_owned()),
        SubOperation::Unknown(_) => {
            let name: &str = op.into();
            Some(format!("{name} {UNKNOWN_OPERATION}"))
        }
        SubOperation::None => None,
    };
    out.category = category(op, sub);

    r.skip(3)?;
    let mut irp = r.window(ctx.pointer_size() * 5 + 0x14)?;
    let path_info = r.string_info()?;
    r.skip(2)?;
    out.path = r.detail_string(path_info)?;

    match (op, sub) {
        (_, SubOperation::Known(Sub::DirectoryControl(DirectoryControlOperation::QueryDirectory))) => {
            query_directory(r, &mut irp, ctx, out)
        }
        (
            _,
            SubOperation::Known(Sub::DirectoryControl(
                DirectoryControlOperation::NotifyChangeDirectory,
            )),
        ) => notify_change_directory(r, &mut irp, ctx, out),
        _ if !ctx.full => Ok(()),
        (Op::CreateFile, _) => create_file(r, &mut irp, ctx, out),
        (Op::ReadFile | Op::WriteFile, _) => read_write(&mut irp, ctx, out),
        (Op::DeviceIoControl | Op::InternalDeviceIoControl | Op::FileSystemControl, _) => {
            io_control(&mut irp, ctx, out)
        }
        (
            _,
            SubOperation::Known(Sub::SetInformation(
                SetInformationOperation::SetDispositionInformationFile
                | SetInformationOperation::SetDispositionInformationEx,
            )),
        ) => {
            irp.skip(4)?;
            out.details.insert("Delete", irp.u8()? != 0);
            Ok(())
        }
        (Op::CreateFileMapping, _) => {
            irp.skip(0x0c)?;
            out.details.insert("SyncType", sync_type(irp.u32()?));
            out.details
                .insert("PageProtection", page_protection(irp.u32()?));
            Ok(())
        }
        _ => Ok(()),
    }
}

fn category(op: FilesystemOperation, sub: SubOperation) -> Category {
    use FilesystemOperation as Op;
    match (op, sub) {
        (Op::ReadFile, _) => Category::Read,
        (Op::WriteFile, _) => Category::Write,
        (
            Op::SetInformationFile,
            SubOperation::Known(Sub::SetInformation(
                SetInformationOperation::SetDispositionInformationFile
                | SetInformationOperation::SetDispositionInformationEx,
            )),
        ) => Category::Write,
        (
            Op::QueryOpen
            | Op::QueryInformationFile
            | Op::QueryEAFile
            | Op::QueryVolumeInformation
            | Op::QuerySecurityFile
            | Op::QueryFileQuota
            | Op::DirectoryControl,
            _,
        ) => Category::ReadMetadata,
        (
            Op::SetInformationFile
            | Op::SetEAFile
            | Op::SetVolumeInformation
            | Op::SetSecurityFile
            | Op::SetFileQuota,
            _,
        ) => Category::WriteMetadata,
        _ => Category::None,
    }
}

fn skip_pointer_padding(irp: &mut ByteReader<'_>, ctx: &DetailContext<'_>) -> ReadResult<()> {
    if ctx.is_64bit { irp.skip(4) } else { Ok(()) }
}

fn create_file(
    r: &mut ByteReader<'_>,
    irp: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    let desired_access = r.u32()?;
    let impersonating_sid_length = usize::from(r.u8()?);
    r.skip(3)?;

    irp.skip(0x10)?;
    skip_pointer_padding(irp, ctx)?;
    let disposition_and_options = irp.u32()?;
    skip_pointer_padding(irp, ctx)?;
    let attributes = u32::from(irp.u16()?);
    let share = u32::from(irp.u16()?);
    irp.skip(4 + ctx.pointer_size() * 2)?;
    let allocation = irp.u32()?;

    let disposition = CreateDisposition::from_repr(disposition_and_options >> 24);
    let options = create_options(disposition_and_options & 0x00ff_ffff);

    let d = &mut out.details;
    d.insert("Desired Access", file_access_mask(desired_access));
    d.insert(
        "Disposition",
        disposition.map_or(UNKNOWN_OPERATION, <&str>::from),
    );
    if !options.is_empty() {
        d.insert("Options", options);
    }
    d.insert("Attributes", file_attributes(attributes));
    d.insert("ShareMode", share_mode(share));
    if disposition.is_some_and(CreateDisposition::may_create) {
        d.insert("AllocationSize", allocation);
    } else {
        d.insert("AllocationSize", "n/a");
    }
    if impersonating_sid_length > 0 {
        if let Some(sid) = sid_string(r.bytes(impersonating_sid_length)?) {
            d.insert("Impersonating", sid);
        }
    }

    let raw_open_result = ctx.extra_reader().and_then(|mut extra| extra.u32().ok());
    let open_result = raw_open_result.and_then(OpenResult::from_repr);
    if raw_open_result.is_some() {
        d.insert(
            "OpenResult",
            open_result.map_or(UNKNOWN_OPERATION, <&str>::from),
        );
    }

    out.category = match (open_result, disposition) {
        (Some(OpenResult::Superseded | OpenResult::Created | OpenResult::Overwritten), _) => {
            Category::Write
        }
        (Some(_), _) | (None, Some(CreateDisposition::Open) | None) => out.category,
        (None, Some(_)) => Category::Write,
    };
    Ok(())
}

/// Renders a binary SID as `S-R-A-S1-S2...`.
fn sid_string(raw: &[u8]) -> Option<String> {
    let (&revision, rest) = raw.split_first()?;
    let (&count, rest) = rest.split_first()?;
    let authority = rest.get(..6)?;
    let subs = rest.get(6..6 + usize::from(count) * 4)?;

    let authority = authority
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let mut sid = format!("S-{revision}-{authority}");
    for chunk in subs.chunks_exact(4) {
        let sub = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        sid.push_str(&format!("-{sub}"));
    }
    Some(sid)
}

fn read_write(
    irp: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    irp.skip(4)?;
    let flags_and_priority = irp.u32()?;
    irp.skip(4)?;
    let mut length = irp.u32()?;
    skip_pointer_padding(irp, ctx)?;
    irp.skip(4)?;
    skip_pointer_padding(irp, ctx)?;
    let offset = irp.u64()?;

    if let Some(extra_length) = ctx.extra_reader().and_then(|mut extra| extra.u32().ok()) {
        length = extra_length;
    }

    let (flags, priority) = io_flags_and_priority(flags_and_priority);
    let d = &mut out.details;
    d.insert("Offset", offset);
    d.insert("Length", length);
    if !flags.is_empty() {
        d.insert("I/O Flags", flags);
    }
    if let Some(priority) = priority {
        d.insert("Priority", priority);
    }
    Ok(())
}

fn io_control(
    irp: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    irp.skip(8)?;
    let write_length = irp.u32()?;
    let read_length = irp.u32()?;
    skip_pointer_padding(irp, ctx)?;
    irp.skip(4)?;
    skip_pointer_padding(irp, ctx)?;
    let code = irp.u32()?;

    let d = &mut out.details;
    d.insert("Control", control_code(code));
    if write_length != 0 {
        d.insert("Write Length", write_length);
    }
    if read_length != 0 {
        d.insert("Read Length", read_length);
    }
    Ok(())
}

fn append_to_path(path: &mut String, name: &str) {
    if !path.ends_with('\\') {
        path.push('\\');
    }
    path.push_str(name);
}

/// Reads the optional directory name that follows the path.
fn trailing_name(r: &mut ByteReader<'_>) -> ReadResult<Option<String>> {
    if r.remaining() < 2 {
        return Ok(None);
    }
    let info = r.string_info()?;
    let name = r.detail_string(info)?;
    Ok((!name.is_empty()).then_some(name))
}

fn query_directory(
    r: &mut ByteReader<'_>,
    irp: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    let filter = trailing_name(r)?;
    if let Some(name) = &filter {
        append_to_path(&mut out.path, name);
        out.details.insert("Filter", name.as_str());
    }
    if !ctx.full {
        return Ok(());
    }

    irp.skip(0x10)?;
    skip_pointer_padding(irp, ctx)?;
    let class = irp.u32()?;
    out.details
        .insert("FileInformationClass", file_information_class(class));

    if let Some(extra) = ctx.extra_reader() {
        let first = if filter.is_some() { 0 } else { 1 };
        directory_entries(extra, class, first, &mut out.details)?;
    }
    Ok(())
}

/// Lists the names in a FILE_*_INFORMATION buffer chained by NextEntryOffset.
fn directory_entries(
    mut extra: ByteReader<'_>,
    class: u32,
    first: u32,
    d: &mut DetailMap,
) -> ReadResult<()> {
    const TIMES_SIZES_ATTRIBUTES: usize = 4 * 8 + 8 + 8 + 4;

    // fields between FileNameLength and FileName for each layout
    let tail = match class {
        1 => 0,
        2 => 4,
        3 => 4 + 1 + 1 + 24,
        12 => 0,
        37 => 4 + 1 + 1 + 24 + 2 + 8,
        38 => 4 + 4 + 8,
        _ => return Ok(()),
    };

    let mut index = first;
    let mut start = 0usize;
    loop {
        extra.seek(start)?;
        let next = extra.u32()? as usize;
        extra.skip(4)?;
        if class != 12 {
            extra.skip(TIMES_SIZES_ATTRIBUTES)?;
        }
        let name_length = extra.u32()? as usize;
        extra.skip(tail)?;
        let name = extra.utf16(name_length.min(extra.remaining()))?;
        d.insert(index.to_string(), name);
        index += 1;

        if next == 0 {
            break;
        }
        start += next;
        if start >= extra.len() {
            break;
        }
    }
    Ok(())
}

fn notify_change_directory(
    r: &mut ByteReader<'_>,
    irp: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    if let Some(name) = trailing_name(r)? {
        append_to_path(&mut out.path, &name);
    }
    if !ctx.full {
        return Ok(());
    }
    irp.skip(0x10)?;
    skip_pointer_padding(irp, ctx)?;
    out.details.insert("Filter", notify_filter(irp.u32()?));
    Ok(())
}
