use crate::pml::bytes::{ByteReader, ReadResult};
use crate::pml::consts::ProcessOperation;

use super::{DetailContext, DetailValue, EventDetails};

pub(super) fn decode(
    op: ProcessOperation,
    r: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    match op {
        ProcessOperation::ProcessDefined | ProcessOperation::ProcessCreate => {
            process_created(r, out)
        }
        ProcessOperation::ProcessStart => process_started(r, out),
        ProcessOperation::ProcessExit => process_exit(r, out),
        ProcessOperation::ThreadCreate => {
            out.details.insert("Thread ID", r.u32()?);
            Ok(())
        }
        ProcessOperation::ThreadExit => thread_exit(r, ctx, out),
        ProcessOperation::LoadImage => load_image(r, ctx, out),
        ProcessOperation::ThreadProfile
        | ProcessOperation::ProcessStatistics
        | ProcessOperation::SystemStatistics => Ok(()),
    }
}

fn process_created(r: &mut ByteReader<'_>, out: &mut EventDetails) -> ReadResult<()> {
    r.skip(4)?;
    out.details.insert("PID", r.u32()?);
    r.skip(0x24)?;
    let size1 = usize::from(r.u8()?);
    let size2 = usize::from(r.u8()?);
    let path_info = r.string_info()?;
    let command_line_info = r.string_info()?;
    r.skip(2 + size1 + size2)?;
    out.path = r.detail_string(path_info)?;
    out.details
        .insert("Command line", r.detail_string(command_line_info)?);
    Ok(())
}

fn process_started(r: &mut ByteReader<'_>, out: &mut EventDetails) -> ReadResult<()> {
    out.details.insert("Parent PID", r.u32()?);
    let command_line_info = r.string_info()?;
    let current_directory_info = r.string_info()?;
    let environment_chars = r.u32()? as usize;
    out.details
        .insert("Command line", r.detail_string(command_line_info)?);
    out.details
        .insert("Current directory", r.detail_string(current_directory_info)?);
    let environment = r.utf16_multisz(Some(environment_chars.saturating_mul(2)));
    out.details
        .insert("Environment", DetailValue::List(environment));
    Ok(())
}

fn process_exit(r: &mut ByteReader<'_>, out: &mut EventDetails) -> ReadResult<()> {
    let exit_status = r.u32()?;
    let kernel_time = r.u64()?;
    let user_time = r.u64()?;
    let working_set = r.u64()?;
    let peak_working_set = r.u64()?;
    let private_bytes = r.u64()?;
    let peak_private_bytes = r.u64()?;

    let d = &mut out.details;
    d.insert("Exit Status", exit_status);
    d.insert("User Time", DetailValue::Duration(user_time));
    d.insert("Kernel Time", DetailValue::Duration(kernel_time));
    d.insert("Private Bytes", private_bytes);
    d.insert("Peak Private Bytes", peak_private_bytes);
    d.insert("Working Set", working_set);
    d.insert("Peak Working Set", peak_working_set);
    Ok(())
}

fn thread_exit(
    r: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    out.details.insert("Thread ID", ctx.tid);
    r.skip(4)?;
    let kernel_time = r.u64()?;
    let user_time = r.u64()?;
    out.details.insert("User Time", DetailValue::Duration(user_time));
    out.details
        .insert("Kernel Time", DetailValue::Duration(kernel_time));
    Ok(())
}

fn load_image(
    r: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    out.details.insert("Image Base", r.pvoid(ctx.is_64bit)?);
    out.details.insert("Image Size", r.u32()?);
    let path_info = r.string_info()?;
    r.skip(2)?;
    out.path = r.detail_string(path_info)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pml::bytes::StringInfo;
    use crate::pml::details::tests_support::{context, info, utf16};

    #[test]
    fn load_image_reads_base_size_and_path() {
        let path = "C:\\Windows\\System32\\ntdll.dll";
        let mut region = Vec::new();
        region.extend_from_slice(&0x7ffa_0000_0000u64.to_le_bytes());
        region.extend_from_slice(&0x1f_0000u32.to_le_bytes());
        region.extend_from_slice(&info(path));
        region.extend_from_slice(&[0, 0]);
        region.extend_from_slice(&utf16(path));

        let ctx = context(true);
        let mut out = EventDetails::default();
        decode(ProcessOperation::LoadImage, &mut ByteReader::new(&region), &ctx, &mut out).unwrap();
        assert_eq!(out.path, "C:\\Windows\\System32\\ntdll.dll");
        assert_eq!(out.details.get("Image Base").and_then(DetailValue::as_u64), Some(0x7ffa_0000_0000));
        assert_eq!(out.details.get("Image Size").and_then(DetailValue::as_u64), Some(0x1f_0000));
    }

    #[test]
    fn thread_exit_uses_event_tid() {
        let mut region = vec![0u8; 4];
        region.extend_from_slice(&20_000_000u64.to_le_bytes());
        region.extend_from_slice(&5u64.to_le_bytes());
        let mut ctx = context(false);
        ctx.tid = 4242;
        let mut out = EventDetails::default();
        decode(ProcessOperation::ThreadExit, &mut ByteReader::new(&region), &ctx, &mut out).unwrap();
        let keys: Vec<&str> = out.details.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Thread ID", "User Time", "Kernel Time"]);
        assert_eq!(out.details.get("Thread ID").and_then(DetailValue::as_u64), Some(4242));
        assert_eq!(out.details.get("Kernel Time"), Some(&DetailValue::Duration(20_000_000)));
    }

    #[test]
    fn process_start_reads_environment() {
        let cmd = b"cmd.exe /c";
        let cwd = utf16("C:\\");
        let env = utf16("A=1\0B=2\0\0");
        let mut region = Vec::new();
        region.extend_from_slice(&100u32.to_le_bytes());
        region.extend_from_slice(&StringInfo { is_ascii: true, char_count: cmd.len() as u16 }.to_raw().to_le_bytes());
        region.extend_from_slice(&StringInfo { is_ascii: false, char_count: 3 }.to_raw().to_le_bytes());
        region.extend_from_slice(&((env.len() / 2) as u32).to_le_bytes());
        region.extend_from_slice(cmd);
        region.extend_from_slice(&cwd);
        region.extend_from_slice(&env);

        let mut out = EventDetails::default();
        decode(ProcessOperation::ProcessStart, &mut ByteReader::new(&region), &context(true), &mut out).unwrap();
        assert_eq!(out.details.get("Command line").and_then(DetailValue::as_str), Some("cmd.exe /c"));
        assert_eq!(out.details.get("Current directory").and_then(DetailValue::as_str), Some("C:\\"));
        assert_eq!(
            out.details.get("Environment"),
            Some(&DetailValue::List(vec!["A=1".into(), "B=2".into()]))
        );
    }
}
