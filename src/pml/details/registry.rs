use crate::pml::bytes::{ByteReader, ReadResult, StringInfo, decode_utf16, decode_utf16_multisz};
use crate::pml::consts::{RegistryOperation, RegistryType, registry_type_name};
use crate::pml::masks::{MAXIMUM_ALLOWED, registry_access_mask, registry_key_disposition};

use super::{Category, DetailContext, DetailValue, EventDetails};

/// Fields some operations carry between the path info word and the path.
#[derive(Default)]
struct Preamble {
    second_path_info: Option<StringInfo>,
    desired_access: Option<u32>,
    length: Option<u32>,
    index: Option<u32>,
    information_class: Option<u32>,
    reg_type: Option<u32>,
    data_length: Option<u32>,
}

pub(super) fn decode(
    op: RegistryOperation,
    r: &mut ByteReader<'_>,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    use RegistryOperation as Op;

    out.category = category(op);

    let path_info = r.string_info()?;
    let mut pre = Preamble::default();
    match op {
        Op::RegLoadKey | Op::RegRenameKey => {
            pre.second_path_info = Some(r.string_info()?);
        }
        Op::RegOpenKey | Op::RegCreateKey => {
            r.skip(2)?;
            pre.desired_access = Some(r.u32()?);
        }
        Op::RegQueryKey | Op::RegQueryValue => {
            r.skip(2)?;
            pre.length = Some(r.u32()?);
            pre.information_class = Some(r.u32()?);
        }
        Op::RegEnumValue | Op::RegEnumKey => {
            r.skip(2)?;
            pre.length = Some(r.u32()?);
            pre.index = Some(r.u32()?);
            pre.information_class = Some(r.u32()?);
        }
        Op::RegSetInfoKey => {
            r.skip(2)?;
            pre.information_class = Some(r.u32()?);
            r.skip(4)?;
            pre.length = Some(u32::from(r.u16()?));
            r.skip(2)?;
        }
        Op::RegSetValue => {
            r.skip(2)?;
            pre.reg_type = Some(r.u32()?);
            pre.length = Some(r.u32()?);
            pre.data_length = Some(r.u32()?);
        }
        _ => {}
    }

    out.path = r.detail_string(path_info)?;
    if !ctx.full {
        return Ok(());
    }

    match op {
        Op::RegOpenKey | Op::RegCreateKey => open_or_create(op, &pre, ctx, out),
        Op::RegQueryKey | Op::RegEnumKey => query_key(op, &pre, ctx, out),
        Op::RegQueryValue | Op::RegEnumValue => query_value(op, &pre, ctx, out),
        Op::RegSetValue => set_value(&pre, r, out),
        Op::RegSetInfoKey => set_info_key(&pre, r, out),
        Op::RegLoadKey | Op::RegRenameKey => {
            if let Some(info) = pre.second_path_info {
                let key = if op == Op::RegLoadKey { "Hive Path" } else { "New Name" };
                out.details.insert(key, r.detail_string(info)?);
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn category(op: RegistryOperation) -> Category {
    use RegistryOperation as Op;
    match op {
        Op::RegOpenKey
        | Op::RegQueryKey
        | Op::RegQueryValue
        | Op::RegEnumValue
        | Op::RegEnumKey
        | Op::RegQueryMultipleValueKey => Category::Read,
        Op::RegCreateKey
        | Op::RegSetValue
        | Op::RegDeleteKey
        | Op::RegDeleteValue
        | Op::RegFlushKey
        | Op::RegLoadKey
        | Op::RegUnloadKey
        | Op::RegRenameKey => Category::Write,
        Op::RegSetInfoKey | Op::RegSetKeySecurity => Category::WriteMetadata,
        Op::RegQueryKeySecurity => Category::ReadMetadata,
        Op::RegCloseKey => Category::None,
    }
}

fn open_or_create(
    op: RegistryOperation,
    pre: &Preamble,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    let desired = pre.desired_access.unwrap_or_default();
    out.details
        .insert("Desired Access", registry_access_mask(desired));

    let Some(mut extra) = ctx.extra_reader() else {
        return Ok(());
    };
    let granted = extra.u32()?;
    if desired & MAXIMUM_ALLOWED != 0 {
        out.details
            .insert("Granted Access", registry_access_mask(granted));
    }
    if op == RegistryOperation::RegCreateKey {
        out.details
            .insert("Disposition", registry_key_disposition(extra.u32()?));
    }
    Ok(())
}

fn key_information_class(class: u32) -> String {
    let name = match class {
        0 => "Basic",
        1 => "Node",
        2 => "Full",
        3 => "Name",
        4 => "Cached",
        5 => "Flags",
        6 => "Virtualization",
        7 => "HandleTags",
        8 => "TrustInformation",
        9 => "LayerInformation",
        _ => return format!("<Unknown: {class}>"),
    };
    name.to_owned()
}

/// Reads a counted UTF-16 name: u32 byte length, then the characters.
fn counted_name(r: &mut ByteReader<'_>) -> ReadResult<String> {
    let size = r.u32()? as usize;
    r.utf16(size.min(r.remaining()))
}

fn query_key(
    op: RegistryOperation,
    pre: &Preamble,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    let class = pre.information_class.unwrap_or_default();
    match (op, pre.index) {
        (RegistryOperation::RegEnumKey, Some(index)) => out.details.insert("Index", index),
        _ => out.details.insert("Query", key_information_class(class)),
    }

    let Some(mut extra) = ctx.extra_reader() else {
        if let Some(length) = pre.length {
            out.details.insert("Length", length);
        }
        return Ok(());
    };

    let d = &mut out.details;
    match class {
        // KEY_BASIC_INFORMATION
        0 => {
            d.insert("LastWriteTime", DetailValue::Time(extra.u64()?));
            extra.skip(4)?;
            d.insert("Name", counted_name(&mut extra)?);
        }
        // KEY_NODE_INFORMATION
        1 => {
            d.insert("LastWriteTime", DetailValue::Time(extra.u64()?));
            extra.skip(4 + 4 + 4)?;
            d.insert("Name", counted_name(&mut extra)?);
        }
        // KEY_FULL_INFORMATION
        2 => {
            d.insert("LastWriteTime", DetailValue::Time(extra.u64()?));
            extra.skip(4 + 4 + 4)?;
            d.insert("SubKeys", extra.u32()?);
            extra.skip(4 + 4)?;
            d.insert("Values", extra.u32()?);
        }
        3 => {
            d.insert("Name", counted_name(&mut extra)?);
        }
        // KEY_CACHED_INFORMATION
        4 => {
            d.insert("LastWriteTime", DetailValue::Time(extra.u64()?));
            extra.skip(4)?;
            d.insert("SubKeys", extra.u32()?);
            extra.skip(4)?;
            d.insert("Values", extra.u32()?);
        }
        5 => {
            d.insert("UserFlags", extra.u32()?);
        }
        7 => {
            d.insert("HandleTags", format!("0x{:x}", extra.u32()?));
        }
        _ => {}
    }
    Ok(())
}

fn query_value(
    op: RegistryOperation,
    pre: &Preamble,
    ctx: &DetailContext<'_>,
    out: &mut EventDetails,
) -> ReadResult<()> {
    if op == RegistryOperation::RegEnumValue {
        if let Some(index) = pre.index {
            out.details.insert("Index", index);
        }
    }

    let Some(mut extra) = ctx.extra_reader() else {
        if let Some(length) = pre.length {
            out.details.insert("Length", length);
        }
        return Ok(());
    };

    extra.skip(4)?;
    let reg_type = extra.u32()?;
    out.details.insert("Type", registry_type_name(reg_type).into_owned());

    let length = match pre.information_class.unwrap_or_default() {
        // KEY_VALUE_BASIC_INFORMATION
        0 => {
            out.details.insert("Name", counted_name(&mut extra)?);
            return Ok(());
        }
        // KEY_VALUE_FULL_INFORMATION, data offset is from the record start
        1 => {
            let data_offset = extra.u32()? as usize;
            let length = extra.u32()?;
            out.details.insert("Name", counted_name(&mut extra)?);
            extra.seek(data_offset)?;
            length
        }
        // KEY_VALUE_PARTIAL_INFORMATION
        2 => extra.u32()?,
        _ => return Ok(()),
    };

    out.details.insert("Length", length);
    if let Some(data) = registry_data(&mut extra, reg_type, length as usize)? {
        out.details.insert("Data", data);
    }
    Ok(())
}

fn set_value(pre: &Preamble, r: &mut ByteReader<'_>, out: &mut EventDetails) -> ReadResult<()> {
    let reg_type = pre.reg_type.unwrap_or_default();
    let length = pre.length.unwrap_or_default();
    out.details.insert("Type", registry_type_name(reg_type).into_owned());
    out.details.insert("Length", length);

    let bound = length.min(pre.data_length.unwrap_or_default()) as usize;
    if let Some(data) = registry_data(r, reg_type, bound)? {
        out.details.insert("Data", data);
    }
    Ok(())
}

fn set_info_key(pre: &Preamble, r: &mut ByteReader<'_>, out: &mut EventDetails) -> ReadResult<()> {
    let class = pre.information_class.unwrap_or_default();
    let class_name = match class {
        0 => "KeyWriteTimeInformation".to_owned(),
        1 => "KeyWow64FlagsInformation".to_owned(),
        2 => "KeyControlFlagsInformation".to_owned(),
        3 => "KeySetVirtualizationInformation".to_owned(),
        4 => "KeySetDebugInformation".to_owned(),
        5 => "KeySetHandleTagsInformation".to_owned(),
        6 => "KeySetLayerInformation".to_owned(),
        other => format!("<Unknown: {other}>"),
    };
    out.details.insert("KeySetInformationClass", class_name);
    out.details.insert("Length", pre.length.unwrap_or_default());

    if pre.length.unwrap_or_default() == 0 {
        return Ok(());
    }
    match class {
        0 => out
            .details
            .insert("LastWriteTime", DetailValue::Time(r.u64()?)),
        1 => out.details.insert("Wow64Flags", r.u32()?),
        2 => out.details.insert("UserFlags", r.u32()?),
        5 => out
            .details
            .insert("HandleTags", format!("0x{:x}", r.u32()?)),
        _ => {}
    }
    Ok(())
}

/// Decodes a value payload according to its registry type. The payload is
/// bounded by `length` and by what is left in `r`.
fn registry_data(
    r: &mut ByteReader<'_>,
    reg_type: u32,
    length: usize,
) -> ReadResult<Option<DetailValue>> {
    let n = length.min(r.remaining());
    if n == 0 {
        return Ok(None);
    }
    let raw = r.bytes(n)?;
    let value = match RegistryType::from_repr(reg_type) {
        Some(RegistryType::RegDword) if n >= 4 => {
            DetailValue::Number(u64::from(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])))
        }
        Some(RegistryType::RegDwordBigEndian) if n >= 4 => {
            DetailValue::Number(u64::from(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])))
        }
        Some(RegistryType::RegQword) if n >= 8 => {
            let mut word = [0u8; 8];
            word.copy_from_slice(&raw[..8]);
            DetailValue::Number(u64::from_le_bytes(word))
        }
        Some(RegistryType::RegSz | RegistryType::RegExpandSz | RegistryType::RegLink) => {
            DetailValue::Text(decode_utf16(raw))
        }
        Some(RegistryType::RegMultiSz) => DetailValue::List(decode_utf16_multisz(raw)),
        _ => DetailValue::Bytes(raw.to_vec()),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pml::details::tests_support::{context, info, utf16};

    fn region(op_fields: &[u8], path: &str, tail: &[u8]) -> Vec<u8> {
        let mut v = info(path).to_vec();
        v.extend_from_slice(op_fields);
        v.extend_from_slice(&utf16(path));
        v.extend_from_slice(tail);
        v
    }

    fn run(op: RegistryOperation, data: &[u8], extra: Option<&[u8]>) -> EventDetails {
        let mut ctx = context(true);
        ctx.extra = extra.map(|e| -> &'static [u8] { Box::leak(e.to_vec().into_boxed_slice()) });
        let mut out = EventDetails::default();
        decode(op, &mut ByteReader::new(data), &ctx, &mut out).unwrap();
        out
    }

    #[test]
    fn open_key_reads_access_and_is_read() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&0x20019u32.to_le_bytes());
        let out = run(RegistryOperation::RegOpenKey, &region(&fields, "HKLM\\Software", &[]), None);
        assert_eq!(out.path, "HKLM\\Software");
        assert_eq!(out.category, Category::Read);
        assert_eq!(out.details.get("Desired Access").and_then(DetailValue::as_str), Some("Read"));
        assert!(!out.details.contains_key("Granted Access"));
    }

    #[test]
    fn create_key_reads_disposition_from_extra() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&MAXIMUM_ALLOWED.to_le_bytes());
        let mut extra = 0x20019u32.to_le_bytes().to_vec();
        extra.extend_from_slice(&1u32.to_le_bytes());
        let out = run(RegistryOperation::RegCreateKey, &region(&fields, "HKCU\\X", &[]), Some(&extra));
        assert_eq!(out.category, Category::Write);
        assert_eq!(out.details.get("Granted Access").and_then(DetailValue::as_str), Some("Read"));
        assert_eq!(
            out.details.get("Disposition").and_then(DetailValue::as_str),
            Some("REG_CREATED_NEW_KEY")
        );
    }

    #[test]
    fn set_value_dword() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&4u32.to_le_bytes());
        fields.extend_from_slice(&4u32.to_le_bytes());
        fields.extend_from_slice(&4u32.to_le_bytes());
        let out = run(
            RegistryOperation::RegSetValue,
            &region(&fields, "HKLM\\Run\\v", &0xdead_beefu32.to_le_bytes()),
            None,
        );
        assert_eq!(out.details.get("Type").and_then(DetailValue::as_str), Some("REG_DWORD"));
        assert_eq!(out.details.get("Length").and_then(DetailValue::as_u64), Some(4));
        assert_eq!(out.details.get("Data").and_then(DetailValue::as_u64), Some(0xdead_beef));
    }

    #[test]
    fn set_value_binary_is_bounded_by_available_bytes() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&3u32.to_le_bytes());
        fields.extend_from_slice(&16u32.to_le_bytes());
        fields.extend_from_slice(&16u32.to_le_bytes());
        let out = run(RegistryOperation::RegSetValue, &region(&fields, "k", &[1, 2, 3]), None);
        assert_eq!(out.details.get("Data"), Some(&DetailValue::Bytes(vec![1, 2, 3])));
    }

    #[test]
    fn query_value_partial_information() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&0x100u32.to_le_bytes());
        fields.extend_from_slice(&2u32.to_le_bytes());
        let text = utf16("a\r\nb\0");
        let mut extra = vec![0u8; 4];
        extra.extend_from_slice(&1u32.to_le_bytes());
        extra.extend_from_slice(&(text.len() as u32).to_le_bytes());
        extra.extend_from_slice(&text);
        let out = run(RegistryOperation::RegQueryValue, &region(&fields, "k\\v", &[]), Some(&extra));
        assert_eq!(out.details.get("Type").and_then(DetailValue::as_str), Some("REG_SZ"));
        assert_eq!(out.details.get("Data").and_then(DetailValue::as_str), Some("a\r\nb"));
    }

    #[test]
    fn enum_value_full_information_seeks_to_data() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&0x100u32.to_le_bytes());
        fields.extend_from_slice(&3u32.to_le_bytes());
        fields.extend_from_slice(&1u32.to_le_bytes());
        let name = utf16("Path");
        let words = utf16("x\0y\0\0");
        let data_offset = 4 + 4 + 4 + 4 + 4 + name.len() + 2;
        let mut extra = vec![0u8; 4];
        extra.extend_from_slice(&7u32.to_le_bytes());
        extra.extend_from_slice(&(data_offset as u32).to_le_bytes());
        extra.extend_from_slice(&(words.len() as u32).to_le_bytes());
        extra.extend_from_slice(&(name.len() as u32).to_le_bytes());
        extra.extend_from_slice(&name);
        extra.extend_from_slice(&[0, 0]);
        extra.extend_from_slice(&words);
        let out = run(RegistryOperation::RegEnumValue, &region(&fields, "k", &[]), Some(&extra));
        let keys: Vec<&str> = out.details.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["Index", "Type", "Name", "Length", "Data"]);
        assert_eq!(out.details.get("Index").and_then(DetailValue::as_u64), Some(3));
        assert_eq!(
            out.details.get("Data"),
            Some(&DetailValue::List(vec!["x".into(), "y".into()]))
        );
    }

    #[test]
    fn query_key_without_extra_reports_length() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&0x40u32.to_le_bytes());
        fields.extend_from_slice(&7u32.to_le_bytes());
        let out = run(RegistryOperation::RegQueryKey, &region(&fields, "k", &[]), None);
        assert_eq!(out.details.get("Query").and_then(DetailValue::as_str), Some("HandleTags"));
        assert_eq!(out.details.get("Length").and_then(DetailValue::as_u64), Some(0x40));
    }

    #[test]
    fn rename_key_reads_new_name() {
        let new_name = "Renamed";
        let out = run(
            RegistryOperation::RegRenameKey,
            &region(&info(new_name), "HKCU\\Old", &utf16(new_name)),
            None,
        );
        assert_eq!(out.path, "HKCU\\Old");
        assert_eq!(out.details.get("New Name").and_then(DetailValue::as_str), Some("Renamed"));
    }

    #[test]
    fn unknown_type_renders_label() {
        let mut fields = vec![0, 0];
        fields.extend_from_slice(&99u32.to_le_bytes());
        fields.extend_from_slice(&0u32.to_le_bytes());
        fields.extend_from_slice(&0u32.to_le_bytes());
        let out = run(RegistryOperation::RegSetValue, &region(&fields, "k", &[]), None);
        assert_eq!(out.details.get("Type").and_then(DetailValue::as_str), Some("<Unknown: 99>"));
        assert!(!out.details.contains_key("Data"));
    }
}
