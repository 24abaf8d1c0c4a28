//! Names of the device and file system control codes Process Monitor prints
//! in the Control detail.

pub fn control_code_name(code: u32) -> Option<&'static str> {
    let name = match code {
        0x0009_0000 => "FSCTL_REQUEST_OPLOCK_LEVEL_1",
        0x0009_0004 => "FSCTL_REQUEST_OPLOCK_LEVEL_2",
        0x0009_0008 => "FSCTL_REQUEST_BATCH_OPLOCK",
        0x0009_000c => "FSCTL_OPLOCK_BREAK_ACKNOWLEDGE",
        0x0009_0010 => "FSCTL_OPBATCH_ACK_CLOSE_PENDING",
        0x0009_0014 => "FSCTL_OPLOCK_BREAK_NOTIFY",
        0x0009_0018 => "FSCTL_LOCK_VOLUME",
        0x0009_001c => "FSCTL_UNLOCK_VOLUME",
        0x0009_0020 => "FSCTL_DISMOUNT_VOLUME",
        0x0009_0028 => "FSCTL_IS_VOLUME_MOUNTED",
        0x0009_002c => "FSCTL_IS_PATHNAME_VALID",
        0x0009_0030 => "FSCTL_MARK_VOLUME_DIRTY",
        0x0009_003c => "FSCTL_GET_COMPRESSION",
        0x0009_005c => "FSCTL_REQUEST_FILTER_OPLOCK",
        0x0009_0060 => "FSCTL_FILESYSTEM_GET_STATISTICS",
        0x0009_0064 => "FSCTL_GET_NTFS_VOLUME_DATA",
        0x0009_006f => "FSCTL_GET_VOLUME_BITMAP",
        0x0009_0073 => "FSCTL_GET_RETRIEVAL_POINTERS",
        0x0009_0078 => "FSCTL_IS_VOLUME_DIRTY",
        0x0009_0098 => "FSCTL_SET_OBJECT_ID",
        0x0009_009c => "FSCTL_GET_OBJECT_ID",
        0x0009_00a0 => "FSCTL_DELETE_OBJECT_ID",
        0x0009_00a4 => "FSCTL_SET_REPARSE_POINT",
        0x0009_00a8 => "FSCTL_GET_REPARSE_POINT",
        0x0009_00ac => "FSCTL_DELETE_REPARSE_POINT",
        0x0009_00b3 => "FSCTL_ENUM_USN_DATA",
        0x0009_00bb => "FSCTL_READ_USN_JOURNAL",
        0x0009_00c0 => "FSCTL_CREATE_OR_GET_OBJECT_ID",
        0x0009_00c4 => "FSCTL_SET_SPARSE",
        0x0009_00e7 => "FSCTL_CREATE_USN_JOURNAL",
        0x0009_00eb => "FSCTL_READ_FILE_USN_DATA",
        0x0009_00f4 => "FSCTL_QUERY_USN_JOURNAL",
        0x0009_0120 => "FSCTL_FILE_PREFETCH",
        0x0009_0240 => "FSCTL_REQUEST_OPLOCK",
        0x0009_c040 => "FSCTL_SET_COMPRESSION",
        0x0011_0018 => "FSCTL_PIPE_WAIT",
        0x0011_400c => "FSCTL_PIPE_PEEK",
        0x0011_c017 => "FSCTL_PIPE_TRANSCEIVE",
        0x0011_0008 => "FSCTL_PIPE_LISTEN",
        0x0011_0004 => "FSCTL_PIPE_DISCONNECT",
        0x002d_1400 => "IOCTL_STORAGE_QUERY_PROPERTY",
        0x002d_4800 => "IOCTL_STORAGE_CHECK_VERIFY",
        0x0007_0000 => "IOCTL_DISK_GET_DRIVE_GEOMETRY",
        0x0007_0048 => "IOCTL_DISK_GET_PARTITION_INFO_EX",
        0x0007_0050 => "IOCTL_DISK_GET_DRIVE_LAYOUT_EX",
        0x0007_00a0 => "IOCTL_DISK_GET_DRIVE_GEOMETRY_EX",
        0x0007_4004 => "IOCTL_DISK_GET_PARTITION_INFO",
        0x0056_0000 => "IOCTL_VOLUME_GET_VOLUME_DISK_EXTENTS",
        0x004d_0008 => "IOCTL_MOUNTDEV_QUERY_DEVICE_NAME",
        0x004d_0000 => "IOCTL_MOUNTDEV_QUERY_UNIQUE_ID",
        0x006d_0008 => "IOCTL_MOUNTMGR_QUERY_POINTS",
        0x0001_201f => "IOCTL_AFD_SEND",
        0x0001_2017 => "IOCTL_AFD_RECV",
        0x0001_2047 => "IOCTL_AFD_SET_CONTEXT",
        0x0001_2003 => "IOCTL_AFD_BIND",
        0x0001_2007 => "IOCTL_AFD_CONNECT",
        0x0001_200b => "IOCTL_AFD_START_LISTEN",
        0x0001_2024 => "IOCTL_AFD_SELECT",
        0x0001_202b => "IOCTL_AFD_DISCONNECT",
        0x0001_2043 => "IOCTL_AFD_GET_CONTEXT",
        0x0001_207b => "IOCTL_AFD_GET_INFO",
        0x0001_203b => "IOCTL_AFD_SET_INFO",
        0x0001_201b => "IOCTL_AFD_RECV_DATAGRAM",
        0x0001_2023 => "IOCTL_AFD_SEND_DATAGRAM",
        0x0001_2087 => "IOCTL_AFD_EVENT_SELECT",
        0x0001_208b => "IOCTL_AFD_ENUM_NETWORK_EVENTS",
        0x0039_0008 => "IOCTL_KSEC_RANDOM_FILL_BUFFER",
        _ => return None,
    };
    Some(name)
}

/// Control column text: the code's name when known, its hex value otherwise.
pub fn control_code(code: u32) -> String {
    control_code_name(code).map_or_else(|| format!("0x{code:x}"), str::to_owned)
}
