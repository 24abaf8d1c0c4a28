//! Event classes, operations and sub-operations as Process Monitor names
//! them, plus the NTSTATUS texts it prints in the Result column.

use std::borrow::Cow;

use serde::Serialize;
use strum::{FromRepr, IntoStaticStr};

/// Name shown for operation or sub-operation codes this decoder does not know.
pub const UNKNOWN_OPERATION: &str = "<Unknown>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr, Serialize)]
#[repr(u32)]
pub enum EventClass {
    Unknown = 0,
    Process = 1,
    Registry = 2,
    #[strum(serialize = "File System")]
    #[serde(rename = "File System")]
    FileSystem = 3,
    Profiling = 4,
    Network = 5,
}

impl EventClass {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u16)]
pub enum ProcessOperation {
    #[strum(serialize = "Process Defined")]
    ProcessDefined = 0,
    #[strum(serialize = "Process Create")]
    ProcessCreate = 1,
    #[strum(serialize = "Process Exit")]
    ProcessExit = 2,
    #[strum(serialize = "Thread Create")]
    ThreadCreate = 3,
    #[strum(serialize = "Thread Exit")]
    ThreadExit = 4,
    #[strum(serialize = "Load Image")]
    LoadImage = 5,
    #[strum(serialize = "Thread Profile")]
    ThreadProfile = 6,
    #[strum(serialize = "Process Start")]
    ProcessStart = 7,
    #[strum(serialize = "Process Statistics")]
    ProcessStatistics = 8,
    #[strum(serialize = "System Statistics")]
    SystemStatistics = 9,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u16)]
pub enum RegistryOperation {
    RegOpenKey = 0,
    RegCreateKey = 1,
    RegCloseKey = 2,
    RegQueryKey = 3,
    RegSetValue = 4,
    RegQueryValue = 5,
    RegEnumValue = 6,
    RegEnumKey = 7,
    RegSetInfoKey = 8,
    RegDeleteKey = 9,
    RegDeleteValue = 10,
    RegFlushKey = 11,
    RegLoadKey = 12,
    RegUnloadKey = 13,
    RegRenameKey = 14,
    RegQueryMultipleValueKey = 15,
    RegSetKeySecurity = 16,
    RegQueryKeySecurity = 17,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u16)]
pub enum FilesystemOperation {
    VolumeDismount = 0,
    VolumeMount = 1,
    #[strum(serialize = "FASTIO_MDL_WRITE_COMPLETE")]
    FastIoMdlWriteComplete = 2,
    WriteFile2 = 3,
    #[strum(serialize = "FASTIO_MDL_READ_COMPLETE")]
    FastIoMdlReadComplete = 4,
    ReadFile2 = 5,
    QueryOpen = 6,
    #[strum(serialize = "FASTIO_CHECK_IF_POSSIBLE")]
    FastIoCheckIfPossible = 7,
    #[strum(serialize = "IRP_MJ_12")]
    IrpMj12 = 8,
    #[strum(serialize = "IRP_MJ_11")]
    IrpMj11 = 9,
    #[strum(serialize = "IRP_MJ_10")]
    IrpMj10 = 10,
    #[strum(serialize = "IRP_MJ_9")]
    IrpMj9 = 11,
    #[strum(serialize = "IRP_MJ_8")]
    IrpMj8 = 12,
    #[strum(serialize = "FASTIO_NOTIFY_STREAM_FO_CREATION")]
    FastIoNotifyStreamFoCreation = 13,
    #[strum(serialize = "FASTIO_RELEASE_FOR_CC_FLUSH")]
    FastIoReleaseForCcFlush = 14,
    #[strum(serialize = "FASTIO_ACQUIRE_FOR_CC_FLUSH")]
    FastIoAcquireForCcFlush = 15,
    #[strum(serialize = "FASTIO_RELEASE_FOR_MOD_WRITE")]
    FastIoReleaseForModWrite = 16,
    #[strum(serialize = "FASTIO_ACQUIRE_FOR_MOD_WRITE")]
    FastIoAcquireForModWrite = 17,
    #[strum(serialize = "FASTIO_RELEASE_FOR_SECTION_SYNCHRONIZATION")]
    FastIoReleaseForSectionSynchronization = 18,
    CreateFileMapping = 19,
    CreateFile = 20,
    CreatePipe = 21,
    #[strum(serialize = "IRP_MJ_CLOSE")]
    IrpMjClose = 22,
    ReadFile = 23,
    WriteFile = 24,
    QueryInformationFile = 25,
    SetInformationFile = 26,
    QueryEAFile = 27,
    SetEAFile = 28,
    FlushBuffersFile = 29,
    QueryVolumeInformation = 30,
    SetVolumeInformation = 31,
    DirectoryControl = 32,
    FileSystemControl = 33,
    DeviceIoControl = 34,
    InternalDeviceIoControl = 35,
    Shutdown = 36,
    LockUnlockFile = 37,
    CloseFile = 38,
    CreateMailSlot = 39,
    QuerySecurityFile = 40,
    SetSecurityFile = 41,
    Power = 42,
    SystemControl = 43,
    DeviceChange = 44,
    QueryFileQuota = 45,
    SetFileQuota = 46,
    PlugAndPlay = 47,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u16)]
pub enum ProfilingOperation {
    #[strum(serialize = "Thread Profiling")]
    ThreadProfiling = 0,
    #[strum(serialize = "Process Profiling")]
    ProcessProfiling = 1,
    #[strum(serialize = "Debug Output Profiling")]
    DebugOutputProfiling = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u16)]
pub enum NetworkOperation {
    Unknown = 0,
    Other = 1,
    Send = 2,
    Receive = 3,
    Accept = 4,
    Connect = 5,
    Disconnect = 6,
    Reconnect = 7,
    Retransmit = 8,
    #[strum(serialize = "TCPCopy")]
    TcpCopy = 9,
}

/// The generic operation of an event, resolved against its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Process(ProcessOperation),
    Registry(RegistryOperation),
    FileSystem(FilesystemOperation),
    Profiling(ProfilingOperation),
    Network(NetworkOperation),
    /// A code the class does not define, or any code of the unknown class.
    Unknown(u16),
}

impl Operation {
    pub fn decode(class: EventClass, code: u16) -> Self {
        let known = match class {
            EventClass::Process => ProcessOperation::from_repr(code).map(Self::Process),
            EventClass::Registry => RegistryOperation::from_repr(code).map(Self::Registry),
            EventClass::FileSystem => FilesystemOperation::from_repr(code).map(Self::FileSystem),
            EventClass::Profiling => ProfilingOperation::from_repr(code).map(Self::Profiling),
            EventClass::Network => NetworkOperation::from_repr(code).map(Self::Network),
            EventClass::Unknown => None,
        };
        known.unwrap_or(Self::Unknown(code))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Process(op) => op.into(),
            Self::Registry(op) => op.into(),
            Self::FileSystem(op) => op.into(),
            Self::Profiling(op) => op.into(),
            Self::Network(op) => op.into(),
            Self::Unknown(_) => UNKNOWN_OPERATION,
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum QueryVolumeInformationOperation {
    QueryInformationVolume = 0x1,
    QueryLabelInformationVolume = 0x2,
    QuerySizeInformationVolume = 0x3,
    QueryDeviceInformationVolume = 0x4,
    QueryAttributeInformationVolume = 0x5,
    QueryControlInformationVolume = 0x6,
    QueryFullSizeInformationVolume = 0x7,
    QueryObjectIdInformationVolume = 0x8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum SetVolumeInformationOperation {
    SetControlInformationVolume = 0x1,
    SetLabelInformationVolume = 0x2,
    SetObjectIdInformationVolume = 0x8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum QueryInformationOperation {
    QueryBasicInformationFile = 0x4,
    QueryStandardInformationFile = 0x5,
    QueryFileInternalInformationFile = 0x6,
    QueryEaInformationFile = 0x7,
    QueryNameInformationFile = 0x9,
    QueryPositionInformationFile = 0xe,
    QueryAllInformationFile = 0x12,
    QueryEndOfFile = 0x14,
    QueryStreamInformationFile = 0x16,
    QueryCompressionInformationFile = 0x1c,
    QueryId = 0x1d,
    QueryMoveClusterInformationFile = 0x1f,
    QueryNetworkOpenInformationFile = 0x22,
    QueryAttributeTagFile = 0x23,
    QueryIdBothDirectory = 0x25,
    QueryValidDataLength = 0x27,
    QueryShortNameInformationFile = 0x28,
    QueryIoPiorityHint = 0x2b,
    QueryLinks = 0x2e,
    QueryNormalizedNameInformationFile = 0x30,
    QueryNetworkPhysicalNameInformationFile = 0x31,
    QueryIdGlobalTxDirectoryInformation = 0x32,
    QueryIsRemoteDeviceInformation = 0x33,
    QueryAttributeCacheInformation = 0x34,
    QueryNumaNodeInformation = 0x35,
    QueryStandardLinkInformation = 0x36,
    QueryRemoteProtocolInformation = 0x37,
    QueryRenameInformationBypassAccessCheck = 0x38,
    QueryLinkInformationBypassAccessCheck = 0x39,
    QueryVolumeNameInformation = 0x3a,
    QueryIdInformation = 0x3b,
    QueryIdExtdDirectoryInformation = 0x3c,
    QueryHardLinkFullIdInformation = 0x3e,
    QueryIdExtdBothDirectoryInformation = 0x3f,
    QueryDesiredStorageClassInformation = 0x43,
    QueryStatInformation = 0x44,
    QueryMemoryPartitionInformation = 0x45,
    QueryCaseSensitiveInformation = 0x47,
    QueryStorageReservedIdInformation = 0x4a,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum SetInformationOperation {
    SetBasicInformationFile = 0x4,
    SetRenameInformationFile = 0xa,
    SetLinkInformationFile = 0xb,
    SetDispositionInformationFile = 0xd,
    SetPositionInformationFile = 0xe,
    SetAllocationInformationFile = 0x13,
    SetEndOfFileInformationFile = 0x14,
    SetFileStreamInformation = 0x16,
    SetPipeInformation = 0x17,
    SetValidDataLengthInformationFile = 0x27,
    SetShortNameInformation = 0x28,
    SetReplaceCompletionInformation = 0x3d,
    SetDispositionInformationEx = 0x40,
    SetRenameInformationEx = 0x41,
    SetRenameInformationExBypassAccessCheck = 0x42,
    SetStorageReservedIdInformation = 0x4a,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum DirectoryControlOperation {
    QueryDirectory = 0x1,
    NotifyChangeDirectory = 0x2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum PnpOperation {
    StartDevice = 0x0,
    QueryRemoveDevice = 0x1,
    RemoveDevice = 0x2,
    CancelRemoveDevice = 0x3,
    StopDevice = 0x4,
    QueryStopDevice = 0x5,
    CancelStopDevice = 0x6,
    QueryDeviceRelations = 0x7,
    QueryInterface = 0x8,
    QueryCapabilities = 0x9,
    QueryResources = 0xa,
    QueryResourceRequirements = 0xb,
    QueryDeviceText = 0xc,
    FilterResourceRequirements = 0xd,
    ReadConfig = 0xf,
    WriteConfig = 0x10,
    Eject = 0x11,
    SetLock = 0x12,
    QueryId2 = 0x13,
    QueryPnpDeviceState = 0x14,
    QueryBusInformation = 0x15,
    DeviceUsageNotification = 0x16,
    SurpriseRemoval = 0x17,
    QueryLegacyBusInformation = 0x18,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum LockUnlockOperation {
    LockFile = 0x1,
    UnlockFileSingle = 0x2,
    UnlockFileAll = 0x3,
    UnlockFileByKey = 0x4,
}

/// Refinement of a file system operation by the leading detail byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilesystemSubOperation {
    QueryVolumeInformation(QueryVolumeInformationOperation),
    SetVolumeInformation(SetVolumeInformationOperation),
    QueryInformation(QueryInformationOperation),
    SetInformation(SetInformationOperation),
    DirectoryControl(DirectoryControlOperation),
    PlugAndPlay(PnpOperation),
    LockUnlock(LockUnlockOperation),
}

/// Outcome of looking a sub-operation byte up for a given operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubOperation {
    /// The operation has no sub-operations, or the byte is zero.
    None,
    Known(FilesystemSubOperation),
    /// The operation has sub-operations but this value is not one of them.
    Unknown(u8),
}

impl FilesystemSubOperation {
    pub fn decode(operation: FilesystemOperation, raw: u8) -> SubOperation {
        use FilesystemOperation as Op;

        if raw == 0 {
            return SubOperation::None;
        }
        let known = match operation {
            Op::QueryVolumeInformation => {
                QueryVolumeInformationOperation::from_repr(raw).map(Self::QueryVolumeInformation)
            }
            Op::SetVolumeInformation => {
                SetVolumeInformationOperation::from_repr(raw).map(Self::SetVolumeInformation)
            }
            Op::QueryInformationFile => {
                QueryInformationOperation::from_repr(raw).map(Self::QueryInformation)
            }
            Op::SetInformationFile => {
                SetInformationOperation::from_repr(raw).map(Self::SetInformation)
            }
            Op::DirectoryControl => {
                DirectoryControlOperation::from_repr(raw).map(Self::DirectoryControl)
            }
            Op::PlugAndPlay => PnpOperation::from_repr(raw).map(Self::PlugAndPlay),
            Op::LockUnlockFile => LockUnlockOperation::from_repr(raw).map(Self::LockUnlock),
            _ => return SubOperation::None,
        };
        known.map_or(SubOperation::Unknown(raw), SubOperation::Known)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::QueryVolumeInformation(op) => op.into(),
            Self::SetVolumeInformation(op) => op.into(),
            Self::QueryInformation(op) => op.into(),
            Self::SetInformation(op) => op.into(),
            Self::DirectoryControl(op) => op.into(),
            Self::PlugAndPlay(op) => op.into(),
            Self::LockUnlock(op) => op.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum RegistryType {
    RegNone = 0,
    RegSz = 1,
    RegExpandSz = 2,
    RegBinary = 3,
    RegDword = 4,
    RegDwordBigEndian = 5,
    RegLink = 6,
    RegMultiSz = 7,
    RegResourceList = 8,
    RegFullResourceDescriptor = 9,
    RegResourceRequirementsList = 10,
    RegQword = 11,
}

/// Type detail text; unrecognised tags render as `<Unknown: N>`.
pub fn registry_type_name(raw: u32) -> Cow<'static, str> {
    match RegistryType::from_repr(raw) {
        Some(t) => Cow::Borrowed(t.into()),
        None => Cow::Owned(format!("<Unknown: {raw}>")),
    }
}

/// Result column text for an NTSTATUS value.
pub fn result_message(status: u32) -> Cow<'static, str> {
    let known = match status {
        0 => "SUCCESS",
        0x103 => "",
        0x104 => "REPARSE",
        0x105 => "MORE ENTRIES",
        0x108 => "OPLOCK BREAK IN PROGRESS",
        0x10b => "NOTIFY CLEANUP",
        0x10c => "NOTIFY ENUM DIR",
        0x12a => "FILE LOCKED WITH ONLY READERS",
        0x12b => "FILE LOCKED WITH WRITERS",
        0x215 => "OPLOCK SWITCHED TO NEW HANDLE",
        0x216 => "OPLOCK HANDLE CLOSED",
        0x367 => "WAIT FOR OPLOCK",
        0x4000_0016 => "PREDEFINED HANDLE",
        0x8000_0002 => "DATATYPE_MISALIGNMENT",
        0x8000_0005 => "BUFFER_OVERFLOW",
        0x8000_0006 => "NO_MORE_FILES",
        0x8000_0015 => "INVALID_EA_FLAG",
        0x8000_001a => "NO_MORE_ENTRIES",
        0xc000_0001 => "UNSUCCESSFUL",
        0xc000_0002 => "NOT IMPLEMENTED",
        0xc000_0003 => "INVALID INFO CLASS",
        0xc000_0004 => "INFO LENGTH MISMATCH",
        0xc000_0005 => "ACCESS VIOLATION",
        0xc000_0006 => "IN PAGE ERROR",
        0xc000_0008 => "INVALID HANDLE",
        0xc000_000d => "INVALID PARAMETER",
        0xc000_000e => "NO SUCH DEVICE",
        0xc000_000f => "NO SUCH FILE",
        0xc000_0010 => "INVALID DEVICE REQUEST",
        0xc000_0011 => "END OF FILE",
        0xc000_0012 => "WRONG VOLUME",
        0xc000_0013 => "NO MEDIA",
        0xc000_0015 => "NONEXISTENT SECTOR",
        0xc000_0017 => "NO MEMORY",
        0xc000_0021 => "ALREADY COMMITED",
        0xc000_0022 => "ACCESS DENIED",
        0xc000_0023 => "ALREADY COMMITED",
        0xc000_0024 => "BUFFER TO SMALL",
        0xc000_0032 => "DISK CORRUPT",
        0xc000_0033 => "NAME INVALID",
        0xc000_0034 => "NAME NOT FOUND",
        0xc000_0035 => "NAME COLLISION",
        0xc000_0039 => "OBJECT PATH INVALID",
        0xc000_003a => "PATH NOT FOUND",
        0xc000_003b => "PATH SYNTAX BAD",
        0xc000_003c => "DATA OVERRUN",
        0xc000_003f => "CRC ERROR",
        0xc000_0043 => "SHARING VIOLATION",
        0xc000_0044 => "QUOTA EXCEEDED",
        0xc000_004f => "EAS NOT SUPPORTED",
        0xc000_0050 => "EA TOO LARGE",
        0xc000_0051 => "NONEXISTENT EA ENTRY",
        0xc000_0052 => "NO EAS ON FILE",
        0xc000_0053 => "EA CORRUPTED ERROR",
        0xc000_0054 => "FILE LOCK CONFLICT",
        0xc000_0055 => "NOT GRANTED",
        0xc000_0056 => "DELETE PENDING",
        0xc000_0061 => "PRIVILEGE NOT HELD",
        0xc000_006d => "LOGON FAILURE",
        0xc000_007e => "RANGE NOT LOCKED",
        0xc000_007f => "DISK FULL",
        0xc000_0098 => "FILE INVALID",
        0xc000_009a => "INSUFFICIENT RESOURCES",
        0xc000_009c => "DEVICE DATA ERROR",
        0xc000_009d => "DEVICE NOT CONNECTED",
        0xc000_00a2 => "MEDIA WRITE PROTECTED",
        0xc000_00a5 => "BAD IMPERSONATION",
        0xc000_00ab => "INSTANCE NOT AVAILABLE",
        0xc000_00ac => "PIPE NOT AVAILABLE",
        0xc000_00ad => "INVALID PIPE STATE",
        0xc000_00ae => "PIPE BUSY",
        0xc000_00b0 => "PIPE DISCONNECTED",
        0xc000_00b1 => "PIPE CLOSING",
        0xc000_00b2 => "PIPE CONNECTED",
        0xc000_00b3 => "PIPE LISTENING",
        0xc000_00b4 => "INVALID READ MODE",
        0xc000_00b5 => "IO TIMEOUT",
        0xc000_00ba => "IS DIRECTORY",
        0xc000_00bb => "NOT SUPPORTED",
        0xc000_00bd => "DUPLICATE NAME",
        0xc000_00be | 0xc000_00c1 => "BAD NETWORK PATH",
        0xc000_00c3 => "INVALID NETWORK RESPONSE",
        0xc000_00c4 => "NETWORK ERROR",
        0xc000_00cc | 0xc000_00d4 => "BAD NETWORK NAME",
        0xc000_00d8 => "CANT WAIT",
        0xc000_00d9 => "PIPE EMPTY",
        0xc000_00db => "CSC OBJECT PATH NOT FOUND",
        0xc000_00e2 => "OPLOCK NOT GRANTED",
        0xc000_00ef => "INVALID PARAMETER 1",
        0xc000_00f0 => "INVALID PARAMETER 2",
        0xc000_00f1 => "INVALID PARAMETER 3",
        0xc000_00f2 => "INVALID PARAMETER 4",
        0xc000_00fb => "REDIRECTOR NOT STARTED",
        0xc000_0101 => "NOT EMPTY",
        0xc000_0102 => "FILE CORRUPT",
        0xc000_0103 => "NOT A DIRECTORY",
        0xc000_0107 => "FILES OPEN",
        0xc000_010d => "CANNOT IMPERSONATE",
        0xc000_0120 => "CANCELLED",
        0xc000_0121 => "CANNOT DELETE",
        0xc000_0123 => "FILE DELETED",
        0xc000_0128 => "FILE CLOSED",
        0xc000_012a => "THREAD NOT IN PROCESS",
        0xc000_0148 => "INVALID LEVEL",
        0xc000_014b => "PIPE BROKEN",
        0xc000_014c => "REGISTRY CORRUPT",
        0xc000_014d => "IO FAILED",
        0xc000_017c => "KEY DELETED",
        0xc000_0181 => "CHILD MUST BE VOLATILE",
        0xc000_0184 => "INVALID DEVICE STATE",
        0xc000_0185 => "IO DEVICE ERROR",
        0xc000_0188 => "LOG FILE FULL",
        0xc000_019c => "FS DRIVER REQUIRED",
        0xc000_0205 => "INSUFFICIENT SERVER RESOURCES",
        0xc000_0207 => "INVALID ADDRESS COMPONENT",
        0xc000_020c => "DISCONNECTED",
        0xc000_0225 => "NOT FOUND",
        0xc000_0243 => "USER MAPPED FILE",
        0xc000_0248 => "LOGIN WKSTA RESTRICTION",
        0xc000_0257 => "PATH NOT COVERED",
        0xc000_026d => "DFS UNAVAILABLE",
        0xc000_0273 => "NO MORE MATCHES",
        0xc000_0275 => "NOT REPARSE POINT",
        0xc000_02ea => "CANNOT MAKE",
        0xc000_02f0 => "OBJECTID NOT FOUND",
        0xc000_0388 => "DOWNGRADE DETECTED",
        0xc000_0425 => "HIVE UNLOADED",
        0xc000_0427 => "FILE SYSTEM LIMITATION",
        0xc000_0463 => "DEVICE FEATURE NOT SUPPORTED",
        0xc000_046d => "OBJECT NOT EXTERNALLY BACKED",
        0xc000_0909 => "CANNOT BREAK OPLOCK",
        0xc000_a2a1 => "STATUS_OFFLOAD_READ_FLT_NOT_SUPPORTED",
        0xc000_a2a2 => "STATUS_OFFLOAD_WRITE_FLT_NOT_SUPPORTED",
        0xc000_a2a3 | 0xc000_a2a4 => "OFFLOAD READ FILE NOT SUPPORTED",
        0xc019_0001 => "TRANSACTIONAL CONFLICT",
        0xc019_0002 => "INVALID TRANSACTION",
        0xc019_0003 => "TRANSACTION_NOT_ACTIVE",
        0xc019_003e => "EFS NOT ALLOWED IN TRANSACTION",
        0xc019_003f => "TRANSACTIONAL OPEN NOT ALLOWED",
        0xc019_0040 => "TRANSACTED MAPPING UNSUPPORTED REMOTE",
        0xc019_0044 => "CANNOT EXECUTE FILE IN TRANSACTION",
        0xc019_0049 => "SPARSE NOT ALLOWED IN TRANSACTION",
        0xc01c_0004 => "FAST IO DISALLOWED",
        _ => return Cow::Owned(format!("0x{status:X}")),
    };
    Cow::Borrowed(known)
}
