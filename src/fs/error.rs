use std::fmt;

/// 文件系统错误类型
#[derive(Debug)]
pub enum FileSystemError {
    Io(std::io::Error),     // 底层 I/O 错误
    AlreadyExists(String),  // 文件名已存在
    NotFound(String),       // 文件不存在
    InodeFull,              // 没有空闲 inode 槽位
    DiskFull,               // 没有空闲数据块
    ContentTooLarge { len: usize, limit: usize }, // 内容超过单块大小
    Corrupted(String),      // 元数据与磁盘内容不一致
    InvalidBlock(usize),    // 块号越界
    InvalidName(String),    // 文件名非法
    InvalidConfig(String),  // 卷参数非法
    Decode(String),         // 传输编码（base64）解析失败
    Protocol(String),       // 命令格式错误或未知命令
}

impl From<std::io::Error> for FileSystemError {
    fn from(e: std::io::Error) -> Self {
        FileSystemError::Io(e)
    }
}

impl From<base64::DecodeError> for FileSystemError {
    fn from(e: base64::DecodeError) -> Self {
        FileSystemError::Decode(e.to_string())
    }
}

// 实现 Display trait，作为协议层 ERROR 响应的文本
impl fmt::Display for FileSystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "disk I/O error: {}", e),
            Self::AlreadyExists(name) => write!(f, "file already exists: {}", name),
            Self::NotFound(name) => write!(f, "file not found: {}", name),
            Self::InodeFull => write!(f, "no free inode slot available"),
            Self::DiskFull => write!(f, "no free block available"),
            Self::ContentTooLarge { len, limit } => write!(
                f,
                "content size {} exceeds single block limit ({} bytes)",
                len, limit
            ),
            Self::Corrupted(desc) => write!(f, "corrupted file metadata: {}", desc),
            Self::InvalidBlock(index) => write!(f, "block index out of range: {}", index),
            Self::InvalidName(name) => write!(f, "invalid file name: {:?}", name),
            Self::InvalidConfig(desc) => write!(f, "invalid volume configuration: {}", desc),
            Self::Decode(desc) => write!(f, "malformed payload encoding: {}", desc),
            Self::Protocol(desc) => write!(f, "{}", desc),
        }
    }
}

// 支持链式错误，方便追踪底层原因
impl std::error::Error for FileSystemError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// 文件系统统一结果类型
pub type Result<T> = std::result::Result<T, FileSystemError>;
