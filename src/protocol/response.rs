use std::fmt;

use crate::fs::error::FileSystemError;

/// 一行响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Success(String), // SUCCESS: <message>
    Read(String),    // READ: <base64 payload>
    Error(String),   // ERROR: <message>
    Abort(String),   // ERROR: <message>，发送后结束该连接
}

impl Response {
    /// 后备存储 I/O 失败后该连接不再处理请求
    pub fn closes_connection(&self) -> bool {
        matches!(self, Response::Abort(_))
    }
}

impl From<FileSystemError> for Response {
    fn from(e: FileSystemError) -> Self {
        match e {
            FileSystemError::Io(_) => Response::Abort(e.to_string()),
            _ => Response::Error(e.to_string()),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(msg) => write!(f, "SUCCESS: {}", msg),
            Self::Read(payload) => write!(f, "READ: {}", payload),
            Self::Error(msg) | Self::Abort(msg) => write!(f, "ERROR: {}", msg),
        }
    }
}
