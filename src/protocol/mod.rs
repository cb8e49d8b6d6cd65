pub mod command;
pub mod parse;
pub mod response;

use std::sync::Arc;

use crate::{
    fs::FileSystem,
    protocol::{command::execute_command, parse::parse_command},
};

pub use command::Command;
pub use response::Response;

/// 请求行中除 base64 负载外允许的字节数
pub const MAX_LINE_OVERHEAD: usize = 1024;

/// 协议分发器：一行请求进，一行响应出
///
/// 不保存连接状态，只持有共享的卷句柄。所有错误都在这里转换成
/// `ERROR:` 响应，不会向上传播。
#[derive(Clone)]
pub struct Dispatcher {
    fs: Arc<FileSystem>,
}

impl Dispatcher {
    pub fn new(fs: Arc<FileSystem>) -> Self {
        Self { fs }
    }

    /// 一行请求的最大字节数：一块内容的 base64 长度加上命令和文件名的余量
    pub fn max_line_len(&self) -> usize {
        let block_size = self.fs.config().block_size;
        MAX_LINE_OVERHEAD + (block_size + 2) / 3 * 4
    }

    pub fn handle_line(&self, line: &str) -> Response {
        parse_command(line)
            .and_then(|cmd| execute_command(&cmd, &self.fs))
            .unwrap_or_else(Response::from)
    }
}
