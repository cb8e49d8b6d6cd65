use std::{
    io::{self, BufRead, BufReader, BufWriter, Write},
    net::{TcpStream, ToSocketAddrs},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::fs::error::{FileSystemError, Result};

/// `READ` 响应前缀
pub const READ_PREFIX: &str = "READ: ";

/// 文件服务器客户端，一问一答
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    /// 发送一行请求并等待一行响应
    pub fn request(&mut self, line: &str) -> io::Result<String> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()?;

        let mut response = String::new();
        if self.reader.read_line(&mut response)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            ));
        }
        Ok(response.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// 把明文内容编码成 `WRITE <name> <base64>` 请求
pub fn encode_write_request(name: &str, content: &str) -> String {
    format!("WRITE {} {}", name, STANDARD.encode(content.as_bytes()))
}

/// 解码 `READ: <base64>` 响应；不是 READ 响应时返回 None
pub fn decode_read_response(response: &str) -> Option<Result<Vec<u8>>> {
    response
        .strip_prefix(READ_PREFIX)
        .map(|payload| STANDARD.decode(payload.trim()).map_err(FileSystemError::from))
}
