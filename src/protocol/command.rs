use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    fs::{error::Result, FileSystem},
    protocol::response::Response,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(String),
    Delete(String),
    Write(String, String), // 文件名，base64 负载
    Read(String),
    List,
    Exit,
}

pub fn execute_command(cmd: &Command, fs: &FileSystem) -> Result<Response> {
    let response = match cmd {
        Command::Create(name) => {
            fs.create_file(name)?;
            Response::Success(format!("File '{}' created.", name))
        }
        Command::Delete(name) => {
            fs.delete_file(name)?;
            Response::Success(format!("File '{}' deleted.", name))
        }
        Command::Write(name, payload) => {
            let content = STANDARD.decode(payload.as_bytes())?;
            fs.write_file(name, &content)?;
            Response::Success(format!(
                "Wrote {} bytes to file '{}'.",
                content.len(),
                name
            ))
        }
        Command::Read(name) => {
            let content = fs.read_file(name)?;
            Response::Read(STANDARD.encode(content))
        }
        Command::List => Response::Success(fs.list_files().join(", ")),
        // 只做应答，连接由网络层管理
        Command::Exit => Response::Success("Disconnecting".to_string()),
    };

    Ok(response)
}
