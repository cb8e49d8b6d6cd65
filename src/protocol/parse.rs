use crate::{
    fs::error::{FileSystemError, Result},
    protocol::command::Command,
};

/// 解析一行请求：`COMMAND[ ARG1[ ARG2..EOL]]`
///
/// 命令关键字不区分大小写；按单个空格最多切成三段，
/// 所以 WRITE 的负载保留第二个空格之后的全部内容。
pub fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim_end_matches(['\r', '\n']);
    let parts: Vec<&str> = line.splitn(3, ' ').collect();
    let keyword = parts[0].to_ascii_uppercase();
    let name = parts.get(1).copied().filter(|name| !name.is_empty());

    match keyword.as_str() {
        "CREATE" => name
            .map(|name| Command::Create(name.to_string()))
            .ok_or_else(|| missing("CREATE requires a file name.")),
        "DELETE" => name
            .map(|name| Command::Delete(name.to_string()))
            .ok_or_else(|| missing("DELETE requires a file name.")),
        "WRITE" => match (name, parts.get(2)) {
            (Some(name), Some(payload)) => {
                Ok(Command::Write(name.to_string(), payload.to_string()))
            }
            _ => Err(missing("WRITE requires a file name and content.")),
        },
        "READ" => name
            .map(|name| Command::Read(name.to_string()))
            .ok_or_else(|| missing("READ requires a file name.")),
        "LIST" => Ok(Command::List),
        "EXIT" | "QUIT" => Ok(Command::Exit),
        _ => Err(FileSystemError::Protocol(format!(
            "unknown command: {}",
            parts[0]
        ))),
    }
}

fn missing(desc: &str) -> FileSystemError {
    FileSystemError::Protocol(desc.to_string())
}
