use crate::shell::command::Command;

/// 解析控制台输入；write/read 需要在客户端做编解码，其余原样转发
pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let parts: Vec<&str> = input.splitn(3, ' ').collect();
    let cmd = parts[0].to_ascii_lowercase();

    match cmd.as_str() {
        "help" => Some(Command::Help),
        "exit" | "quit" => Some(Command::Exit),
        "write" if parts.len() == 3 => {
            Some(Command::Write(parts[1].to_string(), parts[2].to_string()))
        }
        "read" if parts.len() >= 2 => Some(Command::Read(parts[1].to_string())),
        _ => Some(Command::Raw(input.to_string())),
    }
}
