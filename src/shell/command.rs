use colored::*;
use std::error::Error;

use crate::client::{decode_read_response, encode_write_request, Client};

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Write(String, String), // 文件名，明文内容
    Read(String),
    Raw(String), // 原样发给服务器
    Exit,
}

pub fn execute_command(cmd: &Command, client: &mut Client) -> Result<(), Box<dyn Error>> {
    match cmd {
        Command::Help => print_help(),
        Command::Write(name, content) => {
            let request = encode_write_request(name, content);
            log::debug!("Sending: {}", request);
            print_response(&client.request(&request)?);
        }
        Command::Read(name) => {
            let response = client.request(&format!("READ {}", name))?;
            match decode_read_response(&response) {
                Some(Ok(content)) => {
                    println!("📖 {}", String::from_utf8_lossy(&content).cyan());
                }
                Some(Err(e)) => println!("{} {}", "❌ Decoding file content:".red(), e),
                None => print_response(&response),
            }
        }
        Command::Raw(line) => print_response(&client.request(line)?),
        Command::Exit => println!("{}", "👋 Closing connection...".yellow().bold()),
    }

    Ok(())
}

fn print_response(response: &str) {
    if let Some(msg) = response.strip_prefix("SUCCESS: ") {
        println!("{} {}", "✅".green(), msg.green());
    } else if let Some(msg) = response.strip_prefix("ERROR: ") {
        println!("{} {}", "❌".red(), msg.red());
    } else {
        println!("{}", response);
    }
}

fn print_help() {
    println!("{}", "📘 File Server Commands".bright_cyan().bold());
    println!(
        "{}",
        "
  create <file>        Create an empty file
  delete <file>        Delete a file
  write <file> <text>  Overwrite a file with text (one block max)
  read <file>          Print file content
  list                 List all files
  help                 Show this help message
  exit | quit          Close the connection
"
        .bright_black()
    );
}
