pub mod command;
pub mod parse;

use crate::{
    client::Client,
    shell::{
        command::{execute_command, Command},
        parse::parse_command,
    },
};
use colored::*;
use crossterm::{
    cursor, execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use indicatif::{ProgressBar, ProgressStyle};
use reedline::{
    DefaultCompleter, DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::{
    error::Error,
    io::{self, stdout},
    path::PathBuf,
    time::Duration,
};

/// 连接服务器，期间显示一个 spinner
pub fn connect(addr: &str) -> io::Result<Client> {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("Connecting to {}...", addr));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = Client::connect(addr);
    match &result {
        Ok(_) => spinner.finish_with_message(format!("✅ Connected to the server at {}.", addr)),
        Err(e) => spinner.finish_with_message(format!("❌ Could not connect to {}: {}", addr, e)),
    }
    result
}

pub fn start_shell(mut client: Client, addr: &str) -> Result<(), Box<dyn Error>> {
    welcome(addr)?;

    let username = whoami::username();
    let hostname = whoami::fallible::hostname().unwrap_or_else(|_| "localhost".to_string());

    // 初始化 reedline
    let history_path = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".file_client_history");

    let mut line_editor = Reedline::create();
    match FileBackedHistory::with_file(100, history_path) {
        Ok(history) => line_editor = line_editor.with_history(Box::new(history)),
        Err(e) => log::warn!("History disabled: {}", e),
    }

    // 命令补全
    let commands = vec![
        "create", "delete", "write", "read", "list", "help", "exit", "quit",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    let completer = DefaultCompleter::new_with_wordlen(commands, 2);
    line_editor = line_editor.with_completer(Box::new(completer));

    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic(format!("{}@{}", username, hostname)),
        DefaultPromptSegment::Basic(addr.to_string()),
    );

    loop {
        match line_editor.read_line(&prompt)? {
            Signal::Success(buffer) => {
                let Some(cmd) = parse_command(&buffer) else {
                    continue;
                };
                if let Err(e) = execute_command(&cmd, &mut client) {
                    println!("{} {}", "❌ Error:".red().bold(), e);
                    // 连接已断开，没有继续的意义
                    if e.downcast_ref::<io::Error>().is_some() {
                        break;
                    }
                }
                if cmd == Command::Exit {
                    break;
                }
            }
            Signal::CtrlC => {
                println!();
                continue;
            }
            Signal::CtrlD => {
                println!("{}", "Exiting file client...".yellow());
                break;
            }
            #[allow(unreachable_patterns)]
            _ => continue,
        }
    }

    println!("{}", "Connection closed.".bright_yellow());
    Ok(())
}

fn welcome(addr: &str) -> io::Result<()> {
    let mut stdout = stdout();
    execute!(
        stdout,
        Clear(ClearType::All),
        cursor::MoveTo(0, 0),
        SetForegroundColor(Color::Cyan),
        Print(format!("File Server client v{}\n", env!("CARGO_PKG_VERSION"))),
        ResetColor
    )?;
    println!("{} {}", "Connected to".bright_black(), addr.blue());
    println!(
        "{}",
        "Type 'help' for available commands. Use ↑↓ for history, Tab for auto-completion.\n"
            .bright_black()
    );
    Ok(())
}
