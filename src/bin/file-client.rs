use clap::Parser;
use colored::*;
use env_logger::Env;
use std::process::ExitCode;

use file_server::shell::{connect, start_shell};

/// Interactive console for the single-block file server
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(long, short, default_value_t = 12345)]
    port: u16,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let client = match connect(&addr) {
        Ok(client) => client,
        Err(_) => return ExitCode::FAILURE,
    };

    if let Err(e) = start_shell(client, &addr) {
        eprintln!("{} {}", "❌ Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
