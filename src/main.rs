mod cli;

use std::{process::ExitCode, sync::Arc};

use clap::Parser;
use colored::*;
use env_logger::Env;
use file_server::{server::FileServer, FileSystem};

use crate::cli::Cli;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.volume_config();

    let fs = match FileSystem::open(&cli.disk, cli.total_size(), config) {
        Ok(fs) => Arc::new(fs),
        Err(e) => {
            eprintln!("{} {}", "❌ File system error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    let usage = fs.usage();
    log::info!(
        "Volume {} mounted: {}/{} files, {}/{} blocks of {} bytes",
        cli.disk.display(),
        usage.files,
        usage.max_files,
        usage.used_blocks,
        usage.max_blocks,
        config.block_size
    );

    let server = match FileServer::bind((cli.bind.as_str(), cli.port), fs) {
        Ok(server) => server,
        Err(e) => {
            eprintln!(
                "{} {}:{}: {}",
                "❌ Could not start server on".red().bold(),
                cli.bind,
                cli.port,
                e
            );
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.run() {
        log::error!("Server stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
