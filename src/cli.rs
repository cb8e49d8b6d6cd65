use clap::Parser;
use std::path::PathBuf;

use file_server::fs::config::{DEFAULT_BLOCK_SIZE, DEFAULT_MAX_BLOCKS, DEFAULT_MAX_FILES};
use file_server::VolumeConfig;

/// Single-block file server
#[derive(Parser, Debug)]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "FILE_SERVER_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, short, env = "FILE_SERVER_PORT", default_value_t = 12345)]
    pub port: u16,

    /// Backing disk image
    #[arg(long, short, env = "FILE_SERVER_DISK", default_value = "disk.img")]
    pub disk: PathBuf,

    /// Size of the disk image in bytes [default: smallest size that fits the volume]
    #[arg(long, env = "FILE_SERVER_TOTAL_SIZE")]
    pub total_size: Option<u64>,

    #[arg(long, env = "FILE_SERVER_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    #[arg(long, env = "FILE_SERVER_MAX_FILES", default_value_t = DEFAULT_MAX_FILES)]
    pub max_files: usize,

    #[arg(long, env = "FILE_SERVER_MAX_BLOCKS", default_value_t = DEFAULT_MAX_BLOCKS)]
    pub max_blocks: usize,

    /// Keep the inode table and bitmap in the disk image across restarts.
    /// Names are then limited to 16 bytes. Starting without this flag clears the saved table.
    #[arg(long, env = "FILE_SERVER_PERSIST_METADATA")]
    pub persist_metadata: bool,
}

impl Cli {
    pub fn volume_config(&self) -> VolumeConfig {
        VolumeConfig {
            block_size: self.block_size,
            max_files: self.max_files,
            max_blocks: self.max_blocks,
            persist_metadata: self.persist_metadata,
        }
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
            .unwrap_or_else(|| self.volume_config().required_size())
    }
}
