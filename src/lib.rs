pub mod client;
pub mod disk;
pub mod fs;
pub mod protocol;
pub mod server;
pub mod shell;
pub mod utils;

pub use fs::{config::VolumeConfig, error::FileSystemError, FileSystem};
