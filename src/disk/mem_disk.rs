use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{
    disk::block_device::{Block, BlockDevice},
    fs::{
        config::VolumeConfig,
        error::{FileSystemError, Result},
    },
};

/// 内存中的块设备，布局与 FileDisk 相同（元数据区 + 数据区扁平存储）
#[derive(Debug)]
pub struct MemDisk {
    bytes: Mutex<Vec<u8>>,
    config: VolumeConfig,
}

impl MemDisk {
    pub fn new(config: VolumeConfig) -> Self {
        Self {
            bytes: Mutex::new(vec![0u8; config.required_size() as usize]),
            config,
        }
    }

    /// 截断后备存储，模拟被撕裂的磁盘镜像
    pub fn truncate(&self, len: usize) {
        self.lock().truncate(len);
    }

    /// 后备存储的完整拷贝
    pub fn snapshot(&self) -> Vec<u8> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn block_start(&self, block_id: usize) -> Result<usize> {
        if block_id >= self.config.max_blocks {
            return Err(FileSystemError::InvalidBlock(block_id));
        }
        Ok(self.config.block_offset(block_id) as usize)
    }
}

impl BlockDevice for MemDisk {
    fn read_block(&self, block_id: usize) -> Result<Block> {
        let start = self.block_start(block_id)?;
        let end = start + self.config.block_size;
        let bytes = self.lock();
        if bytes.len() < end {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        Ok(bytes[start..end].to_vec())
    }

    fn read_at(&self, block_id: usize, buf: &mut [u8]) -> Result<usize> {
        let start = self.block_start(block_id)?;
        let bytes = self.lock();
        let wanted = buf.len().min(self.config.block_size);
        let available = bytes.len().saturating_sub(start).min(wanted);
        buf[..available].copy_from_slice(&bytes[start..start + available]);
        Ok(available)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()> {
        if buf.len() > self.config.block_size {
            return Err(FileSystemError::ContentTooLarge {
                len: buf.len(),
                limit: self.config.block_size,
            });
        }
        let start = self.block_start(block_id)?;
        let mut bytes = self.lock();
        if bytes.len() < start + buf.len() {
            bytes.resize(start + buf.len(), 0);
        }
        bytes[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn read_metadata(&self, buf: &mut [u8]) -> Result<()> {
        let bytes = self.lock();
        let len = buf.len().min(self.config.metadata_region_size());
        if bytes.len() < len {
            return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
        }
        buf[..len].copy_from_slice(&bytes[..len]);
        Ok(())
    }

    fn write_metadata(&self, buf: &[u8]) -> Result<()> {
        if buf.len() > self.config.metadata_region_size() {
            return Err(FileSystemError::Corrupted(format!(
                "metadata image of {} bytes overflows the {} byte region",
                buf.len(),
                self.config.metadata_region_size()
            )));
        }
        let mut bytes = self.lock();
        if bytes.len() < buf.len() {
            bytes.resize(buf.len(), 0);
        }
        bytes[..buf.len()].copy_from_slice(buf);
        Ok(())
    }
}
