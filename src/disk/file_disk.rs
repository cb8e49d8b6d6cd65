use std::{
    fs::{File, OpenOptions},
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    path::Path,
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::{
    disk::block_device::{Block, BlockDevice},
    fs::{
        config::VolumeConfig,
        error::{FileSystemError, Result},
    },
};

/// 以普通文件作为后备存储的块设备
#[derive(Debug)]
pub struct FileDisk {
    file: Mutex<File>,
    config: VolumeConfig,
}

impl FileDisk {
    /// 打开或创建后备文件，并把长度调整为 total_size
    pub fn open(path: impl AsRef<Path>, total_size: u64, config: VolumeConfig) -> Result<Self> {
        config.validate(total_size)?;

        let path = path.as_ref();
        if path.exists() {
            log::info!("Repurposing the existing file system: {}", path.display());
        } else {
            log::info!("Creating a new file system: {}", path.display());
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.set_len(total_size)?;

        Ok(Self {
            file: Mutex::new(file),
            config,
        })
    }

    fn lock(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn block_offset(&self, block_id: usize) -> Result<u64> {
        if block_id >= self.config.max_blocks {
            return Err(FileSystemError::InvalidBlock(block_id));
        }
        Ok(self.config.block_offset(block_id))
    }
}

impl BlockDevice for FileDisk {
    fn read_block(&self, block_id: usize) -> Result<Block> {
        let offset = self.block_offset(block_id)?;
        let mut buf = vec![0u8; self.config.block_size];

        let mut file = self.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_at(&self, block_id: usize, buf: &mut [u8]) -> Result<usize> {
        let offset = self.block_offset(block_id)?;
        let len = buf.len().min(self.config.block_size);

        let mut file = self.lock();
        file.seek(SeekFrom::Start(offset))?;

        // 读到 EOF 为止，短读交给调用方判断
        let mut read = 0;
        while read < len {
            match file.read(&mut buf[read..len]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(read)
    }

    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()> {
        if buf.len() > self.config.block_size {
            return Err(FileSystemError::ContentTooLarge {
                len: buf.len(),
                limit: self.config.block_size,
            });
        }
        let offset = self.block_offset(block_id)?;

        let mut file = self.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        file.flush()?;
        Ok(())
    }

    fn read_metadata(&self, buf: &mut [u8]) -> Result<()> {
        let len = buf.len().min(self.config.metadata_region_size());

        let mut file = self.lock();
        file.seek(SeekFrom::Start(0))?;
        file.read_exact(&mut buf[..len])?;
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

        let mut file = self.lock();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(buf)?;
        file.flush()?;
        Ok(())
    }
}
