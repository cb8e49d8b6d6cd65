use std::{
    path::Path,
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    disk::{BlockDevice, FileDisk},
    fs::{
        config::{validate_name, validate_record_name, VolumeConfig},
        data_block_bitmap::DataBlockBitmap,
        error::{FileSystemError, Result},
        inode_table::{Inode, InodeTable},
    },
};

pub mod config;
pub mod data_block_bitmap;
pub mod error;
pub mod inode_table;
pub mod metadata;

/// 锁保护的卷状态，磁盘只能在持锁时访问
struct Volume {
    inode_table: InodeTable,      // 所有 inode 管理
    data_bitmap: DataBlockBitmap, // 数据块分配信息
    disk: Box<dyn BlockDevice>,   // 底层磁盘抽象层
}

/// 卷使用情况快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeUsage {
    pub files: usize,
    pub max_files: usize,
    pub used_blocks: usize,
    pub max_blocks: usize,
}

/// 单块文件系统
///
/// 创建、删除、写入持有排他锁；读取、列目录持有共享锁。
/// 锁只在一次操作内持有，操作返回（无论成功或失败）时释放。
/// 进程内只构造一次，通过 `Arc<FileSystem>` 共享给所有连接。
pub struct FileSystem {
    config: VolumeConfig,
    volume: RwLock<Volume>,
}

impl FileSystem {
    /// 打开文件后备的卷
    pub fn open(path: impl AsRef<Path>, total_size: u64, config: VolumeConfig) -> Result<Self> {
        let disk = FileDisk::open(path, total_size, config)?;
        Self::mount(Box::new(disk), config)
    }

    /// 在已有块设备上挂载卷
    ///
    /// 未开启 `persist_metadata` 时 inode 表和位图总是从空开始，
    /// 元数据区被清零，数据区中旧的字节仍在磁盘上，但不再可达。
    pub fn mount(disk: Box<dyn BlockDevice>, config: VolumeConfig) -> Result<Self> {
        config.validate_capacity()?;

        let (inode_table, data_bitmap) = if config.persist_metadata {
            let mut image = vec![0u8; config.metadata_region_size()];
            disk.read_metadata(&mut image)?;
            let (table, bitmap) = metadata::decode(&image, &config)?;
            log::info!(
                "Replayed {} files and {} used blocks from the metadata region",
                table.live_count(),
                bitmap.used_blocks()
            );
            (table, bitmap)
        } else {
            // 旧的持久化镜像在本次运行中会过时，不能留给下一次 replay
            disk.write_metadata(&vec![0u8; config.metadata_region_size()])?;
            (
                InodeTable::new(config.max_files),
                DataBlockBitmap::new(config.max_blocks),
            )
        };

        Ok(Self {
            config,
            volume: RwLock::new(Volume {
                inode_table,
                data_bitmap,
                disk,
            }),
        })
    }

    pub fn config(&self) -> &VolumeConfig {
        &self.config
    }

    pub fn create_file(&self, name: &str) -> Result<()> {
        if self.config.persist_metadata {
            validate_record_name(name)?;
        } else {
            validate_name(name)?;
        }

        let mut volume = self.write_lock();
        if volume.inode_table.find(name).is_some() {
            return Err(FileSystemError::AlreadyExists(name.to_string()));
        }

        let slot = volume
            .inode_table
            .alloc(Inode::new(name))
            .ok_or(FileSystemError::InodeFull)?;
        self.sync_metadata(&volume)?;

        log::info!("Created file: {} at inode index {}", name, slot);
        Ok(())
    }

    pub fn delete_file(&self, name: &str) -> Result<()> {
        let mut volume = self.write_lock();
        let slot = volume
            .inode_table
            .find(name)
            .ok_or_else(|| FileSystemError::NotFound(name.to_string()))?;

        if let Some(inode) = volume.inode_table.free(slot) {
            if let Some(block) = inode.block {
                volume.data_bitmap.free(block);
            }
        }
        self.sync_metadata(&volume)?;

        log::info!("Deleted file: {}", name);
        Ok(())
    }

    /// 覆盖写入：首次写入时分配一个块，之后原地复用该块
    pub fn write_file(&self, name: &str, content: &[u8]) -> Result<()> {
        let mut volume = self.write_lock();
        let slot = volume
            .inode_table
            .find(name)
            .ok_or_else(|| FileSystemError::NotFound(name.to_string()))?;

        if content.len() > self.config.block_size {
            return Err(FileSystemError::ContentTooLarge {
                len: content.len(),
                limit: self.config.block_size,
            });
        }

        let Volume {
            inode_table,
            data_bitmap,
            disk,
        } = &mut *volume;
        let inode = inode_table
            .get_mut(slot)
            .ok_or_else(|| FileSystemError::NotFound(name.to_string()))?;

        let block = match inode.block {
            Some(block) => block,
            None => {
                let block = data_bitmap.alloc().ok_or(FileSystemError::DiskFull)?;
                // 先记录归属，写盘失败时块仍由该文件持有（size 不变）
                inode.block = Some(block);
                block
            }
        };

        if let Err(e) = disk.write_block(block, content) {
            log::error!("Writing block {} of file {} failed: {}", block, name, e);
            // 写盘失败前新分配的块也要落到元数据里
            self.sync_metadata(&volume)?;
            return Err(e);
        }
        inode.size = content.len();
        self.sync_metadata(&volume)?;

        log::info!(
            "Wrote {} bytes to file: {} at block {}",
            content.len(),
            name,
            block
        );
        Ok(())
    }

    pub fn read_file(&self, name: &str) -> Result<Vec<u8>> {
        let volume = self.read_lock();
        let inode = volume
            .inode_table
            .find(name)
            .and_then(|slot| volume.inode_table.get(slot))
            .ok_or_else(|| FileSystemError::NotFound(name.to_string()))?;

        let block = match inode.block {
            Some(block) if inode.size > 0 => block,
            _ => {
                log::debug!("File {} is empty", name);
                return Ok(Vec::new());
            }
        };

        let mut content = vec![0u8; inode.size];
        let read = volume.disk.read_at(block, &mut content)?;
        if read != inode.size {
            return Err(FileSystemError::Corrupted(format!(
                "file {} records {} bytes but block {} holds only {}",
                name, inode.size, block, read
            )));
        }

        log::debug!("Read {} bytes from file: {}", read, name);
        Ok(content)
    }

    /// 按 inode 槽位顺序列出所有文件名
    pub fn list_files(&self) -> Vec<String> {
        let names = self.read_lock().inode_table.names();
        log::debug!("Listed {} files", names.len());
        names
    }

    pub fn usage(&self) -> VolumeUsage {
        let volume = self.read_lock();
        VolumeUsage {
            files: volume.inode_table.live_count(),
            max_files: self.config.max_files,
            used_blocks: volume.data_bitmap.used_blocks(),
            max_blocks: self.config.max_blocks,
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Volume> {
        self.volume.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Volume> {
        self.volume.write().unwrap_or_else(PoisonError::into_inner)
    }

    // 调用方必须持有排他锁
    fn sync_metadata(&self, volume: &Volume) -> Result<()> {
        if !self.config.persist_metadata {
            return Ok(());
        }
        let image = metadata::encode(&volume.inode_table, &volume.data_bitmap, &self.config)?;
        volume.disk.write_metadata(&image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::MemDisk;
    use std::sync::Arc;

    fn mem_fs() -> FileSystem {
        let config = VolumeConfig::default();
        FileSystem::mount(Box::new(MemDisk::new(config)), config).unwrap()
    }

    #[test]
    fn create_then_list_once() {
        let fs = mem_fs();
        fs.create_file("a.txt").unwrap();
        assert_eq!(fs.list_files(), vec!["a.txt"]);
        assert!(matches!(
            fs.create_file("a.txt"),
            Err(FileSystemError::AlreadyExists(_))
        ));
        assert_eq!(fs.list_files(), vec!["a.txt"]);
    }

    #[test]
    fn create_rejects_invalid_names() {
        let fs = mem_fs();
        assert!(matches!(
            fs.create_file(""),
            Err(FileSystemError::InvalidName(_))
        ));
        assert!(fs.create_file("a name").is_err());
        assert!(fs.list_files().is_empty());
    }

    #[test]
    fn long_names_need_no_persistence() {
        let fs = mem_fs();
        fs.create_file("quarterly-report.txt").unwrap();
        fs.write_file("quarterly-report.txt", b"q3").unwrap();
        assert_eq!(fs.list_files(), vec!["quarterly-report.txt"]);
        assert_eq!(fs.read_file("quarterly-report.txt").unwrap(), b"q3");
    }

    #[test]
    fn persisted_names_fit_the_record() {
        let config = VolumeConfig {
            persist_metadata: true,
            ..VolumeConfig::default()
        };
        let fs = FileSystem::mount(Box::new(MemDisk::new(config)), config).unwrap();
        assert!(matches!(
            fs.create_file("quarterly-report.txt"),
            Err(FileSystemError::InvalidName(_))
        ));
        fs.create_file("report.txt").unwrap();
    }

    #[test]
    fn mount_rejects_capacity_beyond_record_fields() {
        let config = VolumeConfig {
            block_size: 70_000,
            persist_metadata: true,
            ..VolumeConfig::default()
        };
        let disk = MemDisk::new(VolumeConfig::default());
        assert!(matches!(
            FileSystem::mount(Box::new(disk), config),
            Err(FileSystemError::InvalidConfig(_))
        ));

        let config = VolumeConfig {
            max_blocks: 40_000,
            ..VolumeConfig::default()
        };
        let disk = MemDisk::new(VolumeConfig::default());
        assert!(FileSystem::mount(Box::new(disk), config).is_err());
    }

    #[test]
    fn ephemeral_mount_clears_stale_metadata() {
        let persisted = VolumeConfig {
            persist_metadata: true,
            ..VolumeConfig::default()
        };
        let disk = Arc::new(MemDisk::new(persisted));

        let fs = FileSystem::mount(Box::new(SharedDisk(disk.clone())), persisted).unwrap();
        fs.create_file("old").unwrap();
        fs.write_file("old", b"old bytes").unwrap();
        drop(fs);

        // 不持久化的一次运行覆盖了块 0
        let ephemeral = VolumeConfig::default();
        let fs = FileSystem::mount(Box::new(SharedDisk(disk.clone())), ephemeral).unwrap();
        fs.create_file("new").unwrap();
        fs.write_file("new", b"new").unwrap();
        drop(fs);

        let fs = FileSystem::mount(Box::new(SharedDisk(disk)), persisted).unwrap();
        assert!(fs.list_files().is_empty());
        assert_eq!(fs.usage().used_blocks, 0);
    }

    #[test]
    fn sixth_file_exceeds_capacity() {
        let fs = mem_fs();
        for i in 0..5 {
            fs.create_file(&format!("f{}", i)).unwrap();
        }
        assert!(matches!(
            fs.create_file("f5"),
            Err(FileSystemError::InodeFull)
        ));
    }

    #[test]
    fn write_checks_name_then_size() {
        let fs = mem_fs();
        assert!(matches!(
            fs.write_file("missing", b"x"),
            Err(FileSystemError::NotFound(_))
        ));
        assert!(matches!(
            fs.write_file("missing", &[0u8; 129]),
            Err(FileSystemError::NotFound(_))
        ));

        fs.create_file("big").unwrap();
        assert!(matches!(
            fs.write_file("big", &[0u8; 129]),
            Err(FileSystemError::ContentTooLarge { len: 129, limit: 128 })
        ));
        // 失败的写入不分配块
        assert_eq!(fs.usage().used_blocks, 0);
    }

    #[test]
    fn write_read_exact_bytes() {
        let fs = mem_fs();
        fs.create_file("bin").unwrap();

        let full: Vec<u8> = (0..128u8).collect();
        fs.write_file("bin", &full).unwrap();
        assert_eq!(fs.read_file("bin").unwrap(), full);

        fs.write_file("bin", &[0xFF, 0x00, 0x10]).unwrap();
        assert_eq!(fs.read_file("bin").unwrap(), vec![0xFF, 0x00, 0x10]);
    }

    #[test]
    fn rewrite_reuses_block() {
        let fs = mem_fs();
        fs.create_file("a").unwrap();
        fs.write_file("a", b"first").unwrap();
        fs.write_file("a", b"second version").unwrap();
        fs.write_file("a", b"3").unwrap();
        assert_eq!(fs.usage().used_blocks, 1);
        assert_eq!(fs.read_file("a").unwrap(), b"3");
    }

    #[test]
    fn unwritten_and_empty_files_read_empty() {
        let fs = mem_fs();
        fs.create_file("new").unwrap();
        assert!(fs.read_file("new").unwrap().is_empty());

        fs.write_file("new", b"").unwrap();
        assert!(fs.read_file("new").unwrap().is_empty());
        assert!(matches!(
            fs.read_file("nope"),
            Err(FileSystemError::NotFound(_))
        ));
    }

    #[test]
    fn delete_frees_block_for_reuse() {
        let fs = mem_fs();
        fs.create_file("a").unwrap();
        fs.write_file("a", b"aaaa").unwrap();
        fs.delete_file("a").unwrap();
        assert_eq!(fs.usage().used_blocks, 0);
        assert!(matches!(
            fs.delete_file("a"),
            Err(FileSystemError::NotFound(_))
        ));

        fs.create_file("b").unwrap();
        fs.write_file("b", b"bb").unwrap();
        assert_eq!(fs.read_file("b").unwrap(), b"bb");
        assert_eq!(fs.usage().used_blocks, 1);
    }

    #[test]
    fn eleventh_block_is_no_space() {
        // 10 个文件各占一块，需要 10 个 inode 槽位
        let config = VolumeConfig {
            max_files: 11,
            ..VolumeConfig::default()
        };
        let fs = FileSystem::mount(Box::new(MemDisk::new(config)), config).unwrap();
        for i in 0..10 {
            let name = format!("f{}", i);
            fs.create_file(&name).unwrap();
            fs.write_file(&name, b"x").unwrap();
        }
        fs.create_file("f10").unwrap();
        assert!(matches!(
            fs.write_file("f10", b"x"),
            Err(FileSystemError::DiskFull)
        ));

        // 已有块的文件仍可覆盖写
        fs.write_file("f3", b"again").unwrap();

        fs.delete_file("f0").unwrap();
        fs.write_file("f10", b"now fits").unwrap();
        assert_eq!(fs.read_file("f10").unwrap(), b"now fits");
    }

    #[test]
    fn list_follows_slot_order() {
        let fs = mem_fs();
        for name in ["c", "a", "b"] {
            fs.create_file(name).unwrap();
        }
        fs.delete_file("c").unwrap();
        fs.create_file("z").unwrap();
        assert_eq!(fs.list_files(), vec!["z", "a", "b"]);
    }

    #[test]
    fn truncated_store_reports_corruption() {
        let config = VolumeConfig::default();
        let disk = Arc::new(MemDisk::new(config));
        let fs = FileSystem::mount(Box::new(SharedDisk(disk.clone())), config).unwrap();

        fs.create_file("t").unwrap();
        fs.write_file("t", &[5u8; 64]).unwrap();
        disk.truncate(config.block_offset(0) as usize + 10);

        assert!(matches!(
            fs.read_file("t"),
            Err(FileSystemError::Corrupted(_))
        ));
    }

    #[test]
    fn metadata_is_ephemeral_by_default() {
        let config = VolumeConfig::default();
        let disk = Arc::new(MemDisk::new(config));
        let fs = FileSystem::mount(Box::new(SharedDisk(disk.clone())), config).unwrap();
        fs.create_file("gone").unwrap();
        fs.write_file("gone", b"bytes").unwrap();
        drop(fs);

        let fs = FileSystem::mount(Box::new(SharedDisk(disk.clone())), config).unwrap();
        assert!(fs.list_files().is_empty());
        // 数据字节仍在磁盘上
        let offset = config.block_offset(0) as usize;
        assert_eq!(&disk.snapshot()[offset..offset + 5], b"bytes");
    }

    #[test]
    fn persisted_metadata_survives_remount() {
        let config = VolumeConfig {
            persist_metadata: true,
            ..VolumeConfig::default()
        };
        let disk = Arc::new(MemDisk::new(config));
        let fs = FileSystem::mount(Box::new(SharedDisk(disk.clone())), config).unwrap();
        fs.create_file("keep").unwrap();
        fs.create_file("drop").unwrap();
        fs.write_file("keep", b"still here").unwrap();
        fs.write_file("drop", b"x").unwrap();
        fs.delete_file("drop").unwrap();
        drop(fs);

        let fs = FileSystem::mount(Box::new(SharedDisk(disk)), config).unwrap();
        assert_eq!(fs.list_files(), vec!["keep"]);
        assert_eq!(fs.read_file("keep").unwrap(), b"still here");
        assert_eq!(fs.usage().used_blocks, 1);
    }

    #[test]
    fn concurrent_readers_see_whole_writes() {
        let fs = Arc::new(mem_fs());
        fs.create_file("hot").unwrap();
        fs.write_file("hot", &[b'a'; 10]).unwrap();

        let writer = {
            let fs = fs.clone();
            std::thread::spawn(move || {
                for i in 0..200usize {
                    let len = 1 + i % 128;
                    let fill = if i % 2 == 0 { b'b' } else { b'c' };
                    fs.write_file("hot", &vec![fill; len]).unwrap();
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let fs = fs.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let content = fs.read_file("hot").unwrap();
                        assert!(!content.is_empty());
                        // 一次写入只用一种字节填充
                        assert!(content.iter().all(|&b| b == content[0]));
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }

    /// 让测试在重新挂载后还能拿到同一块内存磁盘
    struct SharedDisk(Arc<MemDisk>);

    impl BlockDevice for SharedDisk {
        fn read_block(&self, block_id: usize) -> Result<crate::disk::Block> {
            self.0.read_block(block_id)
        }
        fn read_at(&self, block_id: usize, buf: &mut [u8]) -> Result<usize> {
            self.0.read_at(block_id, buf)
        }
        fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()> {
            self.0.write_block(block_id, buf)
        }
        fn read_metadata(&self, buf: &mut [u8]) -> Result<()> {
            self.0.read_metadata(buf)
        }
        fn write_metadata(&self, buf: &[u8]) -> Result<()> {
            self.0.write_metadata(buf)
        }
    }
}
