use crate::fs::error::{FileSystemError, Result};

/// 默认块大小：128 字节
pub const DEFAULT_BLOCK_SIZE: usize = 128;

/// 默认 inode 槽位数
pub const DEFAULT_MAX_FILES: usize = 5;

/// 默认数据块数
pub const DEFAULT_MAX_BLOCKS: usize = 10;

/// 文件名最大字节数（磁盘 inode 记录中的定长字段）
pub const MAX_NAME_LEN: usize = 16;

/// 每条磁盘 inode 记录大小：16 字节文件名 + u16 大小 + i16 块号
pub const INODE_RECORD_SIZE: usize = MAX_NAME_LEN + 2 + 2;

/// 卷的几何参数，构造后不再改变
///
/// 磁盘布局：
///
/// ```text
/// [0, metadata_region_size)              inode 表 + 空闲块位图
/// [data_region_offset, required_size)    max_blocks 个数据块，块 i 位于 data_region_offset + i * block_size
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeConfig {
    pub block_size: usize,      // 每块大小（字节）
    pub max_files: usize,       // inode 槽位数
    pub max_blocks: usize,      // 数据块总数
    pub persist_metadata: bool, // 是否把 inode 表和位图写入元数据区
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_files: DEFAULT_MAX_FILES,
            max_blocks: DEFAULT_MAX_BLOCKS,
            persist_metadata: false,
        }
    }
}

impl VolumeConfig {
    pub fn inode_table_size(&self) -> usize {
        self.max_files * INODE_RECORD_SIZE
    }

    // 位图每块占 1 字节
    pub fn bitmap_size(&self) -> usize {
        self.max_blocks
    }

    pub fn metadata_region_size(&self) -> usize {
        self.inode_table_size() + self.bitmap_size()
    }

    pub fn data_region_offset(&self) -> u64 {
        self.metadata_region_size() as u64
    }

    /// 后备存储的最小字节数
    pub fn required_size(&self) -> u64 {
        self.data_region_offset() + (self.max_blocks * self.block_size) as u64
    }

    pub fn block_offset(&self, block_index: usize) -> u64 {
        self.data_region_offset() + (block_index * self.block_size) as u64
    }

    /// 校验容量参数本身：非零，且能放进磁盘 inode 记录的 u16/i16 字段
    pub fn validate_capacity(&self) -> Result<()> {
        if self.block_size == 0 || self.max_files == 0 || self.max_blocks == 0 {
            return Err(FileSystemError::InvalidConfig(
                "block size, file count and block count must be non-zero".to_string(),
            ));
        }
        if self.block_size > u16::MAX as usize {
            return Err(FileSystemError::InvalidConfig(format!(
                "block size {} does not fit an inode size field",
                self.block_size
            )));
        }
        if self.max_blocks > i16::MAX as usize {
            return Err(FileSystemError::InvalidConfig(format!(
                "block count {} does not fit an inode block field",
                self.max_blocks
            )));
        }
        Ok(())
    }

    pub fn validate(&self, total_size: u64) -> Result<()> {
        self.validate_capacity()?;
        if total_size < self.required_size() {
            return Err(FileSystemError::InvalidConfig(format!(
                "total size {} is smaller than the {} bytes the volume needs",
                total_size,
                self.required_size()
            )));
        }
        Ok(())
    }
}

/// 校验文件名：非空、不含空白和 NUL
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace() || c == '\0') {
        return Err(FileSystemError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// 持久化元数据时文件名还要放得进定长记录
pub fn validate_record_name(name: &str) -> Result<()> {
    validate_name(name)?;
    if name.len() > MAX_NAME_LEN {
        return Err(FileSystemError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout() {
        let config = VolumeConfig::default();
        assert_eq!(config.metadata_region_size(), 5 * 20 + 10);
        assert_eq!(config.data_region_offset(), 110);
        assert_eq!(config.required_size(), 110 + 10 * 128);
        assert_eq!(config.block_offset(3), 110 + 3 * 128);
    }

    #[test]
    fn rejects_undersized_backing_store() {
        let config = VolumeConfig::default();
        // 10 * 128 装不下元数据区
        assert!(matches!(
            config.validate(10 * 128),
            Err(FileSystemError::InvalidConfig(_))
        ));
        assert!(config.validate(config.required_size()).is_ok());
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = VolumeConfig {
            max_files: 0,
            ..VolumeConfig::default()
        };
        assert!(config.validate(u64::MAX).is_err());
    }

    #[test]
    fn name_rules() {
        assert!(validate_name("a.txt").is_ok());
        assert!(validate_name("quarterly-report.txt").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("a b").is_err());
        assert!(validate_name("a\0b").is_err());
    }

    #[test]
    fn record_names_fit_the_inode_record() {
        assert!(validate_record_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
        assert!(validate_record_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_record_name("").is_err());
    }

    #[test]
    fn capacity_must_fit_record_fields() {
        let wide_blocks = VolumeConfig {
            block_size: u16::MAX as usize + 1,
            ..VolumeConfig::default()
        };
        assert!(matches!(
            wide_blocks.validate_capacity(),
            Err(FileSystemError::InvalidConfig(_))
        ));
        let many_blocks = VolumeConfig {
            max_blocks: i16::MAX as usize + 1,
            ..VolumeConfig::default()
        };
        assert!(many_blocks.validate_capacity().is_err());
        assert!(VolumeConfig::default().validate_capacity().is_ok());
    }
}
