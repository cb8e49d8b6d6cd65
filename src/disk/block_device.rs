use crate::fs::error::Result;

/// 一个逻辑块的内容，长度等于卷的 block_size
pub type Block = Vec<u8>;

/// 卷与后备存储之间的接口
///
/// 块号是数据区内的相对编号，实现负责加上 data_region_offset。
/// 本身不保证多个调用之间的原子性，调用方必须持有卷锁。
pub trait BlockDevice: Send + Sync {
    /// 读取完整的一块；后备存储被截断时返回 I/O 错误
    fn read_block(&self, block_id: usize) -> Result<Block>;

    /// 从块首读取最多 buf.len() 字节，返回实际读到的字节数
    fn read_at(&self, block_id: usize, buf: &mut [u8]) -> Result<usize>;

    /// 从块首写入 buf，不补零，块内超出部分保持原样
    fn write_block(&self, block_id: usize, buf: &[u8]) -> Result<()>;

    fn read_metadata(&self, buf: &mut [u8]) -> Result<()>;

    fn write_metadata(&self, buf: &[u8]) -> Result<()>;
}
