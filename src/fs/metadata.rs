use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::fs::{
    config::{validate_record_name, VolumeConfig, INODE_RECORD_SIZE, MAX_NAME_LEN},
    data_block_bitmap::DataBlockBitmap,
    error::{FileSystemError, Result},
    inode_table::{Inode, InodeTable},
};

/// 未分配数据块时磁盘记录中的块号
const NO_BLOCK: i16 = -1;

/// 磁盘上的 inode 记录，bincode 定长编码后正好 INODE_RECORD_SIZE 字节
///
/// 全零记录表示空槽位，所以新建的（全零）后备文件解码为空卷。
#[derive(Debug, Default, Serialize, Deserialize)]
struct InodeRecord {
    name: [u8; MAX_NAME_LEN], // 文件名，NUL 填充
    size: u16,
    block: i16,
}

impl InodeRecord {
    fn from_inode(inode: &Inode) -> Self {
        let mut name = [0u8; MAX_NAME_LEN];
        let len = inode.name.len().min(MAX_NAME_LEN);
        name[..len].copy_from_slice(&inode.name.as_bytes()[..len]);

        Self {
            name,
            size: inode.size as u16,
            block: inode.block.map_or(NO_BLOCK, |b| b as i16),
        }
    }

    fn is_empty(&self) -> bool {
        self.name[0] == 0
    }

    fn into_inode(self, slot: usize, config: &VolumeConfig) -> Result<Inode> {
        let len = self.name.iter().position(|&b| b == 0).unwrap_or(MAX_NAME_LEN);
        if self.name[len..].iter().any(|&b| b != 0) {
            return Err(corrupted(slot, "name is not NUL padded"));
        }
        let name = std::str::from_utf8(&self.name[..len])
            .map_err(|_| corrupted(slot, "name is not UTF-8"))?;
        validate_record_name(name).map_err(|_| corrupted(slot, "name is invalid"))?;

        let size = self.size as usize;
        if size > config.block_size {
            return Err(corrupted(slot, "size exceeds block size"));
        }

        let block = match self.block {
            NO_BLOCK => None,
            b if b >= 0 && (b as usize) < config.max_blocks => Some(b as usize),
            b => return Err(corrupted(slot, &format!("block {} out of range", b))),
        };
        if block.is_none() && size > 0 {
            return Err(corrupted(slot, "non-empty file without a block"));
        }

        Ok(Inode {
            name: name.to_string(),
            size,
            block,
        })
    }
}

fn corrupted(slot: usize, desc: &str) -> FileSystemError {
    FileSystemError::Corrupted(format!("inode slot {}: {}", slot, desc))
}

/// 把 inode 表和位图编码为元数据区镜像
pub fn encode(
    table: &InodeTable,
    bitmap: &DataBlockBitmap,
    config: &VolumeConfig,
) -> Result<Vec<u8>> {
    let mut image = Vec::with_capacity(config.metadata_region_size());

    for slot in table.slots() {
        let record = slot.as_ref().map(InodeRecord::from_inode).unwrap_or_default();
        let bytes = bincode::serialize(&record)
            .map_err(|e| FileSystemError::Corrupted(format!("inode encoding failed: {}", e)))?;
        debug_assert_eq!(bytes.len(), INODE_RECORD_SIZE);
        image.extend_from_slice(&bytes);
    }
    image.extend_from_slice(&bitmap.to_flags());

    Ok(image)
}

/// 解码元数据区镜像，并校验所有不变量
pub fn decode(image: &[u8], config: &VolumeConfig) -> Result<(InodeTable, DataBlockBitmap)> {
    if image.len() < config.metadata_region_size() {
        return Err(FileSystemError::Corrupted(format!(
            "metadata region is {} bytes, expected {}",
            image.len(),
            config.metadata_region_size()
        )));
    }

    let mut slots = Vec::with_capacity(config.max_files);
    let mut names = HashSet::new();
    let mut bitmap = DataBlockBitmap::new(config.max_blocks);

    for (slot, chunk) in image[..config.inode_table_size()]
        .chunks_exact(INODE_RECORD_SIZE)
        .enumerate()
    {
        let record: InodeRecord = bincode::deserialize(chunk)
            .map_err(|e| corrupted(slot, &format!("undecodable record: {}", e)))?;
        if record.is_empty() {
            slots.push(None);
            continue;
        }

        let inode = record.into_inode(slot, config)?;
        if !names.insert(inode.name.clone()) {
            return Err(corrupted(slot, &format!("duplicate name {}", inode.name)));
        }
        if let Some(block) = inode.block {
            if !bitmap.mark_used(block) {
                return Err(corrupted(slot, &format!("block {} owned twice", block)));
            }
        }
        slots.push(Some(inode));
    }

    let flags = &image[config.inode_table_size()..config.metadata_region_size()];
    if flags != bitmap.to_flags().as_slice() {
        return Err(FileSystemError::Corrupted(
            "free block bitmap disagrees with the inode table".to_string(),
        ));
    }

    Ok((InodeTable::from_slots(slots), bitmap))
}
