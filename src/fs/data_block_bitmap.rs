/// 空闲块位图，每个 bit 表示一个数据块是否被使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBlockBitmap {
    bits: Vec<u8>,       // 位图数据
    total_blocks: usize, // 数据块总数
    free_blocks: usize,  // 当前空闲块数
}

impl DataBlockBitmap {
    pub fn new(total_blocks: usize) -> Self {
        let byte_len = (total_blocks + 7) / 8;

        Self {
            bits: vec![0; byte_len],
            total_blocks,
            free_blocks: total_blocks,
        }
    }

    // 分配编号最小的空闲块
    pub fn alloc(&mut self) -> Option<usize> {
        for (byte_index, byte) in self.bits.iter_mut().enumerate() {
            if *byte == 0xFF {
                continue;
            }
            for bit in 0..8 {
                let block_index = byte_index * 8 + bit;
                // 最后一个字节的填充位不可分配
                if block_index >= self.total_blocks {
                    return None;
                }
                if *byte & (1 << bit) == 0 {
                    *byte |= 1 << bit;
                    self.free_blocks -= 1;
                    return Some(block_index);
                }
            }
        }
        None
    }

    // 释放一个数据块，重复释放无副作用
    pub fn free(&mut self, block_index: usize) {
        if block_index >= self.total_blocks {
            return;
        }

        let (byte_index, bit_index) = Self::position(block_index);
        if self.bits[byte_index] & (1 << bit_index) != 0 {
            self.bits[byte_index] &= !(1 << bit_index);
            self.free_blocks += 1;
        }
    }

    /// 加载元数据时标记已占用的块，返回该块之前是否空闲
    pub fn mark_used(&mut self, block_index: usize) -> bool {
        if block_index >= self.total_blocks {
            return false;
        }

        let (byte_index, bit_index) = Self::position(block_index);
        if self.bits[byte_index] & (1 << bit_index) != 0 {
            return false;
        }
        self.bits[byte_index] |= 1 << bit_index;
        self.free_blocks -= 1;
        true
    }

    pub fn is_used(&self, block_index: usize) -> bool {
        if block_index >= self.total_blocks {
            return false;
        }
        let (byte_index, bit_index) = Self::position(block_index);
        self.bits[byte_index] & (1 << bit_index) != 0
    }

    pub fn free_blocks(&self) -> usize {
        self.free_blocks
    }

    pub fn used_blocks(&self) -> usize {
        self.total_blocks - self.free_blocks
    }

    pub fn total_blocks(&self) -> usize {
        self.total_blocks
    }

    /// 磁盘上的表示：每块 1 字节，1 = 已占用
    pub fn to_flags(&self) -> Vec<u8> {
        (0..self.total_blocks)
            .map(|i| self.is_used(i) as u8)
            .collect()
    }

    fn position(block_index: usize) -> (usize, u8) {
        (block_index / 8, (block_index % 8) as u8)
    }
}
