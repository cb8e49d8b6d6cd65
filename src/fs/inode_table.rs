/// 一个文件的元数据：文件名、大小、占用的数据块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub name: String,         // 文件名，在所有有效 inode 中唯一
    pub size: usize,          // 文件大小（字节），不超过 block_size
    pub block: Option<usize>, // 数据块号，None 表示尚未分配
}

impl Inode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            block: None,
        }
    }
}

/// 定长 inode 槽位表，槽位要么为空，要么存放一个 Inode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InodeTable {
    slots: Vec<Option<Inode>>,
}

impl InodeTable {
    pub fn new(total_inodes: usize) -> Self {
        Self {
            slots: vec![None; total_inodes],
        }
    }

    pub fn from_slots(slots: Vec<Option<Inode>>) -> Self {
        Self { slots }
    }

    /// 按文件名查找槽位号
    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(inode) if inode.name == name))
    }

    /// 放入编号最小的空槽位，满时返回 None
    pub fn alloc(&mut self, inode: Inode) -> Option<usize> {
        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(inode);
        Some(index)
    }

    pub fn free(&mut self, index: usize) -> Option<Inode> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    pub fn get(&self, index: usize) -> Option<&Inode> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Inode> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    pub fn slots(&self) -> &[Option<Inode>] {
        &self.slots
    }

    /// 所有文件名，按槽位升序
    pub fn names(&self) -> Vec<String> {
        self.slots
            .iter()
            .flatten()
            .map(|inode| inode.name.clone())
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}
