use std::path::PathBuf;
use uuid::Uuid;

/// 生成一个随机唯一 ID
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// 连接会话 ID，取 uuid 前 8 位，日志里够用
pub fn session_id() -> String {
    generate_uuid()[..8].to_string()
}

/// 临时目录下一个不会冲突的磁盘镜像路径（测试用）
pub fn scratch_disk_path() -> PathBuf {
    std::env::temp_dir().join(format!("file-server-{}.img", generate_uuid()))
}
