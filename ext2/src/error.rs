/// 各操作可返回给调用者的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// 参数越界或不合法
    InvalidArgument,
    /// 名字或inode不存在
    NotFound,
    /// 对非目录做目录操作
    NotADirectory,
    /// 镜像自相矛盾，继续服务会给出错误数据
    Corrupted,
}

/// 挂载期校验失败。任何一种都意味着镜像不能被安全服务。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountError {
    BadMagic(u16),
    UnsupportedRevision(u32),
    UnsupportedBlockSize(usize),
    UnsupportedInodeSize(u16),
}
