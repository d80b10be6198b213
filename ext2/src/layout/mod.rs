//! # 磁盘数据结构层
//!
//! ext2 的磁盘布局（块大小1024时）：
//! 启动块 | 超级块 | 块组描述符表 | 块位图 | inode位图 | inode表 | 数据块
//! 其中位图与inode表逐块组重复。

mod dir_entry;
mod group_desc;
mod inode;
mod super_block;

pub use self::{
    dir_entry::{DirEntryKind, RawDirEntry},
    group_desc::GroupDesc,
    inode::{DiskInode, InodeKind, ModeFlag},
    super_block::SuperBlock,
};
pub(crate) use self::inode::{
    IndirectBlock, DIRECT_COUNT, INDIRECT1_COUNT, INDIRECT2_COUNT, INDIRECT3_COUNT,
    INLINE_SYMLINK_MAX, INODE_SIZE,
};
