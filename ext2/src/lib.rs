#![no_std]

extern crate alloc;

/* ext2 阅读器的整体架构，自上而下 */

// 操作层：目录遍历、按名查找、stat、readlink
mod vfs;

// 文件系统层：几何信息、位图、inode读取、块地址翻译、定位读取
mod fs;

// 磁盘数据结构层：表示 ext2 磁盘布局的数据结构
mod layout;

// 块缓存层：定容的磁盘块缓冲池
mod block_cache;

mod error;

pub use self::{
    error::{Error, MountError},
    fs::{BlockAddr, Ext2Fs},
    layout::{DirEntryKind, DiskInode, InodeKind, ModeFlag},
    vfs::{DirEntry, Stat},
};

/// 超级块的魔数
pub const MAGIC: u16 = 0xEF53;
/// 唯一支持的修订号
pub const REV1: u32 = 1;
/// 唯一支持的块大小
pub const BLOCK_SIZE: usize = 1024;
/// 根目录的inode号
pub const ROOT_INODE: u32 = 2;

/// 超级块所在的字节偏移
pub(crate) const SUPERBLOCK_OFFSET: usize = 1024;
/// 块组描述符表所在的字节偏移
pub(crate) const GROUP_DESC_OFFSET: usize = 2048;

type DataBlock = [u8; BLOCK_SIZE];
