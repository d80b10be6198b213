use super::inode::INODE_SIZE;
use crate::error::MountError;
use crate::{BLOCK_SIZE, MAGIC, REV1};

/// 超级块，位于字节偏移1024处。
/// - 提供文件系统合法性校验；
/// - 给出几何信息：总量、每组容量、首个数据块
#[derive(Debug, Clone)]
#[repr(C)]
pub struct SuperBlock {
    pub inode_count: u32,
    pub block_count: u32,
    _reserved_block_count: u32,
    _free_block_count: u32,
    _free_inode_count: u32,
    pub first_data_block: u32,
    /// 块大小为 `1024 << log_block_size`
    log_block_size: u32,
    _log_frag_size: u32,
    pub blocks_per_group: u32,
    _frags_per_group: u32,
    pub inodes_per_group: u32,
    _mtime: u32,
    _wtime: u32,
    _mount_count: u16,
    _max_mount_count: u16,
    magic: u16,
    _state: u16,
    _errors: u16,
    _minor_rev_level: u16,
    _last_check: u32,
    _check_interval: u32,
    _creator_os: u32,
    rev_level: u32,
    _def_resuid: u16,
    _def_resgid: u16,
    _first_inode: u32,
    /// 磁盘上inode记录的大小，仅支持128
    inode_size: u16,
    _block_group_nr: u16,
}

impl SuperBlock {
    /// 校验此镜像是否为受支持的 ext2 修订与布局
    pub fn check(&self) -> Result<(), MountError> {
        if self.magic != MAGIC {
            return Err(MountError::BadMagic(self.magic));
        }
        if self.rev_level != REV1 {
            return Err(MountError::UnsupportedRevision(self.rev_level));
        }
        if self.block_size() != BLOCK_SIZE {
            return Err(MountError::UnsupportedBlockSize(self.block_size()));
        }
        if usize::from(self.inode_size) != INODE_SIZE {
            return Err(MountError::UnsupportedInodeSize(self.inode_size));
        }
        Ok(())
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        1024 << self.log_block_size
    }
}
