//! 间接索引块
//! - 一级：整个块连续存储**块地址**，每个地址都指向一个数据块
//! - 二级：整个块连续存储**块地址**，每个地址都指向一个一级索引块
//! - 三级：整个块连续存储**块地址**，每个地址都指向一个二级索引块
//!
//! 任何一级里地址为0都表示空洞，读作全零，不得解引用。

use core::mem;

use enumflags2::{bitflags, BitFlags};

use crate::BLOCK_SIZE;

/// 间接索引块的地址容量
pub(crate) const INDIRECT_COUNT: usize = BLOCK_SIZE / mem::size_of::<u32>();
/// 间接索引块
pub(crate) type IndirectBlock = [u32; INDIRECT_COUNT];

/// 直接索引槽位数
pub(crate) const DIRECT_COUNT: usize = 12;
/// 一级索引可编址的块数
pub(crate) const INDIRECT1_COUNT: usize = INDIRECT_COUNT;
/// 二级索引可编址的块数
pub(crate) const INDIRECT2_COUNT: usize = INDIRECT_COUNT * INDIRECT_COUNT;
/// 三级索引可编址的块数
pub(crate) const INDIRECT3_COUNT: usize = INDIRECT_COUNT * INDIRECT_COUNT * INDIRECT_COUNT;

/// 索引槽位总数：12个直接地址 + 一/二/三级间接指针各一
pub(crate) const BLOCK_SLOTS: usize = DIRECT_COUNT + 3;

/// 磁盘上inode记录的大小
pub(crate) const INODE_SIZE: usize = mem::size_of::<DiskInode>();

/// 符号链接内联上限：目标长度低于此值时直接存放在索引槽位的字节里
pub(crate) const INLINE_SYMLINK_MAX: usize = BLOCK_SLOTS * mem::size_of::<u32>();

/// 磁盘上的inode记录，128字节
#[derive(Debug, Default, Clone)]
#[repr(C)]
pub struct DiskInode {
    /// 类型与权限位
    mode: u16,
    uid: u16,
    /// 字节大小
    size: u32,
    atime: u32,
    ctime: u32,
    mtime: u32,
    _dtime: u32,
    gid: u16,
    /// 硬链接个数
    links: u16,
    /// 占用的512字节扇区数
    blocks: u32,
    _flags: u32,
    _osd1: u32,
    /// 索引槽位：前12个为直接块地址，随后是一/二/三级间接指针
    block: [u32; BLOCK_SLOTS],
    _generation: u32,
    _file_acl: u32,
    _dir_acl: u32,
    _faddr: u32,
    _osd2: [u8; 12],
}

/// inode类型，取自`mode`的高四位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeKind {
    Fifo,
    Char,
    Directory,
    Block,
    Regular,
    Symlink,
    Socket,
    Unknown,
}

/// `mode`的权限位
#[bitflags]
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlag {
    OtherExec = 0o0001,
    OtherWrite = 0o0002,
    OtherRead = 0o0004,
    GroupExec = 0o0010,
    GroupWrite = 0o0020,
    GroupRead = 0o0040,
    OwnerExec = 0o0100,
    OwnerWrite = 0o0200,
    OwnerRead = 0o0400,
    Sticky = 0o1000,
    SetGid = 0o2000,
    SetUid = 0o4000,
}

impl DiskInode {
    #[inline]
    pub fn kind(&self) -> InodeKind {
        InodeKind::from_mode(self.mode)
    }

    #[inline]
    pub fn mode(&self) -> u16 {
        self.mode
    }

    /// 权限位视图
    #[inline]
    pub fn perms(&self) -> BitFlags<ModeFlag> {
        BitFlags::from_bits_truncate(self.mode)
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn links(&self) -> u16 {
        self.links
    }

    #[inline]
    pub fn uid(&self) -> u16 {
        self.uid
    }

    #[inline]
    pub fn gid(&self) -> u16 {
        self.gid
    }

    #[inline]
    pub fn blocks(&self) -> u32 {
        self.blocks
    }

    #[inline]
    pub fn atime(&self) -> u32 {
        self.atime
    }

    #[inline]
    pub fn mtime(&self) -> u32 {
        self.mtime
    }

    #[inline]
    pub fn ctime(&self) -> u32 {
        self.ctime
    }

    /// 读取原始索引槽位
    #[inline]
    pub fn slot(&self, i: usize) -> u32 {
        self.block[i]
    }

    #[inline]
    pub(crate) fn direct(&self, i: usize) -> u32 {
        self.block[i]
    }

    #[inline]
    pub(crate) fn indirect1(&self) -> u32 {
        self.block[DIRECT_COUNT]
    }

    #[inline]
    pub(crate) fn indirect2(&self) -> u32 {
        self.block[DIRECT_COUNT + 1]
    }

    #[inline]
    pub(crate) fn indirect3(&self) -> u32 {
        self.block[DIRECT_COUNT + 2]
    }

    /// 内联符号链接的目标就存放在索引槽位的字节里
    pub(crate) fn inline_target(&self) -> [u8; INLINE_SYMLINK_MAX] {
        let mut bytes = [0; INLINE_SYMLINK_MAX];
        for (chunk, ptr) in bytes.chunks_exact_mut(4).zip(self.block) {
            chunk.copy_from_slice(&ptr.to_le_bytes());
        }
        bytes
    }
}

impl InodeKind {
    const MASK: u16 = 0xF000;

    fn from_mode(mode: u16) -> Self {
        match mode & Self::MASK {
            0x1000 => Self::Fifo,
            0x2000 => Self::Char,
            0x4000 => Self::Directory,
            0x6000 => Self::Block,
            0x8000 => Self::Regular,
            0xA000 => Self::Symlink,
            0xC000 => Self::Socket,
            _ => Self::Unknown,
        }
    }
}
