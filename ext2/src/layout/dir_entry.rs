use core::{mem, ptr, slice};

/// 目录项的定长头部，名字字节紧随其后
#[derive(Debug, Default, Clone)]
#[repr(C)]
pub struct RawDirEntry {
    /// 指向的inode号，0表示此槽已删除，遍历时跳过
    pub inode: u32,
    /// 本项占据的总字节数（含补齐），游标按它前进
    pub rec_len: u16,
    /// 名字的字节长度
    pub name_len: u8,
    /// 类型标签
    pub file_type: u8,
}

impl RawDirEntry {
    /// 头部恒为8字节
    pub const SIZE: usize = mem::size_of::<Self>();

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(ptr::from_mut(self).cast(), Self::SIZE) }
    }
}

/// 目录项的类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryKind {
    #[default]
    Unknown = 0,
    Regular = 1,
    Directory = 2,
    Char = 3,
    Block = 4,
    Fifo = 5,
    Socket = 6,
    Symlink = 7,
}

impl From<u8> for DirEntryKind {
    fn from(raw: u8) -> Self {
        match raw {
            1 => Self::Regular,
            2 => Self::Directory,
            3 => Self::Char,
            4 => Self::Block,
            5 => Self::Fifo,
            6 => Self::Socket,
            7 => Self::Symlink,
            _ => Self::Unknown,
        }
    }
}
