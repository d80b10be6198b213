//! # 操作层
//!
//! 面向调用者的目录遍历、按名查找、元信息与符号链接读取。

use alloc::string::String;
use alloc::vec;

use enumflags2::BitFlags;

use crate::error::Error;
use crate::layout::{DirEntryKind, InodeKind, ModeFlag, RawDirEntry, INLINE_SYMLINK_MAX};
use crate::{Ext2Fs, BLOCK_SIZE};

/// 遍历目录时产出的目录项
#[derive(Debug)]
pub struct DirEntry {
    pub inode: u32,
    pub kind: DirEntryKind,
    pub name: String,
}

/// stat 结果
#[derive(Debug, Clone)]
pub struct Stat {
    pub ino: u32,
    pub kind: InodeKind,
    /// 类型与权限位，原样来自磁盘
    pub mode: u16,
    pub links: u16,
    pub uid: u16,
    pub gid: u16,
    pub size: u32,
    /// 推荐的I/O块大小
    pub block_size: u32,
    /// 占用的512字节扇区数
    pub blocks: u32,
    pub atime: u32,
    pub mtime: u32,
    pub ctime: u32,
}

impl Stat {
    /// 权限位视图
    #[inline]
    pub fn perms(&self) -> BitFlags<ModeFlag> {
        BitFlags::from_bits_truncate(self.mode)
    }
}

impl Ext2Fs {
    /// 读取`cursor`处的下一个目录项并前进游标。
    ///
    /// 游标由调用者持有：首次传0，之后传上次调用留下的值。
    /// inode号为0的槽位是删除残留，循环跳过；
    /// 目录耗尽时返回`None`。
    pub fn read_entry(&self, ino: u32, cursor: &mut u32) -> Result<Option<DirEntry>, Error> {
        let size = self.read_inode(ino)?.size();

        loop {
            if *cursor >= size {
                return Ok(None);
            }

            let mut raw = RawDirEntry::default();
            self.read(ino, *cursor as usize, raw.as_bytes_mut())?;
            if usize::from(raw.rec_len) < RawDirEntry::SIZE {
                log::error!(
                    "directory inode {ino} offset {cursor}: record length {} shorter than header",
                    raw.rec_len,
                );
                return Err(Error::Corrupted);
            }

            let mut name = vec![0; usize::from(raw.name_len)];
            self.read(ino, *cursor as usize + RawDirEntry::SIZE, &mut name)?;
            *cursor += u32::from(raw.rec_len);

            if raw.inode == 0 {
                continue;
            }

            return Ok(Some(DirEntry {
                inode: raw.inode,
                kind: raw.file_type.into(),
                name: String::from_utf8_lossy(&name).into_owned(),
            }));
        }
    }

    /// 在目录`ino`下按名查找，命中则给出`(inode号, 类型标签)`。
    pub fn lookup(&self, ino: u32, name: &str) -> Result<(u32, DirEntryKind), Error> {
        if name.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if self.read_inode(ino)?.kind() != InodeKind::Directory {
            return Err(Error::NotADirectory);
        }

        let mut cursor = 0;
        while let Some(entry) = self.read_entry(ino, &mut cursor)? {
            // 先比长度，再比内容
            if entry.name.len() == name.len() && entry.name == name {
                return Ok((entry.inode, entry.kind));
            }
        }
        Err(Error::NotFound)
    }

    /// 元信息快照
    pub fn stat(&self, ino: u32) -> Result<Stat, Error> {
        let inode = self.read_inode(ino)?;
        Ok(Stat {
            ino,
            kind: inode.kind(),
            mode: inode.mode(),
            links: inode.links(),
            uid: inode.uid(),
            gid: inode.gid(),
            size: inode.size(),
            block_size: BLOCK_SIZE as u32,
            blocks: inode.blocks(),
            atime: inode.atime(),
            mtime: inode.mtime(),
            ctime: inode.ctime(),
        })
    }

    /// 读取符号链接的目标到`buf`，返回目标长度。
    ///
    /// 短目标内联在inode的索引槽位里，长目标按普通内容读取。
    pub fn readlink(&self, ino: u32, buf: &mut [u8]) -> Result<usize, Error> {
        let inode = self.read_inode(ino)?;
        let len = inode.size() as usize;
        if inode.kind() != InodeKind::Symlink || len > buf.len() {
            return Err(Error::InvalidArgument);
        }

        if len < INLINE_SYMLINK_MAX {
            buf[..len].copy_from_slice(&inode.inline_target()[..len]);
        } else {
            self.read(ino, 0, &mut buf[..len])?;
        }
        Ok(len)
    }
}
