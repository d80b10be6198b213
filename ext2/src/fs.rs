//! # 文件系统层
//!
//! 挂载镜像后持有几何信息与块组描述符表，
//! 负责位图查询、inode读取、逻辑块地址翻译与定位读取。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use block_dev::BlockDevice;

use crate::block_cache::{BlockCache, BufRef};
use crate::error::{Error, MountError};
use crate::layout::{
    DiskInode, GroupDesc, IndirectBlock, SuperBlock, DIRECT_COUNT, INDIRECT1_COUNT,
    INDIRECT2_COUNT, INDIRECT3_COUNT, INODE_SIZE,
};
use crate::{BLOCK_SIZE, GROUP_DESC_OFFSET, SUPERBLOCK_OFFSET};

/// 一个已挂载的只读 ext2 镜像
pub struct Ext2Fs {
    cache: BlockCache,
    geo: Geometry,
    groups: Vec<GroupDesc>,
}

/// 从超级块提取的几何信息，挂载后不再变化
#[derive(Debug)]
struct Geometry {
    block_count: usize,
    inode_count: usize,
    blocks_per_group: usize,
    inodes_per_group: usize,
    first_data_block: usize,
}

/// 逻辑块索引的翻译结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockAddr {
    /// 有后备物理块
    Block(u32),
    /// 空洞，读作全零，不得当作块地址解引用
    Hole,
}

/// 取块的结果
pub(crate) enum Fetched<'c> {
    Buf(BufRef<'c>),
    Hole,
}

impl Ext2Fs {
    /// 挂载镜像：初始化缓冲池，校验超级块，载入块组描述符表。
    pub fn mount(dev: Arc<dyn BlockDevice>) -> Result<Self, MountError> {
        let cache = BlockCache::new(dev);

        let sb = cache
            .meta((SUPERBLOCK_OFFSET / BLOCK_SIZE) as u32)
            .map(SUPERBLOCK_OFFSET % BLOCK_SIZE, |sb: &SuperBlock| sb.clone());
        sb.check()?;

        let geo = Geometry {
            block_count: sb.block_count as usize,
            inode_count: sb.inode_count as usize,
            blocks_per_group: sb.blocks_per_group as usize,
            inodes_per_group: sb.inodes_per_group as usize,
            first_data_block: sb.first_data_block as usize,
        };
        log::debug!(
            "superblock: inodes={} blocks={} block_size={} bpg={} ipg={} first_data_block={}",
            geo.inode_count,
            geo.block_count,
            sb.block_size(),
            geo.blocks_per_group,
            geo.inodes_per_group,
            geo.first_data_block,
        );

        let group_count = geo.block_count.div_ceil(geo.blocks_per_group);
        let mut groups = Vec::with_capacity(group_count);
        for i in 0..group_count {
            // 描述符逐条克隆下来；32字节记录不跨块
            let pos = GROUP_DESC_OFFSET + i * mem::size_of::<GroupDesc>();
            groups.push(
                cache
                    .meta((pos / BLOCK_SIZE) as u32)
                    .map(pos % BLOCK_SIZE, |desc: &GroupDesc| desc.clone()),
            );
        }

        Ok(Self { cache, geo, groups })
    }

    /// 块位图查询：`addr`处的物理块是否已分配
    pub fn block_allocated(&self, addr: u32) -> Result<bool, Error> {
        if addr == 0 || addr as usize >= self.geo.block_count {
            return Err(Error::InvalidArgument);
        }
        let group = (addr as usize - 1) / self.geo.blocks_per_group;
        let offset = (addr as usize - 1) % self.geo.blocks_per_group;
        Ok(self.bitmap_bit(self.groups[group].block_bitmap, offset))
    }

    /// inode位图查询：`ino`号inode是否已分配
    pub fn inode_allocated(&self, ino: u32) -> Result<bool, Error> {
        if ino == 0 || ino as usize >= self.geo.inode_count {
            return Err(Error::InvalidArgument);
        }
        let group = (ino as usize - 1) / self.geo.inodes_per_group;
        let offset = (ino as usize - 1) % self.geo.inodes_per_group;
        Ok(self.bitmap_bit(self.groups[group].inode_bitmap, offset))
    }

    fn bitmap_bit(&self, bitmap_block: u32, offset: usize) -> bool {
        let byte = self
            .cache
            .meta(bitmap_block)
            .map(offset / 8, |byte: &u8| *byte);
        byte & (1 << (offset % 8)) != 0
    }

    /// 读取并解码`ino`号inode记录。要求该inode已分配。
    pub fn read_inode(&self, ino: u32) -> Result<DiskInode, Error> {
        if !self.inode_allocated(ino)? {
            return Err(Error::NotFound);
        }
        let group = (ino as usize - 1) / self.geo.inodes_per_group;
        let index = (ino as usize - 1) % self.geo.inodes_per_group;

        // 表内字节偏移换算成块地址与块内偏移；记录不跨块（1024 % 128 == 0）
        let pos = index * INODE_SIZE;
        let block = self.groups[group].inode_table as usize + pos / BLOCK_SIZE;
        Ok(self
            .cache
            .meta(block as u32)
            .map(pos % BLOCK_SIZE, |inode: &DiskInode| inode.clone()))
    }

    /// 把文件`ino`的逻辑块索引翻译成物理块地址。
    ///
    /// `ino == 0`是元数据地址空间：索引本身就是物理块地址。
    /// 依次从索引中减掉直接、一级、二级的编址容量来选定层级；
    /// 索引超出三级的编址范围时报`InvalidArgument`。
    pub fn block_addr(&self, ino: u32, index: u32) -> Result<BlockAddr, Error> {
        if ino == 0 {
            return Ok(BlockAddr::Block(index));
        }

        let inode = self.read_inode(ino)?;
        let mut index = index as usize;

        if index < DIRECT_COUNT {
            return Ok(Self::addr(inode.direct(index)));
        }
        index -= DIRECT_COUNT;

        if index < INDIRECT1_COUNT {
            let ind1 = inode.indirect1();
            if ind1 == 0 {
                return Ok(BlockAddr::Hole);
            }
            return Ok(Self::addr(self.block_ptr(ind1, index)));
        }
        index -= INDIRECT1_COUNT;

        if index < INDIRECT2_COUNT {
            let ind2 = inode.indirect2();
            if ind2 == 0 {
                return Ok(BlockAddr::Hole);
            }
            let ind1 = self.block_ptr(ind2, index / INDIRECT1_COUNT);
            if ind1 == 0 {
                return Ok(BlockAddr::Hole);
            }
            return Ok(Self::addr(self.block_ptr(ind1, index % INDIRECT1_COUNT)));
        }
        index -= INDIRECT2_COUNT;

        if index < INDIRECT3_COUNT {
            let ind3 = inode.indirect3();
            if ind3 == 0 {
                return Ok(BlockAddr::Hole);
            }
            let ind2 = self.block_ptr(ind3, index / INDIRECT2_COUNT);
            if ind2 == 0 {
                return Ok(BlockAddr::Hole);
            }
            let ind1 = self.block_ptr(ind2, index % INDIRECT2_COUNT / INDIRECT1_COUNT);
            if ind1 == 0 {
                return Ok(BlockAddr::Hole);
            }
            return Ok(Self::addr(self.block_ptr(ind1, index % INDIRECT1_COUNT)));
        }

        Err(Error::InvalidArgument)
    }

    /// 从`addr`处的间接索引块里取出第`i`个块地址
    fn block_ptr(&self, addr: u32, i: usize) -> u32 {
        self.cache
            .meta(addr)
            .map(0, |indirect: &IndirectBlock| indirect[i])
    }

    #[inline]
    fn addr(raw: u32) -> BlockAddr {
        if raw == 0 {
            BlockAddr::Hole
        } else {
            BlockAddr::Block(raw)
        }
    }

    /// 取来文件`ino`第`index`个逻辑块的缓冲。
    ///
    /// 命中缓存直接复用；否则翻译地址、核对块位图后从设备读入。
    /// 读到位图标记为空闲的块说明镜像自相矛盾，决不静默服务。
    pub(crate) fn fetch(&self, ino: u32, index: u32) -> Result<Fetched<'_>, Error> {
        if let Some(buf) = self.cache.lookup(ino, index) {
            return Ok(Fetched::Buf(buf));
        }

        match self.block_addr(ino, index)? {
            BlockAddr::Block(addr) => {
                if ino != 0 && !self.block_allocated(addr)? {
                    log::error!("block {addr} is marked free but referenced by inode {ino}");
                    return Err(Error::Corrupted);
                }
                Ok(Fetched::Buf(self.cache.acquire_at(ino, index, addr)))
            }
            BlockAddr::Hole => Ok(Fetched::Hole),
        }
    }

    /// 从`pos`字节处读满`buf`。
    ///
    /// 对普通文件要求`pos + buf.len()`不越过文件大小，越界则整体拒绝；
    /// 空洞块填零。
    pub fn read(&self, ino: u32, pos: usize, buf: &mut [u8]) -> Result<(), Error> {
        if ino != 0 {
            let inode = self.read_inode(ino)?;
            if (inode.size() as usize) < pos + buf.len() {
                return Err(Error::InvalidArgument);
            }
        }

        let mut index = (pos / BLOCK_SIZE) as u32;
        let mut offset = pos % BLOCK_SIZE;
        let mut done = 0;
        while done < buf.len() {
            let take = (buf.len() - done).min(BLOCK_SIZE - offset);
            match self.fetch(ino, index)? {
                Fetched::Buf(block) => block.map_slice(|data| {
                    buf[done..done + take].copy_from_slice(&data[offset..offset + take])
                }),
                Fetched::Hole => buf[done..done + take].fill(0),
            }
            done += take;
            offset = 0;
            index += 1;
        }
        Ok(())
    }
}
