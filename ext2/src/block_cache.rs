//! # 块缓存层
//!
//! 定容的磁盘块缓冲池。容量在编译期定死，运行期不再分配：
//! 空槽用完之后，回收最近释放的缓冲来容纳新块。
//!
//! 缓冲按`(ino, index)`哈希索引；同一个键在池中至多有一份缓冲，
//! 再次取用时直接复用并增加引用数。引用数不为零的缓冲绝不回收。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::mem;

use block_dev::BlockDevice;
use spin::Mutex;

use crate::{DataBlock, BLOCK_SIZE};

/// 哈希桶的个数
const BUCKETS: usize = 16;
/// 缓冲池的槽位数，约合64KiB的缓冲数据
const POOL_SLOTS: usize = BUCKETS * 4;

/// 多数文件很小，`index`通常偏低；而 ext2 倾向于在各块组开头分配块，
/// `ino`则难以预测。
#[inline]
fn bucket(ino: u32, index: u32) -> usize {
    (ino as usize + index as usize) % BUCKETS
}

pub(crate) struct BlockCache {
    dev: Arc<dyn BlockDevice>,
    pool: Mutex<Pool>,
}

struct Pool {
    /// 全部槽位，挂载时一次性分配
    slots: Vec<Slot>,
    /// 每个桶存放槽位下标
    buckets: [Vec<usize>; BUCKETS],
    /// 从未装载过数据的槽位
    free: Vec<usize>,
    /// 引用数归零的槽位，末尾是最近释放的
    lru: Vec<usize>,
}

#[repr(C)]
struct Slot {
    data: DataBlock,
    /// 所属文件的inode号，0表示元数据地址空间
    ino: u32,
    /// 文件内的逻辑块索引
    index: u32,
    /// 解析出的物理块地址
    addr: u32,
    /// 归零则槽位可回收
    refcnt: u32,
}

impl Slot {
    const fn empty() -> Self {
        Self {
            data: [0; BLOCK_SIZE],
            ino: 0,
            index: 0,
            addr: 0,
            refcnt: 0,
        }
    }
}

impl BlockCache {
    pub(crate) fn new(dev: Arc<dyn BlockDevice>) -> Self {
        let mut slots = Vec::with_capacity(POOL_SLOTS);
        slots.resize_with(POOL_SLOTS, Slot::empty);

        Self {
            dev,
            pool: Mutex::new(Pool {
                slots,
                buckets: Default::default(),
                free: (0..POOL_SLOTS).collect(),
                lru: Vec::with_capacity(POOL_SLOTS),
            }),
        }
    }

    /// 在池中寻找`(ino, index)`的缓冲，命中则增加引用数后交出句柄
    pub(crate) fn lookup(&self, ino: u32, index: u32) -> Option<BufRef<'_>> {
        let mut pool = self.pool.lock();

        let slot = pool.buckets[bucket(ino, index)]
            .iter()
            .copied()
            .find(|&i| pool.slots[i].ino == ino && pool.slots[i].index == index)?;

        if pool.slots[slot].refcnt == 0 {
            // 重新上岗，从回收队列摘除
            pool.lru.retain(|&i| i != slot);
        }
        pool.slots[slot].refcnt += 1;

        Some(BufRef { cache: self, slot })
    }

    /// 为`(ino, index)`装入一个新缓冲：从设备读入`addr`处的一整块。
    /// 调用者须确保该键尚未被缓存。
    pub(crate) fn acquire_at(&self, ino: u32, index: u32, addr: u32) -> BufRef<'_> {
        let mut pool = self.pool.lock();
        let slot = pool.take_slot();

        let s = &mut pool.slots[slot];
        s.ino = ino;
        s.index = index;
        s.addr = addr;
        s.refcnt = 1;
        self.dev.read_block(addr as usize, &mut s.data);

        pool.buckets[bucket(ino, index)].push(slot);
        BufRef { cache: self, slot }
    }

    /// 元数据地址空间：`addr`本身就是物理块地址，绕过翻译器
    pub(crate) fn meta(&self, addr: u32) -> BufRef<'_> {
        self.lookup(0, addr)
            .unwrap_or_else(|| self.acquire_at(0, addr, addr))
    }

    fn release(&self, slot: usize) {
        let mut pool = self.pool.lock();
        pool.slots[slot].refcnt -= 1;
        if pool.slots[slot].refcnt == 0 {
            pool.lru.push(slot);
        }
    }
}

impl Pool {
    /// 取一个可写入新块的槽位：优先用空槽，其次回收最近释放的缓冲
    fn take_slot(&mut self) -> usize {
        if let Some(slot) = self.free.pop() {
            return slot;
        }

        // 回收意味着键失效，桶里的下标要一并摘除
        let slot = self.lru.pop().expect("free buffer pool exhausted");
        let stale = bucket(self.slots[slot].ino, self.slots[slot].index);
        self.buckets[stale].retain(|&i| i != slot);
        slot
    }
}

/// 缓冲句柄。存活期间对应槽位不会被回收，析构即释放。
pub(crate) struct BufRef<'c> {
    cache: &'c BlockCache,
    slot: usize,
}

impl BufRef<'_> {
    pub(crate) fn map<T: Sized, V>(&self, offset: usize, f: impl FnOnce(&T) -> V) -> V {
        let type_size = mem::size_of::<T>();
        assert!(type_size + offset <= BLOCK_SIZE);
        let pool = self.cache.pool.lock();
        let addr = &pool.slots[self.slot].data[offset] as *const u8;
        f(unsafe { &*addr.cast() })
    }

    #[inline]
    pub(crate) fn map_slice<V>(&self, f: impl FnOnce(&[u8]) -> V) -> V {
        let pool = self.cache.pool.lock();
        f(&pool.slots[self.slot].data)
    }
}

impl Drop for BufRef<'_> {
    fn drop(&mut self) {
        self.cache.release(self.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 每块填充自身块号低八位的假设备
    struct PatternDisk;

    impl BlockDevice for PatternDisk {
        fn read_block(&self, block_id: usize, buf: &mut [u8]) {
            buf.fill(block_id as u8);
        }
    }

    fn cache() -> BlockCache {
        BlockCache::new(Arc::new(PatternDisk))
    }

    #[test]
    fn second_acquire_reuses_buffer() {
        let cache = cache();

        let first = cache.meta(7);
        let second = cache.lookup(0, 7).unwrap();
        let slot = first.slot;
        assert_eq!(slot, second.slot);
        assert_eq!(2, cache.pool.lock().slots[slot].refcnt);
        second.map_slice(|data| assert!(data.iter().all(|&b| b == 7)));

        drop(first);
        assert_eq!(1, cache.pool.lock().slots[slot].refcnt);
        drop(second);

        let pool = cache.pool.lock();
        assert_eq!(0, pool.slots[slot].refcnt);
        assert_eq!(Some(&slot), pool.lru.last());
    }

    #[test]
    fn reclaims_most_recently_released_first() {
        let cache = cache();
        for addr in 1..=POOL_SLOTS as u32 {
            cache.meta(addr);
        }

        // 空槽已耗尽，这次回收的应是最近释放的缓冲，即块64的
        cache.meta(POOL_SLOTS as u32 + 1);
        assert!(cache.lookup(0, POOL_SLOTS as u32).is_none());
        assert!(cache.lookup(0, 1).is_some());
    }

    #[test]
    fn pinned_buffers_survive_pressure() {
        let cache = cache();
        let pinned = cache.meta(42);
        for addr in 1..POOL_SLOTS as u32 {
            cache.meta(addr + 100);
        }
        cache.meta(1000);

        let again = cache.lookup(0, 42).unwrap();
        assert_eq!(pinned.slot, again.slot);
        again.map_slice(|data| assert!(data.iter().all(|&b| b == 42)));
    }

    #[test]
    #[should_panic(expected = "free buffer pool exhausted")]
    fn leaking_every_buffer_is_fatal() {
        let cache = cache();
        let mut held = Vec::new();
        for addr in 1..=POOL_SLOTS as u32 + 1 {
            held.push(cache.meta(addr));
        }
    }
}
