//! # 块设备接口层
//!
//! 块设备是以**块**为单位存储数据的设备，例如磁盘镜像文件；
//! [`BlockDevice`] 就是对读取块设备的抽象，
//! 实现了此特质的类型称为**块设备驱动**。
//!
//! 本仓库是只读的 ext2 阅读器，因此接口只有读取一侧。

#![no_std]

use core::any::Any;

/// 块设备驱动特质
pub trait BlockDevice: Send + Sync + Any {
    /// 读取一整块到`buf`当中。
    ///
    /// 读不满一块视为镜像损坏，实现方必须就地失败，
    /// 不得静默返回残缺数据。
    fn read_block(&self, block_id: usize, buf: &mut [u8]);
}
