/// 块组描述符，每组一条32字节记录，
/// 描述符表自字节偏移2048起连续存放。
#[derive(Debug, Clone)]
#[repr(C)]
pub struct GroupDesc {
    /// 本组块位图所在的块地址
    pub block_bitmap: u32,
    /// 本组inode位图所在的块地址
    pub inode_bitmap: u32,
    /// 本组inode表的起始块地址
    pub inode_table: u32,
    _free_block_count: u16,
    _free_inode_count: u16,
    _used_dir_count: u16,
    _pad: u16,
    _reserved: [u8; 12],
}
