mod cli;

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;

use clap::Parser;
use cli::{Cli, Command};
use ext2::{Error, Ext2Fs, InodeKind, ModeFlag, Stat, BLOCK_SIZE, ROOT_INODE};
use ext2_fuse::BlockFile;

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let image = OpenOptions::new().read(true).open(&cli.image)?;
    let fs = Ext2Fs::mount(Arc::new(BlockFile(Mutex::new(image))))
        .map_err(|e| io::Error::other(format!("mount failed: {e:?}")))?;

    match cli.command {
        Command::Ls { path } => {
            let ino = resolve(&fs, &path).map_err(to_io)?;
            let mut cursor = 0;
            while let Some(entry) = fs.read_entry(ino, &mut cursor).map_err(to_io)? {
                println!("{:>8}  {:<9}  {}", entry.inode, format!("{:?}", entry.kind), entry.name);
            }
        }
        Command::Cat { path } => {
            let ino = resolve(&fs, &path).map_err(to_io)?;
            let stat = fs.stat(ino).map_err(to_io)?;
            let mut content = vec![0; stat.size as usize];
            fs.read(ino, 0, &mut content).map_err(to_io)?;
            io::stdout().write_all(&content)?;
        }
        Command::Stat { path } => {
            let ino = resolve(&fs, &path).map_err(to_io)?;
            let stat = fs.stat(ino).map_err(to_io)?;
            println!("inode: {}", stat.ino);
            println!("type: {:?}", stat.kind);
            println!("mode: {}", render_mode(&stat));
            println!("links: {}", stat.links);
            println!("owner: {}:{}", stat.uid, stat.gid);
            println!("size: {}", stat.size);
            println!("blocks: {} (512B sectors), io block: {}", stat.blocks, stat.block_size);
            println!("atime: {}", stat.atime);
            println!("mtime: {}", stat.mtime);
            println!("ctime: {}", stat.ctime);
        }
        Command::Readlink { path } => {
            let ino = resolve(&fs, &path).map_err(to_io)?;
            let mut target = [0; BLOCK_SIZE];
            let len = fs.readlink(ino, &mut target).map_err(to_io)?;
            println!("{}", String::from_utf8_lossy(&target[..len]));
        }
    }

    Ok(())
}

/// 从根目录出发逐段解析路径，多余的斜杠忽略
fn resolve(fs: &Ext2Fs, path: &str) -> Result<u32, Error> {
    let mut ino = ROOT_INODE;
    for comp in path.split('/').filter(|comp| !comp.is_empty()) {
        ino = fs.lookup(ino, comp)?.0;
    }
    Ok(ino)
}

fn render_mode(stat: &Stat) -> String {
    let kind = match stat.kind {
        InodeKind::Fifo => 'p',
        InodeKind::Char => 'c',
        InodeKind::Directory => 'd',
        InodeKind::Block => 'b',
        InodeKind::Regular => '-',
        InodeKind::Symlink => 'l',
        InodeKind::Socket => 's',
        InodeKind::Unknown => '?',
    };
    let perms = stat.perms();
    let mut out = String::with_capacity(10);
    out.push(kind);
    for (read, write, exec) in [
        (ModeFlag::OwnerRead, ModeFlag::OwnerWrite, ModeFlag::OwnerExec),
        (ModeFlag::GroupRead, ModeFlag::GroupWrite, ModeFlag::GroupExec),
        (ModeFlag::OtherRead, ModeFlag::OtherWrite, ModeFlag::OtherExec),
    ] {
        out.push(if perms.contains(read) { 'r' } else { '-' });
        out.push(if perms.contains(write) { 'w' } else { '-' });
        out.push(if perms.contains(exec) { 'x' } else { '-' });
    }
    out
}

fn to_io(e: Error) -> io::Error {
    io::Error::other(format!("{e:?}"))
}
