use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// ext2 image file
    #[arg(long, short)]
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List a directory
    Ls { path: String },
    /// Print a regular file to stdout
    Cat { path: String },
    /// Show inode metadata
    Stat { path: String },
    /// Show a symlink's target
    Readlink { path: String },
}
