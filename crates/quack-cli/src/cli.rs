use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quack_types::Username;

#[derive(Parser)]
#[command(
    name = "quack",
    about = "Quackstagram data layer: uploads, profiles and the follow graph",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Data root (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to a quack.toml config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store an image as a user's next post
    Upload(UploadArgs),
    /// Show a user's profile
    Profile(UserArgs),
    /// List a user's images
    Images(UserArgs),
    /// List a user's followers
    Followers(UserArgs),
    /// List the users a user follows
    Following(UserArgs),
    /// Add a follow edge
    Follow(EdgeArgs),
    /// Remove a follow edge
    Unfollow(EdgeArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct UploadArgs {
    pub user: Username,
    pub file: PathBuf,
    #[arg(short, long, default_value = "")]
    pub caption: String,
}

#[derive(Args)]
pub struct UserArgs {
    pub user: Username,
}

#[derive(Args)]
pub struct EdgeArgs {
    pub follower: Username,
    pub followee: Username,
}
