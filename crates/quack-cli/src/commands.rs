use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use quack_profile::Quack;
use quack_types::{FieldResult, Profile, QuackConfig, Username};
use serde_json::{json, Value};

use crate::cli::*;

const DEFAULT_CONFIG: &str = "quack.toml";

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(cli.config.as_deref(), cli.root)?;
    let format = cli.format;
    let quack = Quack::open(config);
    match cli.command {
        Command::Upload(args) => cmd_upload(&quack, args, format),
        Command::Profile(args) => cmd_profile(&quack, &args.user, format),
        Command::Images(args) => cmd_images(&quack, &args.user, format),
        Command::Followers(args) => {
            let users = quack.graph().followers_of(&args.user)?;
            print_users(&args.user, "followers", &users, format)
        }
        Command::Following(args) => {
            let users = quack.graph().following_of(&args.user)?;
            print_users(&args.user, "following", &users, format)
        }
        Command::Follow(args) => cmd_follow(&quack, args, true),
        Command::Unfollow(args) => cmd_follow(&quack, args, false),
        Command::Config => cmd_config(quack.config(), format),
    }
}

/// `--config`, else `./quack.toml` if present, else defaults; `--root` wins.
fn resolve_config(
    path: Option<&Path>,
    root: Option<PathBuf>,
) -> anyhow::Result<QuackConfig> {
    let mut config = match path {
        Some(path) => QuackConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).is_file() => {
            QuackConfig::load(Path::new(DEFAULT_CONFIG))?
        }
        None => QuackConfig::default(),
    };
    if let Some(root) = root {
        config.root = root;
    }
    Ok(config)
}

fn cmd_upload(quack: &Quack, args: UploadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let record = quack
        .upload(&args.user, &args.file, &args.caption)
        .with_context(|| format!("uploading {}", args.file.display()))?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
        OutputFormat::Text => {
            println!("{} Stored {}", "✓".green().bold(), record.key().yellow().bold());
            println!("  Caption: {}", record.caption);
            println!("  Time: {}", record.timestamp.to_string().dimmed());
        }
    }
    Ok(())
}

fn cmd_profile(quack: &Quack, user: &Username, format: OutputFormat) -> anyhow::Result<()> {
    let profile = quack.load_profile(user);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile_json(&profile))?),
        OutputFormat::Text => {
            println!("{}", profile.username.to_string().bold());
            println!("  Posts: {}", show(&profile.post_count));
            println!("  Followers: {}", show(&profile.follower_count));
            println!("  Following: {}", show(&profile.following_count));
            println!("  Bio: {}", show(&profile.bio));
            for err in profile.errors() {
                eprintln!("{} {}", "warning:".yellow().bold(), err);
            }
        }
    }
    Ok(())
}

fn show<T: Display>(field: &FieldResult<T>) -> String {
    match field {
        Ok(value) => value.to_string(),
        Err(_) => "-".dimmed().to_string(),
    }
}

/// Flat JSON view: a failed field is `null` and listed under `errors`.
fn profile_json(profile: &Profile) -> Value {
    json!({
        "username": profile.username,
        "post_count": profile.post_count.as_ref().ok(),
        "follower_count": profile.follower_count.as_ref().ok(),
        "following_count": profile.following_count.as_ref().ok(),
        "bio": profile.bio.as_ref().ok(),
        "errors": profile.errors(),
    })
}

fn cmd_images(quack: &Quack, user: &Username, format: OutputFormat) -> anyhow::Result<()> {
    let records = quack.images().records_for_user(user)?;
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No images for {}.", user.to_string().bold());
    }
    for record in &records {
        let file = match quack.images().image_path(record)? {
            Some(path) => path.display().to_string(),
            None => "missing".red().to_string(),
        };
        println!(
            "{}  {}  {} likes  {}",
            record.key().yellow(),
            record.timestamp.to_string().dimmed(),
            record.likes,
            record.caption
        );
        println!("  {}", file.dimmed());
    }
    Ok(())
}

fn print_users(
    user: &Username,
    label: &str,
    users: &[Username],
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(users)?),
        OutputFormat::Text => {
            println!("{} {}: {}", user.to_string().bold(), label, users.len());
            for u in users {
                println!("  {u}");
            }
        }
    }
    Ok(())
}

fn cmd_follow(quack: &Quack, args: EdgeArgs, follow: bool) -> anyhow::Result<()> {
    let changed = if follow {
        quack.graph().follow(&args.follower, &args.followee)?
    } else {
        quack.graph().unfollow(&args.follower, &args.followee)?
    };
    let edge = format!("{} -> {}", args.follower, args.followee);
    match (follow, changed) {
        (true, true) => println!("{} Followed: {}", "✓".green().bold(), edge.yellow()),
        (false, true) => println!("{} Unfollowed: {}", "✓".green().bold(), edge.yellow()),
        (_, false) => println!("No change: {}", edge.dimmed()),
    }
    Ok(())
}

fn cmd_config(config: &QuackConfig, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}
