// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! roslink-msgs-dump - List registered ROS message types
//!
//! Loads the standard message catalog the same way a node does and prints
//! every package, type and wire signature.

use clap::Parser;
use colored::*;
use roslink::registry::MessageTypeRegistry;
use roslink::{NodeConfig, RosMessage};
use std::path::PathBuf;

/// List registered ROS message types
#[derive(Parser, Debug)]
#[command(name = "roslink-msgs-dump")]
#[command(version = "0.1.0")]
#[command(about = "List message types, packages and wire signatures")]
struct Args {
    /// Marker package for module discovery (repeatable; default from config)
    #[arg(short, long = "marker")]
    markers: Vec<String>,

    /// YAML node configuration (overrides ROSLINK_CONFIG_FILE)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only show types of this package
    #[arg(short, long)]
    package: Option<String>,

    /// Instantiate one type and print its definition
    #[arg(long, value_name = "TYPE")]
    create: Option<String>,

    /// Quiet mode - names only
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            let mut config = NodeConfig::from_file(path)?;
            config.apply_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            config
        }
        None => NodeConfig::from_env()?,
    };

    let markers = if args.markers.is_empty() {
        config.registry.marker_packages.clone()
    } else {
        args.markers.clone()
    };
    log::debug!("markers: {:?}", markers);

    let registry = roslink_msgs::load_registry(&markers)?;

    if let Some(name) = &args.create {
        return create(&registry, name);
    }

    if !args.quiet {
        eprintln!(
            "{} {} type(s) in {} package(s) (markers: {})",
            ">>>".green().bold(),
            registry.len(),
            registry.package_names().len(),
            markers.join(", ")
        );
    }

    for package in registry.package_names() {
        if args.package.as_deref().is_some_and(|p| p != package) {
            continue;
        }
        if !args.quiet {
            println!("{}", package.cyan().bold());
        }
        let prefix = format!("{}/", package);
        for name in registry.type_names().filter(|n| n.starts_with(&prefix)) {
            if args.quiet {
                println!("{}", name);
                continue;
            }
            let signature = registry
                .signature_of(name)
                .map(|s| s.to_string())
                .unwrap_or_default();
            let module = registry.module_of(name).unwrap_or("?");
            println!(
                "  {:<48} {} {}",
                name,
                signature.dimmed(),
                format!("[{}]", module).yellow()
            );
        }
    }

    Ok(())
}

fn create(registry: &MessageTypeRegistry, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let message = registry
        .create_message(name)
        .ok_or_else(|| format!("unknown message type {}", name))?;

    println!("{} {}", "type:".bold(), message.message_type());
    println!("{} {}", "md5sum:".bold(), message.md5sum());
    println!("{} {}", "header:".bold(), message.has_header());
    println!("{}", "definition:".bold());
    for line in message.message_definition().lines() {
        println!("  {}", line);
    }
    println!("{} {:?}", "default:".bold(), message);
    Ok(())
}
