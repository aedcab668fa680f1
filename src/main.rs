// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use pkggen::{Channel, DEFAULT_URL};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "pkggen")]
#[command(author, version, about = "PKGBUILD generator for the Power Options release channels", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate PKGBUILDs and install scripts for every component and channel
    Generate {
        /// Output root; one directory per component-channel pair is created under it
        #[arg(short, long, default_value = "./pkgbuilds")]
        output: PathBuf,

        /// Project repository URL embedded in the manifests
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,

        /// Git repository versions are resolved from
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Restrict to one component (daemon, tray, gtk, webview)
        #[arg(long)]
        component: Option<String>,

        /// Restrict to one channel
        #[arg(long, value_enum)]
        channel: Option<Channel>,
    },
    /// Print the component catalog
    List {
        /// Emit resolved descriptors for both channels as JSON
        #[arg(long)]
        json: bool,

        /// Project repository URL embedded in the descriptors
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// Render one manifest to stdout with an explicit version (no git needed)
    Show {
        /// Component to render (daemon, tray, gtk, webview)
        component: String,

        /// Channel to render
        #[arg(long, value_enum, default_value = "stable")]
        channel: Channel,

        /// Version string to embed as pkgver
        #[arg(long)]
        version: String,

        /// Project repository URL embedded in the manifest
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            output,
            url,
            repo,
            component,
            channel,
        } => commands::run_generate(output, url, &repo, component, channel),
        Commands::List { json, url } => commands::run_list(url, json),
        Commands::Show {
            component,
            channel,
            version,
            url,
        } => commands::run_show(&component, channel, &version, url),
    }
}
