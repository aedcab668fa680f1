// src/lib.rs

//! pkggen — PKGBUILD generator for the Power Options release channels
//!
//! Generates Arch Linux PKGBUILDs and companion `.install` scripts for
//! the Power Options components (daemon, tray, gtk, webview) on two
//! release channels:
//!
//! - **Stable**: pinned to the most recent release tag
//! - **Rolling**: `-git` packages tracking the latest commit
//!
//! # Architecture
//!
//! - Descriptor-driven: one static catalog entry per component, channel
//!   policy resolved in one place, no per-component scripts
//! - Pure rendering: manifest text is a deterministic function of the
//!   descriptor and the resolved version
//! - Version resolution behind a small `GitQuery` capability trait so
//!   tests never depend on real repository state
//! - Write-after-success: no partial manifest is ever persisted

pub mod descriptor;
mod error;
pub mod generate;
pub mod render;
pub mod version;

pub use descriptor::{
    catalog, find_component, Channel, ComponentSpec, Descriptor, InstallHooks, ProjectConfig,
    DEFAULT_URL,
};
pub use error::{Error, Result};
pub use generate::{generate, Failure, GenerateConfig, GenerateReport};
pub use render::{render_install_script, render_pkgbuild};
pub use version::{resolve_version, vercmp, GitCli, GitQuery};
