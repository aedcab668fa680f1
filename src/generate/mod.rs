// src/generate/mod.rs

//! Generation driver
//!
//! Iterates the component catalog across the requested channels,
//! resolves the channel version once per run (every pair in a run sees
//! the same repository state), renders, and writes the results under
//! `<output-root>/<component>[-git]/`.
//!
//! Failure isolation: a failing component/channel pair is recorded and
//! the remaining pairs still run; a failed version resolution aborts the
//! whole channel before anything for it is written. The report carries
//! every failure so the caller can surface all of them at once.

use crate::descriptor::{catalog, Channel, Descriptor, ProjectConfig};
use crate::error::{Error, Result};
use crate::render::{render_install_script, render_pkgbuild};
use crate::version::{resolve_version, GitQuery};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to generate and where
pub struct GenerateConfig {
    /// Root directory receiving one subdirectory per component-channel pair
    pub output_root: PathBuf,
    pub project: ProjectConfig,
    /// Restrict to one component stem (`daemon`, `tray`, `gtk`, `webview`)
    pub component: Option<String>,
    pub channels: Vec<Channel>,
}

/// One failed unit of work
#[derive(Debug)]
pub struct Failure {
    /// Component stem, or `"version"` when resolution failed for the
    /// whole channel
    pub subject: String,
    pub channel: Channel,
    pub error: Error,
}

/// Outcome of a generation run
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Every file persisted, in generation order
    pub written: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run generation for every selected component-channel pair.
///
/// Never aborts early: the report aggregates all failures.
pub fn generate(config: &GenerateConfig, git: &impl GitQuery) -> GenerateReport {
    let mut report = GenerateReport::default();

    for &channel in &config.channels {
        let version = match resolve_version(channel, git) {
            Ok(version) => version,
            Err(error) => {
                warn!("skipping {} channel: {}", channel, error);
                report.failures.push(Failure {
                    subject: "version".to_string(),
                    channel,
                    error,
                });
                continue;
            }
        };
        info!("resolved {} version {}", channel, version);

        for spec in catalog() {
            if let Some(only) = &config.component {
                if spec.stem() != only {
                    continue;
                }
            }

            let descriptor = spec.descriptor(channel, &config.project);
            match emit(&config.output_root, &descriptor, &version) {
                Ok(paths) => {
                    info!("wrote {} ({})", descriptor.pkgname, descriptor.dir_name());
                    report.written.extend(paths);
                }
                Err(error) => {
                    warn!("failed {}/{}: {}", spec.stem(), channel, error);
                    report.failures.push(Failure {
                        subject: spec.stem().to_string(),
                        channel,
                        error,
                    });
                }
            }
        }
    }

    report
}

/// Render and persist one component-channel pair.
///
/// All rendering happens before any filesystem work so a render failure
/// never leaves a partial manifest behind.
fn emit(output_root: &Path, descriptor: &Descriptor, version: &str) -> Result<Vec<PathBuf>> {
    let pkgbuild = render_pkgbuild(descriptor, version)?;
    let hook_script = descriptor
        .install_hooks
        .as_ref()
        .map(render_install_script);

    let dir = output_root.join(descriptor.dir_name());
    fs::create_dir_all(&dir)?;

    let mut written = Vec::new();

    let pkgbuild_path = dir.join("PKGBUILD");
    fs::write(&pkgbuild_path, pkgbuild)?;
    written.push(pkgbuild_path);

    if let Some(script) = hook_script {
        // install_file is always present when hooks are
        let name = descriptor
            .install_file()
            .ok_or_else(|| Error::Render("hooks without an install file name".to_string()))?;
        let hook_path = dir.join(name);
        fs::write(&hook_path, script)?;
        written.push(hook_path);
    }

    Ok(written)
}
