// src/commands.rs
//! Command handlers for the pkggen CLI

use anyhow::Result;
use pkggen::{
    catalog, find_component, generate, render_install_script, render_pkgbuild, Channel,
    GenerateConfig, GitCli, ProjectConfig,
};
use std::path::{Path, PathBuf};
use tracing::error;

/// Generate PKGBUILDs into `output_root` for the selected components
/// and channels, resolving versions from the repository at `repo_dir`.
pub fn run_generate(
    output_root: PathBuf,
    url: String,
    repo_dir: &Path,
    component: Option<String>,
    channel: Option<Channel>,
) -> Result<()> {
    if let Some(stem) = &component {
        if find_component(stem).is_none() {
            anyhow::bail!(
                "unknown component '{}' (expected one of: {})",
                stem,
                stems().join(", ")
            );
        }
    }

    let channels = match channel {
        Some(c) => vec![c],
        None => Channel::all().to_vec(),
    };

    let config = GenerateConfig {
        output_root,
        project: ProjectConfig::new(&url),
        component,
        channels,
    };
    let git = GitCli::new(repo_dir);

    let report = generate(&config, &git);

    for path in &report.written {
        println!("wrote {}", path.display());
    }
    if !report.is_success() {
        for failure in &report.failures {
            error!(
                "{} ({} channel): {}",
                failure.subject, failure.channel, failure.error
            );
        }
        anyhow::bail!(
            "{} of {} targets failed",
            report.failures.len(),
            report.failures.len() + report.written.len()
        );
    }
    Ok(())
}

/// Print the component catalog, optionally as JSON descriptors for
/// both channels.
pub fn run_list(url: String, json: bool) -> Result<()> {
    if json {
        let project = ProjectConfig::new(&url);
        let descriptors: Vec<_> = catalog()
            .iter()
            .flat_map(|spec| Channel::all().map(|channel| spec.descriptor(channel, &project)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    for spec in catalog() {
        println!("{:10} {}", spec.stem(), spec.package());
        println!("           {}", spec.description());
    }
    Ok(())
}

/// Render one manifest to stdout with an explicit version.
///
/// Needs no git repository; useful for reviewing template changes.
pub fn run_show(component: &str, channel: Channel, version: &str, url: String) -> Result<()> {
    let spec = find_component(component).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown component '{}' (expected one of: {})",
            component,
            stems().join(", ")
        )
    })?;

    let descriptor = spec.descriptor(channel, &ProjectConfig::new(&url));
    print!("{}", render_pkgbuild(&descriptor, version)?);

    if let Some(hooks) = &descriptor.install_hooks {
        println!("\n# --- {} ---", descriptor.install_file().unwrap_or_default());
        print!("{}", render_install_script(hooks));
    }
    Ok(())
}

fn stems() -> Vec<&'static str> {
    catalog().iter().map(|spec| spec.stem()).collect()
}
