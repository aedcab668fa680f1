// src/descriptor/mod.rs

//! Component descriptors and the static component catalog
//!
//! Power Options ships four distributable units: the core daemon, a
//! system tray applet, a GTK frontend, and a web-view frontend. Each is
//! packaged for two release channels, Stable (tagged archive) and
//! Rolling (`-git` live checkout). Instead of one bespoke script per
//! component and channel, every per-component fact lives in one
//! [`ComponentSpec`] table entry and all channel policy is applied in
//! [`ComponentSpec::descriptor`]:
//!
//! - which daemon sibling a frontend depends on (always the daemon of
//!   the *same* channel),
//! - the conflicts set (the Stable and Rolling variants of a component
//!   always conflict with each other),
//! - the source declaration (tag archive vs. git checkout),
//! - the `git` makedepends entry for Rolling builds,
//! - the source-tree root the build steps `cd` into.
//!
//! The renderer receives a fully resolved [`Descriptor`] and never
//! branches on channel itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default project URL embedded in manifests and source declarations
pub const DEFAULT_URL: &str = "https://github.com/thealexdev23/power-options";

/// Release track a package follows
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Pinned to the most recent release tag
    Stable,
    /// Tracks the latest commit (`-git` packages)
    Rolling,
}

impl Channel {
    /// Both channels, in generation order
    pub fn all() -> [Channel; 2] {
        [Channel::Stable, Channel::Rolling]
    }

    /// Package name and output directory suffix for this channel
    pub fn suffix(&self) -> &'static str {
        match self {
            Channel::Stable => "",
            Channel::Rolling => "-git",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Rolling => "rolling",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-run configuration threaded explicitly into descriptor resolution
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Upstream repository URL
    pub url: String,
}

impl ProjectConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    /// Repository directory name, as a tag archive or git clone unpacks it
    pub fn repo_name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// Service-manager commands run by the package manager around
/// install, upgrade, and removal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallHooks {
    pub on_install: Vec<String>,
    pub on_upgrade: Vec<String>,
    pub on_remove: Vec<String>,
}

/// Hook commands as stored in the static catalog
struct HookCommands {
    on_install: &'static [&'static str],
    on_upgrade: &'static [&'static str],
    on_remove: &'static [&'static str],
}

impl HookCommands {
    fn resolve(&self) -> InstallHooks {
        let own = |cmds: &[&str]| cmds.iter().map(|s| s.to_string()).collect();
        InstallHooks {
            on_install: own(self.on_install),
            on_upgrade: own(self.on_upgrade),
            on_remove: own(self.on_remove),
        }
    }
}

/// A value that differs between the two channels
struct PerChannel<T> {
    stable: T,
    rolling: T,
}

impl<T> PerChannel<T> {
    fn get(&self, channel: Channel) -> &T {
        match channel {
            Channel::Stable => &self.stable,
            Channel::Rolling => &self.rolling,
        }
    }
}

/// Static, channel-independent facts about one distributable component
pub struct ComponentSpec {
    /// Output directory stem and `.install` file stem (`daemon`, `tray`, ...)
    stem: &'static str,
    /// Stable package name; Rolling appends `-git`
    package: &'static str,
    description: &'static str,
    /// Whether this component depends on the daemon of its own channel
    needs_daemon: bool,
    /// Runtime dependencies beyond the daemon sibling
    extra_depends: &'static [&'static str],
    /// Optional dependencies with pacman `package: reason` annotations
    optdepends: &'static [&'static str],
    /// Build dependencies beyond `cargo` (and `git` on Rolling)
    extra_makedepends: &'static [&'static str],
    /// Conflicts beyond the sibling-channel variant
    extra_conflicts: &'static [&'static str],
    /// Crate directory inside the source tree
    crate_path: &'static str,
    /// Emit a prepare() step that pre-fetches the cargo dependency graph
    cargo_fetch: bool,
    build_command: &'static str,
    /// package() steps, relative to the unpacked source root
    package_steps: PerChannel<&'static [&'static str]>,
    install_hooks: Option<HookCommands>,
}

/// Channel-resolved input to the manifest renderer.
///
/// All channel divergence has already been applied; the renderer treats
/// this as plain data.
#[derive(Debug, Clone, Serialize)]
pub struct Descriptor {
    /// Output directory stem, shared by both channel variants
    pub stem: String,
    pub channel: Channel,
    pub pkgname: String,
    pub pkgdesc: String,
    pub arch: String,
    pub url: String,
    pub license: String,
    pub depends: Vec<String>,
    pub optdepends: Vec<String>,
    pub makedepends: Vec<String>,
    pub provides: Vec<String>,
    pub conflicts: Vec<String>,
    /// PKGBUILD source declaration (tag archive or git checkout)
    pub source: String,
    /// Checksum sentinel; always `SKIP` for sources fetched from the
    /// project's own release tags or a live checkout
    pub sha256sums: String,
    pub prepare_steps: Vec<String>,
    pub build_steps: Vec<String>,
    pub package_steps: Vec<String>,
    pub install_hooks: Option<InstallHooks>,
}

impl Descriptor {
    /// Directory name under the output root (`daemon`, `daemon-git`, ...)
    pub fn dir_name(&self) -> String {
        format!("{}{}", self.stem, self.channel.suffix())
    }

    /// Name of the companion hook script, when this component has hooks
    pub fn install_file(&self) -> Option<String> {
        self.install_hooks
            .as_ref()
            .map(|_| format!("{}.install", self.stem))
    }
}

impl ComponentSpec {
    pub fn stem(&self) -> &'static str {
        self.stem
    }

    pub fn package(&self) -> &'static str {
        self.package
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Resolve this component for one channel.
    ///
    /// This is the only place channel policy is applied; the result is
    /// plain data from the renderer's point of view.
    pub fn descriptor(&self, channel: Channel, config: &ProjectConfig) -> Descriptor {
        let suffix = channel.suffix();
        let pkgname = format!("{}{}", self.package, suffix);

        let mut depends = Vec::new();
        if self.needs_daemon {
            depends.push(format!("power-options-daemon{}", suffix));
        }
        depends.extend(self.extra_depends.iter().map(|s| s.to_string()));

        let mut makedepends = vec!["cargo".to_string()];
        makedepends.extend(self.extra_makedepends.iter().map(|s| s.to_string()));
        if channel == Channel::Rolling {
            makedepends.push("git".to_string());
        }

        // The two channel variants of a component always conflict with
        // each other; only one may be installed at a time.
        let sibling = match channel {
            Channel::Stable => format!("{}-git", self.package),
            Channel::Rolling => self.package.to_string(),
        };
        let mut conflicts = vec![sibling];
        conflicts.extend(self.extra_conflicts.iter().map(|s| s.to_string()));

        let source = match channel {
            Channel::Stable => format!(
                "\"$pkgname-$pkgver.tar.gz::{}/archive/v$pkgver.tar.gz\"",
                config.url
            ),
            Channel::Rolling => format!("\"git+{}.git\"", config.url),
        };

        // Directory the source declaration unpacks into: the archive
        // carries the version, the checkout does not.
        let srcroot = match channel {
            Channel::Stable => format!("{}-$pkgver", config.repo_name()),
            Channel::Rolling => config.repo_name().to_string(),
        };

        let prepare_steps = if self.cargo_fetch {
            vec![
                "export RUSTUP_TOOLCHAIN=stable".to_string(),
                format!("cd \"$srcdir/{}/{}\"", srcroot, self.crate_path),
                "cargo fetch --target \"$(rustc -vV | sed -n 's/host: //p')\"".to_string(),
            ]
        } else {
            Vec::new()
        };

        let build_steps = vec![
            "export RUSTUP_TOOLCHAIN=stable".to_string(),
            format!("cd \"$srcdir/{}/{}\"", srcroot, self.crate_path),
            self.build_command.to_string(),
        ];

        let mut package_steps = vec![format!("cd \"$srcdir/{}\"", srcroot)];
        package_steps.extend(self.package_steps.get(channel).iter().map(|s| s.to_string()));

        Descriptor {
            stem: self.stem.to_string(),
            channel,
            pkgname,
            pkgdesc: self.description.to_string(),
            arch: "x86_64".to_string(),
            url: config.url.clone(),
            license: "MIT".to_string(),
            depends,
            optdepends: self.optdepends.iter().map(|s| s.to_string()).collect(),
            makedepends,
            provides: vec![self.package.to_string()],
            conflicts,
            source,
            sha256sums: "SKIP".to_string(),
            prepare_steps,
            build_steps,
            package_steps,
            install_hooks: self.install_hooks.as_ref().map(HookCommands::resolve),
        }
    }
}

/// The fixed set of distributable components.
pub fn catalog() -> &'static [ComponentSpec] {
    &CATALOG
}

/// Look up a component by stem
pub fn find_component(stem: &str) -> Option<&'static ComponentSpec> {
    CATALOG.iter().find(|c| c.stem == stem)
}

static DAEMON_PACKAGE_STABLE: &[&str] = &[
    "install -Dm755 \"target/release/power-daemon-mgr\" \"$pkgdir/usr/bin/power-daemon-mgr\"",
    "\"$pkgdir/usr/bin/power-daemon-mgr\" -v generate-base-files --path \"$pkgdir\" --program-path \"/usr/bin/power-daemon-mgr\"",
];

static DAEMON_PACKAGE_ROLLING: &[&str] = &[
    "install -Dm755 \"target/release/power-daemon-mgr\" \"$pkgdir/usr/bin/power-daemon-mgr\"",
    "\"$pkgdir/usr/bin/power-daemon-mgr\" -v generate-files --path \"$pkgdir\" --program-path \"/usr/bin/power-daemon-mgr\"",
];

static TRAY_PACKAGE: &[&str] = &[
    "install -Dm755 \"target/release/power-applet\" \"$pkgdir/usr/bin/power-options-tray\"",
    "install -Dm755 \"icon.png\" \"$pkgdir/usr/share/icons/power-options-tray.png\"",
    "install -Dm755 \"install/power-options-tray.desktop\" \"$pkgdir/etc/xdg/autostart/power-options-tray.desktop\"",
];

static GTK_PACKAGE: &[&str] = &[
    "install -Dm755 \"target/release/frontend-gtk\" \"$pkgdir/usr/bin/power-options-gtk\"",
    "install -Dm755 \"icon.png\" \"$pkgdir/usr/share/icons/power-options.png\"",
    "install -Dm755 \"install/power-options-gtk.desktop\" \"$pkgdir/usr/share/applications/power-options-gtk.desktop\"",
];

static WEBVIEW_PACKAGE: &[&str] = &[
    "install -Dm755 \"target/release/frontend\" \"$pkgdir/usr/bin/power-options-webview\"",
    "mkdir -p \"$pkgdir/usr/lib/power-options-webview/\"",
    "cp -r \"crates/frontend-webview/assets\" \"$pkgdir/usr/lib/power-options-webview/\"",
    "install -Dm755 \"icon.png\" \"$pkgdir/usr/share/icons/power-options-webview.png\"",
    "install -Dm755 \"install/power-options-webview.desktop\" \"$pkgdir/usr/share/applications/power-options-webview.desktop\"",
];

static CATALOG: [ComponentSpec; 4] = [
    ComponentSpec {
        stem: "daemon",
        package: "power-options-daemon",
        description:
            "The core daemon for Power Options, a blazingly fast power management solution.",
        needs_daemon: false,
        extra_depends: &["acpid", "zsh", "pciutils", "usbutils"],
        optdepends: &[
            "xorg-xrandr: needed for screen settings",
            "brightnessctl: needed for brightness settings",
            "net-tools: needed to disable ethernet cards",
        ],
        extra_makedepends: &[],
        extra_conflicts: &[],
        crate_path: "crates/power-daemon-mgr",
        cargo_fetch: true,
        build_command: "cargo build --frozen --release",
        package_steps: PerChannel {
            stable: DAEMON_PACKAGE_STABLE,
            rolling: DAEMON_PACKAGE_ROLLING,
        },
        install_hooks: Some(HookCommands {
            on_install: &[
                "systemctl daemon-reload",
                "systemctl restart acpid.service",
                "systemctl enable --now power-options.service",
            ],
            on_upgrade: &[
                "systemctl daemon-reload",
                "systemctl restart acpid.service",
                "systemctl restart power-options.service",
            ],
            on_remove: &["systemctl daemon-reload"],
        }),
    },
    ComponentSpec {
        stem: "tray",
        package: "power-options-tray",
        description:
            "A system tray item for Power Options, a blazingly fast power management solution.",
        needs_daemon: true,
        extra_depends: &["yad"],
        optdepends: &[],
        extra_makedepends: &[],
        extra_conflicts: &[],
        crate_path: "crates/power-applet",
        cargo_fetch: true,
        build_command: "cargo build --frozen --release",
        package_steps: PerChannel {
            stable: TRAY_PACKAGE,
            rolling: TRAY_PACKAGE,
        },
        install_hooks: None,
    },
    ComponentSpec {
        stem: "gtk",
        package: "power-options-gtk",
        description:
            "A gtk frontend for Power Options, a blazingly fast power management solution.",
        needs_daemon: true,
        extra_depends: &["libadwaita", "yad"],
        optdepends: &[],
        extra_makedepends: &[],
        extra_conflicts: &["tlp", "auto-cpufreq", "power-profiles-daemon", "cpupower-gui"],
        crate_path: "crates/frontend-gtk",
        cargo_fetch: true,
        build_command: "cargo build --frozen --release",
        package_steps: PerChannel {
            stable: GTK_PACKAGE,
            rolling: GTK_PACKAGE,
        },
        install_hooks: None,
    },
    ComponentSpec {
        stem: "webview",
        package: "power-options-webview",
        description:
            "A Web Renderer frontend for Power Options, a blazingly fast power management solution.",
        needs_daemon: true,
        extra_depends: &["webkit2gtk", "xdotool"],
        optdepends: &[],
        extra_makedepends: &["dioxus-cli"],
        extra_conflicts: &[],
        crate_path: "crates/frontend-webview",
        cargo_fetch: false,
        build_command: "dx build --release",
        package_steps: PerChannel {
            stable: WEBVIEW_PACKAGE,
            rolling: WEBVIEW_PACKAGE,
        },
        install_hooks: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_four_components() {
        assert_eq!(catalog().len(), 4);
        assert!(find_component("daemon").is_some());
        assert!(find_component("tray").is_some());
        assert!(find_component("gtk").is_some());
        assert!(find_component("webview").is_some());
        assert!(find_component("nonesuch").is_none());
    }

    #[test]
    fn test_channel_variants_conflict_with_each_other() {
        let config = ProjectConfig::default();
        for spec in catalog() {
            let stable = spec.descriptor(Channel::Stable, &config);
            let rolling = spec.descriptor(Channel::Rolling, &config);

            assert!(
                stable.conflicts.contains(&rolling.pkgname),
                "{} must conflict with {}",
                stable.pkgname,
                rolling.pkgname
            );
            assert!(
                rolling.conflicts.contains(&stable.pkgname),
                "{} must conflict with {}",
                rolling.pkgname,
                stable.pkgname
            );
            // Both variants provide the stable name
            assert_eq!(stable.provides, rolling.provides);
        }
    }

    #[test]
    fn test_frontends_depend_on_same_channel_daemon() {
        let config = ProjectConfig::default();
        for spec in catalog().iter().filter(|s| s.stem() != "daemon") {
            let stable = spec.descriptor(Channel::Stable, &config);
            let rolling = spec.descriptor(Channel::Rolling, &config);
            assert_eq!(stable.depends[0], "power-options-daemon");
            assert_eq!(rolling.depends[0], "power-options-daemon-git");
        }
    }

    #[test]
    fn test_rolling_tray_dependency_order() {
        let config = ProjectConfig::default();
        let tray = find_component("tray")
            .unwrap()
            .descriptor(Channel::Rolling, &config);
        assert_eq!(tray.depends, vec!["power-options-daemon-git", "yad"]);
        assert!(tray.conflicts.contains(&"power-options-tray".to_string()));
    }

    #[test]
    fn test_rolling_makedepends_includes_git() {
        let config = ProjectConfig::default();
        for spec in catalog() {
            let rolling = spec.descriptor(Channel::Rolling, &config);
            assert!(rolling.makedepends.contains(&"git".to_string()));
            let stable = spec.descriptor(Channel::Stable, &config);
            assert!(!stable.makedepends.contains(&"git".to_string()));
        }
    }

    #[test]
    fn test_source_declaration_per_channel() {
        let config = ProjectConfig::default();
        let daemon = find_component("daemon").unwrap();

        let stable = daemon.descriptor(Channel::Stable, &config);
        assert!(stable.source.contains("/archive/v$pkgver.tar.gz"));

        let rolling = daemon.descriptor(Channel::Rolling, &config);
        assert!(rolling.source.starts_with("\"git+"));
        assert!(rolling.source.ends_with(".git\""));
    }

    #[test]
    fn test_srcroot_versioned_only_for_stable() {
        let config = ProjectConfig::default();
        let daemon = find_component("daemon").unwrap();

        let stable = daemon.descriptor(Channel::Stable, &config);
        assert!(stable.build_steps[1].contains("power-options-$pkgver"));

        let rolling = daemon.descriptor(Channel::Rolling, &config);
        assert!(rolling.build_steps[1].contains("/power-options/"));
        assert!(!rolling.build_steps[1].contains("$pkgver"));
    }

    #[test]
    fn test_only_daemon_has_install_hooks() {
        let config = ProjectConfig::default();
        for spec in catalog() {
            let d = spec.descriptor(Channel::Stable, &config);
            if spec.stem() == "daemon" {
                assert!(d.install_hooks.is_some());
                assert_eq!(d.install_file().as_deref(), Some("daemon.install"));
            } else {
                assert!(d.install_hooks.is_none());
                assert_eq!(d.install_file(), None);
            }
        }
    }

    #[test]
    fn test_dir_name_carries_channel_suffix() {
        let config = ProjectConfig::default();
        let tray = find_component("tray").unwrap();
        assert_eq!(tray.descriptor(Channel::Stable, &config).dir_name(), "tray");
        assert_eq!(
            tray.descriptor(Channel::Rolling, &config).dir_name(),
            "tray-git"
        );
    }

    #[test]
    fn test_project_config_repo_name() {
        let config = ProjectConfig::new("https://example.org/forks/power-options");
        assert_eq!(config.repo_name(), "power-options");
    }
}
