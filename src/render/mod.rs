// src/render/mod.rs

//! PKGBUILD and install-script rendering
//!
//! Rendering is a pure function of the resolved [`Descriptor`] and the
//! version string: no I/O, no clock, no channel branching, no map
//! iteration. Identical inputs produce byte-identical output, which the
//! tests assert.
//!
//! PKGBUILDs are positionally and syntactically strict bash, so every
//! value is validated against the quoting context it lands in before
//! anything is emitted: a value that cannot be embedded safely raises
//! [`Error::Render`] and no text is produced.

use crate::descriptor::{Descriptor, InstallHooks};
use crate::error::{Error, Result};

/// Maintainer line carried on every generated PKGBUILD
const MAINTAINER: &str = "Alexander Karpukhin <thealexdev23@gmail.com>";

/// Release revision; fixed at 1, repackaging bumps happen downstream
const PKGREL: &str = "1";

/// Render a complete PKGBUILD for one component-channel pair.
pub fn render_pkgbuild(descriptor: &Descriptor, version: &str) -> Result<String> {
    check_bare_word("pkgver", version)?;
    check_bare_word("pkgname", &descriptor.pkgname)?;
    check_double_quotable("pkgdesc", &descriptor.pkgdesc)?;
    check_double_quotable("url", &descriptor.url)?;
    check_single_quotable("arch", &descriptor.arch)?;
    check_single_quotable("license", &descriptor.license)?;
    check_single_quotable("sha256sums", &descriptor.sha256sums)?;
    if descriptor.source.contains('\n') {
        return Err(Error::Render("source contains a newline".to_string()));
    }

    let mut out = String::new();

    out.push_str(&format!("# Maintainer: {}\n\n", MAINTAINER));
    out.push_str(&format!("pkgname={}\n", descriptor.pkgname));
    out.push_str(&format!("pkgver={}\n", version));
    out.push_str(&format!("pkgrel={}\n", PKGREL));
    out.push_str(&format!("pkgdesc=\"{}\"\n", descriptor.pkgdesc));
    out.push_str(&format!("arch=('{}')\n", descriptor.arch));
    out.push_str(&format!("url=\"{}\"\n", descriptor.url));
    out.push_str(&format!("license=('{}')\n", descriptor.license));
    out.push('\n');

    push_array(&mut out, "depends", &descriptor.depends)?;
    push_array(&mut out, "optdepends", &descriptor.optdepends)?;
    push_array(&mut out, "makedepends", &descriptor.makedepends)?;
    out.push('\n');

    push_array(&mut out, "provides", &descriptor.provides)?;
    push_array(&mut out, "conflicts", &descriptor.conflicts)?;
    out.push('\n');

    out.push_str(&format!("source=({})\n", descriptor.source));
    out.push_str(&format!("sha256sums=('{}')\n", descriptor.sha256sums));

    if let Some(install_file) = descriptor.install_file() {
        out.push_str(&format!("\ninstall=\"{}\"\n", install_file));
    }

    if !descriptor.prepare_steps.is_empty() {
        push_function(&mut out, "prepare", &descriptor.prepare_steps);
    }
    push_function(&mut out, "build", &descriptor.build_steps);
    push_function(&mut out, "package", &descriptor.package_steps);

    if let Some(hooks) = &descriptor.install_hooks {
        push_function(&mut out, "post_install", &hooks.on_install);
        push_function(&mut out, "post_upgrade", &hooks.on_upgrade);
        push_function(&mut out, "post_remove", &hooks.on_remove);
    }

    Ok(out)
}

/// Render the companion `.install` hook script.
///
/// The package manager sources this file and invokes the post_*
/// functions around install, upgrade, and removal.
pub fn render_install_script(hooks: &InstallHooks) -> String {
    let mut out = String::new();
    push_function(&mut out, "post_install", &hooks.on_install);
    push_function(&mut out, "post_upgrade", &hooks.on_upgrade);
    push_function(&mut out, "post_remove", &hooks.on_remove);
    out
}

/// Append `name=('a' 'b')`; an empty list renders the valid empty array `()`
fn push_array(out: &mut String, name: &str, values: &[String]) -> Result<()> {
    for value in values {
        check_single_quotable(name, value)?;
    }
    let quoted: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
    out.push_str(&format!("{}=({})\n", name, quoted.join(" ")));
    Ok(())
}

/// Append a bash function block with one step per line
fn push_function(out: &mut String, name: &str, steps: &[String]) {
    out.push_str(&format!("\n{}() {{\n", name));
    for step in steps {
        out.push_str(&format!("  {}\n", step));
    }
    out.push_str("}\n");
}

/// A value embedded in a single-quoted bash literal
fn check_single_quotable(field: &str, value: &str) -> Result<()> {
    if value.contains('\'') || value.contains('\n') {
        return Err(Error::Render(format!(
            "{} value {:?} cannot be embedded in a single-quoted literal",
            field, value
        )));
    }
    Ok(())
}

/// A value embedded in a double-quoted bash literal
fn check_double_quotable(field: &str, value: &str) -> Result<()> {
    if value.contains('"') || value.contains('\n') || value.contains('\\') {
        return Err(Error::Render(format!(
            "{} value {:?} cannot be embedded in a double-quoted literal",
            field, value
        )));
    }
    Ok(())
}

/// A value assigned without quoting (pkgname, pkgver)
fn check_bare_word(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Render(format!("{} is empty", field)));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c == '\'' || c == '"' || c == '$' || c == '`')
    {
        return Err(Error::Render(format!(
            "{} value {:?} is not a bare word",
            field, value
        )));
    }
    Ok(())
}
