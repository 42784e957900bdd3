//! `debian/control` rendering.

use crate::config::PackageConfig;

const FOLD_WIDTH: usize = 79;

/// Debian policy 5.6.1: lowercase alphanumerics, `+`, `-`, `.`; at least two chars; starts alphanumeric.
pub fn is_valid_package_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_lowercase() || b.is_ascii_digit() => {}
        _ => return false,
    }
    name.len() >= 2
        && bytes.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.'))
}

/// Continuation lines of a multi-line field: each line starts with a space,
/// paragraph breaks become ` .`, words are folded to fit `FOLD_WIDTH`.
pub fn fold_extended(text: &str) -> String {
    let mut out = String::new();
    for (i, para) in text.trim().split("\n\n").enumerate() {
        if i > 0 {
            out.push_str(" .\n");
        }
        let mut line = String::new();
        for word in para.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > FOLD_WIDTH - 1 {
                out.push(' ');
                out.push_str(&line);
                out.push('\n');
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            out.push(' ');
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

pub fn render_control(pkg: &PackageConfig) -> String {
    let mut depends = vec!["${misc:Depends}".to_string()];
    depends.extend(pkg.depends.iter().cloned());

    let mut out = String::new();
    out.push_str(&format!("Source: {}\n", pkg.name));
    out.push_str(&format!("Section: {}\n", pkg.section));
    out.push_str(&format!("Priority: {}\n", pkg.priority));
    out.push_str(&format!("Maintainer: {}\n", pkg.maintainer));
    if !pkg.build_depends.is_empty() {
        out.push_str(&format!("Build-Depends: {}\n", pkg.build_depends.join(", ")));
    }
    out.push_str(&format!("Standards-Version: {}\n", pkg.standards_version));
    if !pkg.homepage.is_empty() {
        out.push_str(&format!("Homepage: {}\n", pkg.homepage));
    }
    out.push('\n');
    out.push_str(&format!("Package: {}\n", pkg.name));
    out.push_str(&format!("Architecture: {}\n", pkg.architecture));
    out.push_str(&format!("Depends: {}\n", depends.join(", ")));
    out.push_str(&format!("Description: {}\n", pkg.short_description.trim()));
    out.push_str(&fold_extended(&pkg.long_description));
    out
}
