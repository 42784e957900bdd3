//! `debian/copyright` in the DEP-5 machine-readable format.

use super::control::fold_extended;
use crate::config::PackageConfig;

const DEP5_FORMAT: &str = "https://www.debian.org/doc/packaging-manuals/copyright-format/1.0/";

pub fn render_copyright(pkg: &PackageConfig) -> String {
    let mut out = format!(
        "Format: {}\nUpstream-Name: {}\nUpstream-Contact: {}\n",
        DEP5_FORMAT, pkg.name, pkg.maintainer
    );
    if !pkg.homepage.is_empty() {
        out.push_str(&format!("Source: {}\n", pkg.homepage));
    }
    out.push_str(&format!(
        "\nFiles: *\nCopyright: {}\nLicense: {}\n",
        pkg.copyright, pkg.license
    ));
    out.push_str(&fold_extended(&pkg.license_text));
    out
}
