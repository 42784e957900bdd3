//! Upstream tarball extraction.
//!
//! GitHub release archives wrap everything in one top-level directory
//! (`azure-cli-all-v0.2.1/`). The archive is unpacked into a staging
//! directory next to the destination and that single directory is then
//! renamed into place, so the tree lands directly in the Debian source
//! directory and a rejected archive leaves nothing behind.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Component, Path};
use tar::EntryType;

/// `<package>_<version>.orig.tar.gz`, the name dpkg-source expects next to the source dir.
pub fn orig_tarball_name(package: &str, version: &str) -> String {
    format!("{}_{}.orig.tar.gz", package, version)
}

/// `<package>-<version>`, the conventional unpacked source directory name.
pub fn source_dir_name(package: &str, version: &str) -> String {
    format!("{}-{}", package, version)
}

/// Normal components of an archive path; `.` is dropped, anything else
/// (`..`, a root or a prefix) is rejected.
fn normal_components(path: &Path) -> Result<Vec<OsString>> {
    let mut out = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::Normal(part) => out.push(part.to_os_string()),
            _ => anyhow::bail!("unsafe path in archive: {}", path.display()),
        }
    }
    Ok(out)
}

/// Resolve `link` against `base` without touching the filesystem. The
/// result must stay inside the top-level directory `top`.
fn check_link_target(entry: &Path, base: &[OsString], top: &OsString, link: &Path) -> Result<()> {
    let mut resolved: Vec<OsString> = base.to_vec();
    for comp in link.components() {
        match comp {
            Component::CurDir => {}
            Component::Normal(part) => resolved.push(part.to_os_string()),
            Component::ParentDir if resolved.len() > 1 => {
                resolved.pop();
            }
            _ => anyhow::bail!(
                "link {} -> {} points outside the archive",
                entry.display(),
                link.display()
            ),
        }
    }
    if resolved.len() < 2 || resolved.first() != Some(top) {
        anyhow::bail!(
            "link {} -> {} points outside the archive",
            entry.display(),
            link.display()
        );
    }
    Ok(())
}

/// Extract `tarball` (gzip-compressed tar) into `dest`, replacing any previous contents.
/// The archive must hold exactly one top-level directory; its contents become `dest`.
/// Returns the number of entries written below that directory.
pub fn extract_tar_gz(tarball: &Path, dest: &Path) -> Result<usize> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let staging = tempfile::Builder::new()
        .prefix(".debrel-unpack-")
        .tempdir_in(parent)
        .with_context(|| format!("create staging dir in {}", parent.display()))?;

    let file = File::open(tarball).with_context(|| format!("open {}", tarball.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);

    let mut top: Option<OsString> = None;
    let mut count = 0usize;
    for entry in archive
        .entries()
        .with_context(|| format!("read {}", tarball.display()))?
    {
        let mut entry = entry.context("corrupt archive entry")?;
        let kind = entry.header().entry_type();
        // pax global headers carry no file data.
        if kind.is_pax_global_extensions() {
            continue;
        }
        let raw = entry.path().context("archive entry path")?.into_owned();
        let comps = normal_components(&raw)?;
        let Some(first) = comps.first() else {
            continue;
        };
        match &top {
            None => top = Some(first.clone()),
            Some(t) if t != first => anyhow::bail!(
                "{} has more than one top-level entry ({:?} and {:?})",
                tarball.display(),
                t,
                first
            ),
            Some(_) => {}
        }
        if comps.len() == 1 {
            if !kind.is_dir() {
                anyhow::bail!(
                    "{} has a file at its root ({}); expected a single top-level directory",
                    tarball.display(),
                    raw.display()
                );
            }
        } else {
            match kind {
                EntryType::Symlink => {
                    let link = entry
                        .link_name()
                        .context("symlink target")?
                        .with_context(|| format!("symlink {} has no target", raw.display()))?;
                    check_link_target(&raw, &comps[..comps.len() - 1], first, &link)?;
                }
                EntryType::Link => {
                    let link = entry
                        .link_name()
                        .context("hard link target")?
                        .with_context(|| format!("hard link {} has no target", raw.display()))?;
                    check_link_target(&raw, &[], first, &link)?;
                }
                _ => {}
            }
        }

        // unpack_in refuses to write through a symlink that leaves the staging dir.
        let written = entry
            .unpack_in(staging.path())
            .with_context(|| format!("unpack {}", raw.display()))?;
        if !written {
            anyhow::bail!("unsafe path in archive: {}", raw.display());
        }
        if comps.len() > 1 {
            count += 1;
        }
    }

    let top = top.with_context(|| format!("{} is empty", tarball.display()))?;
    let unpacked = staging.path().join(&top);
    if !unpacked.is_dir() {
        anyhow::bail!("{}: top-level entry {:?} is not a directory", tarball.display(), top);
    }
    if dest.exists() {
        fs::remove_dir_all(dest).with_context(|| format!("clear {}", dest.display()))?;
    }
    fs::rename(&unpacked, dest)
        .with_context(|| format!("move {} to {}", unpacked.display(), dest.display()))?;
    tracing::debug!(entries = count, dest = %dest.display(), "extracted upstream tarball");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io;

    enum Item<'a> {
        File(&'a str, &'a [u8]),
        Dir(&'a str),
        Symlink(&'a str, &'a str),
        HardLink(&'a str, &'a str),
    }

    fn build_tarball(path: &Path, items: &[Item]) {
        let enc = GzEncoder::new(File::create(path).unwrap(), Compression::fast());
        let mut builder = tar::Builder::new(enc);
        for item in items {
            let mut header = tar::Header::new_gnu();
            header.set_mode(0o644);
            match item {
                Item::File(name, data) => {
                    header.set_size(data.len() as u64);
                    builder.append_data(&mut header, name, *data).unwrap();
                }
                Item::Dir(name) => {
                    header.set_entry_type(EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder.append_data(&mut header, name, io::empty()).unwrap();
                }
                Item::Symlink(name, target) | Item::HardLink(name, target) => {
                    let kind = match item {
                        Item::Symlink(..) => EntryType::Symlink,
                        _ => EntryType::Link,
                    };
                    header.set_entry_type(kind);
                    header.set_size(0);
                    header.set_link_name(target).unwrap();
                    builder.append_data(&mut header, name, io::empty()).unwrap();
                }
            }
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn names_follow_debian_conventions() {
        assert_eq!(orig_tarball_name("azure-cli", "0.2.1"), "azure-cli_0.2.1.orig.tar.gz");
        assert_eq!(source_dir_name("azure-cli", "0.2.1"), "azure-cli-0.2.1");
    }

    #[test]
    fn strips_top_level_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("all-v0.2.1.tar.gz");
        build_tarball(
            &tarball,
            &[
                Item::Dir("azure-cli-all-v0.2.1/"),
                Item::File("azure-cli-all-v0.2.1/README.rst", b"readme"),
                Item::File("azure-cli-all-v0.2.1/src/azure-cli/setup.py", b"setup()"),
            ],
        );
        let dest = dir.path().join("azure-cli-0.2.1");
        fs::create_dir_all(dest.join("debian")).unwrap();

        let n = extract_tar_gz(&tarball, &dest).unwrap();
        assert_eq!(n, 2);
        assert_eq!(fs::read(dest.join("README.rst")).unwrap(), b"readme");
        assert_eq!(
            fs::read(dest.join("src/azure-cli/setup.py")).unwrap(),
            b"setup()"
        );
        assert!(!dest.join("debian").exists(), "previous contents replaced");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(".debrel-unpack-"))
            .collect();
        assert!(leftovers.is_empty(), "staging dir removed");
    }

    #[test]
    fn symlink_out_of_tree_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("outside");
        fs::create_dir_all(&outside).unwrap();
        let outside_str = outside.to_string_lossy().into_owned();
        let tarball = dir.path().join("evil.tar.gz");
        build_tarball(
            &tarball,
            &[
                Item::Symlink("top/link", &outside_str),
                Item::File("top/link/escaped.txt", b"pwned"),
            ],
        );
        let dest = dir.path().join("src");

        assert!(extract_tar_gz(&tarball, &dest).is_err());
        assert!(!outside.join("escaped.txt").exists());
        assert!(!dest.exists());
    }

    #[test]
    fn relative_symlink_climbing_out_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("evil.tar.gz");
        build_tarball(
            &tarball,
            &[
                Item::Symlink("top/a/link", "../../../outside"),
                Item::File("top/a/link/escaped.txt", b"pwned"),
            ],
        );
        assert!(extract_tar_gz(&tarball, &dir.path().join("src")).is_err());
        assert!(!dir.path().join("outside/escaped.txt").exists());
    }

    #[test]
    fn hard_link_out_of_tree_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("evil.tar.gz");
        build_tarball(&tarball, &[Item::HardLink("top/passwd", "/etc/passwd")]);
        assert!(extract_tar_gz(&tarball, &dir.path().join("src")).is_err());

        build_tarball(&tarball, &[Item::HardLink("top/passwd", "other/passwd")]);
        assert!(extract_tar_gz(&tarball, &dir.path().join("src")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn links_inside_the_tree_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("ok.tar.gz");
        build_tarball(
            &tarball,
            &[
                Item::File("top/lib/az.py", b"main()"),
                Item::Symlink("top/bin/az", "../lib/az.py"),
                Item::HardLink("top/lib/az-copy.py", "top/lib/az.py"),
            ],
        );
        let dest = dir.path().join("src");
        assert_eq!(extract_tar_gz(&tarball, &dest).unwrap(), 3);
        assert_eq!(fs::read(dest.join("bin/az")).unwrap(), b"main()");
        assert_eq!(fs::read(dest.join("lib/az-copy.py")).unwrap(), b"main()");
    }

    #[test]
    fn root_level_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("flat.tar.gz");
        build_tarball(
            &tarball,
            &[Item::File("README", b"readme"), Item::File("setup.py", b"setup()")],
        );
        let err = extract_tar_gz(&tarball, &dir.path().join("src")).unwrap_err();
        assert!(format!("{:#}", err).contains("file at its root"), "{:#}", err);
    }

    #[test]
    fn several_top_level_directories_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let tarball = dir.path().join("two.tar.gz");
        build_tarball(
            &tarball,
            &[Item::File("one/a.txt", b"a"), Item::File("two/b.txt", b"b")],
        );
        let dest = dir.path().join("src");
        let err = extract_tar_gz(&tarball, &dest).unwrap_err();
        assert!(format!("{:#}", err).contains("more than one top-level"), "{:#}", err);
        assert!(!dest.exists());
    }

    #[test]
    fn path_components_are_checked() {
        assert!(normal_components(Path::new("top/../../etc/passwd")).is_err());
        assert!(normal_components(Path::new("/etc/passwd")).is_err());
        assert_eq!(normal_components(Path::new("./top/a")).unwrap().len(), 2);
    }
}
