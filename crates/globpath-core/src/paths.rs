//! Lexical path helpers.
//!
//! Result paths are compared by their absolute, normalized form. Normalization
//! here is purely lexical (no symlink resolution) so a path reached through a
//! link keeps the link in its name.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem. `..` above the root is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                let at_root = matches!(
                    out.components().next_back(),
                    None | Some(Component::RootDir) | Some(Component::Prefix(_))
                );
                if at_root {
                    if !out.has_root() {
                        out.push("..");
                    }
                } else if out.ends_with("..") {
                    out.push("..");
                } else {
                    out.pop();
                }
            }
            Component::Normal(name) => out.push(name),
        }
    }
    out
}

/// Resolve `path` against the current directory if it is relative, then
/// normalize it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Lowercased extension of the final path component, without the dot.
///
/// `archive.tar.gz` gives `gz`, `.bashrc` gives `bashrc`, `Makefile` has none.
pub fn extension_lower(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let ext = name.rsplit('.').next()?;
    if ext.len() < name.len() {
        Some(ext.to_lowercase())
    } else {
        None
    }
}
