// src/shell/path.rs

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Search list used when `PATH` is unset.
const FALLBACK_PATH: &str = "/bin:/sbin";

/// Find `name` on the caller's `PATH`.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    match std::env::var_os("PATH") {
        Some(path) => find_executable_in(name, &path),
        None => find_executable_in(name, OsStr::new(FALLBACK_PATH)),
    }
}

/// Find `name` in a `PATH`-style list of directories; first match wins.
pub fn find_executable_in(name: &str, path_list: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_list)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
