//! Path and command-line helpers for the remote target.
//!
//! The target is always a POSIX shell, so remote paths use `/` whatever the
//! host's own separator is.

use std::path::Path;

/// Join a remote directory and a file name with exactly one `/`.
#[must_use]
pub fn remote_join(dir: &str, name: &str) -> String {
    let name = name.replace('\\', "/");
    let name = name.trim_start_matches('/');
    if dir.is_empty() {
        return name.to_string();
    }
    let dir = dir.trim_end_matches('/');
    format!("{dir}/{name}")
}

/// Parent directory of a remote path, `/` for top-level entries.
#[must_use]
pub fn remote_parent(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Whether a remote path is absolute on a POSIX target.
#[must_use]
pub fn is_absolute(path: &str) -> bool {
    path.starts_with('/')
}

/// Base file name of a local path, as used for the remote destination.
#[must_use]
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Quote one word for a POSIX shell. Words made only of safe characters are
/// returned unchanged.
#[must_use]
pub fn shell_quote(word: &str) -> String {
    let safe = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/._-+:=@,%".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
