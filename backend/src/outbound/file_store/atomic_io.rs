//! Atomic document replacement.
//!
//! The new contents go to a hidden temporary file beside the target, are
//! synced, and are then renamed over the target. Readers therefore observe
//! either the old document or the new one, never a partial write.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use camino::{Utf8Component, Utf8Path};
use cap_std::fs::{Dir, OpenOptions};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `file_name` inside `dir` with `contents`.
///
/// # Errors
/// Returns [`io::ErrorKind::InvalidInput`] when `file_name` is not a single
/// plain file name, or the underlying I/O error when writing, syncing, or
/// renaming fails. The temporary file is removed on failure.
pub(crate) fn write_atomic(dir: &Dir, file_name: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let target = single_component(file_name)?;
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let tmp_name = format!(".{target}.tmp.{}.{counter}", std::process::id());

    let written = write_synced(dir, &tmp_name, contents)
        .and_then(|()| replace_target(dir, &tmp_name, target));
    if let Err(err) = written {
        // The temp file may not exist if creation itself failed.
        drop(dir.remove_file(&tmp_name));
        return Err(err);
    }

    // Directory sync is advisory; some platforms refuse it.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
    Ok(())
}

fn single_component(file_name: &Utf8Path) -> io::Result<&str> {
    let mut components = file_name.components();
    match (components.next(), components.next()) {
        (Some(Utf8Component::Normal(name)), None) => Ok(name),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{file_name}' is not a plain file name"),
        )),
    }
}

fn write_synced(dir: &Dir, tmp_name: &str, contents: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(tmp_name, &options)?;
    file.write_all(contents)?;
    file.sync_all()
}

#[cfg(windows)]
fn replace_target(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    // Windows rename fails if the target exists.
    match dir.remove_file(target) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target)
}

#[cfg(not(windows))]
fn replace_target(dir: &Dir, tmp_name: &str, target: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target)
}
