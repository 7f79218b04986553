//! Copy-aside and truncate for the live perfdata file.
//!
//! Nagios keeps appending to the perfdata file. A run copies the file to a
//! snapshot, verifies the copy, and only truncates the live file once the
//! report built from the snapshot is complete. Lines appended in between are put
//! back into the truncated file so the next run picks them up.

use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::RotateError;

/// A verified copy of the live perfdata file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The live file the snapshot was taken from.
    pub original: PathBuf,
    /// The copy.
    pub path: PathBuf,
    /// Bytes copied.
    pub len: u64,
}

/// Copy `original` to `snapshot` and check the copy byte-for-byte.
///
/// The live file is not modified. On error no snapshot is left behind, and a
/// file already at `snapshot` is only touched once `original` has been read.
pub fn copy_aside(original: &Path, snapshot: &Path) -> Result<Snapshot, RotateError> {
    let copy_err = |source| RotateError::Copy {
        from: original.to_path_buf(),
        to: snapshot.to_path_buf(),
        source,
    };

    let content = fs::read(original).map_err(copy_err)?;
    if let Err(source) = fs::write(snapshot, &content) {
        discard(snapshot);
        return Err(copy_err(source));
    }

    // A snapshot that fails verification is removed here; the caller only
    // owns the file once it is returned
    let written = match fs::read(snapshot) {
        Ok(written) => written,
        Err(source) => {
            discard(snapshot);
            return Err(copy_err(source));
        }
    };
    if written != content {
        discard(snapshot);
        return Err(RotateError::Mismatch {
            path: snapshot.to_path_buf(),
            copied: written.len() as u64,
            expected: content.len() as u64,
        });
    }

    tracing::info!(
        original = %original.display(),
        snapshot = %snapshot.display(),
        bytes = content.len(),
        "perfdata copied aside"
    );

    Ok(Snapshot {
        original: original.to_path_buf(),
        path: snapshot.to_path_buf(),
        len: content.len() as u64,
    })
}

fn discard(snapshot: &Path) {
    match fs::remove_file(snapshot) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %snapshot.display(), error = %e, "failed to remove unverified snapshot"),
    }
}

/// Empty the live file a snapshot was taken from.
///
/// Any bytes beyond `snapshot.len` were appended after the copy; they are
/// written back after truncation. Returns the number of carried-over bytes.
pub fn truncate_source(snapshot: &Snapshot) -> Result<u64, RotateError> {
    let path = &snapshot.original;
    let truncate_err = |source| RotateError::Truncate {
        path: path.clone(),
        source,
    };

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(truncate_err)?;

    let current_len = file.metadata().map_err(truncate_err)?.len();
    let mut tail = Vec::new();
    if current_len > snapshot.len {
        file.seek(SeekFrom::Start(snapshot.len)).map_err(truncate_err)?;
        file.read_to_end(&mut tail).map_err(truncate_err)?;
    } else if current_len < snapshot.len {
        tracing::warn!(
            path = %path.display(),
            expected = snapshot.len,
            found = current_len,
            "perfdata file shrank since it was copied"
        );
    }

    file.set_len(0).map_err(truncate_err)?;
    if !tail.is_empty() {
        file.seek(SeekFrom::Start(0)).map_err(truncate_err)?;
        file.write_all(&tail).map_err(truncate_err)?;
        file.flush().map_err(truncate_err)?;
    }

    tracing::info!(
        path = %path.display(),
        carried_over = tail.len(),
        "perfdata file truncated"
    );
    Ok(tail.len() as u64)
}
