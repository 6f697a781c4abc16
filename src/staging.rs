//! Staged output files.
//!
//! A stage writes each of its outputs to a temporary file in the target's
//! directory and renames them all onto their targets only after every write
//! has succeeded. Dropping a [`Staged`] file without committing removes it.

use crate::dataset::{write_csv_to, Table};
use crate::ingestion::create_parent_dir;
use crate::preprocessing::error::PreprocessingError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A fully written temporary file waiting to be renamed onto `target`.
pub(crate) struct Staged {
    file: NamedTempFile,
    target: PathBuf,
}

fn temp_file_for(target: &Path) -> Result<NamedTempFile, PreprocessingError> {
    create_parent_dir(target)?;
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

pub(crate) fn stage_table(table: &Table, target: &Path) -> Result<Staged, PreprocessingError> {
    let mut file = temp_file_for(target)?;
    write_csv_to(table, &mut file)?;
    Ok(Staged {
        file,
        target: target.to_path_buf(),
    })
}

pub(crate) fn stage_bytes(bytes: &[u8], target: &Path) -> Result<Staged, PreprocessingError> {
    let mut file = temp_file_for(target)?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(Staged {
        file,
        target: target.to_path_buf(),
    })
}

/// Rename every staged file onto its target.
pub(crate) fn commit(staged: Vec<Staged>) -> Result<(), PreprocessingError> {
    for Staged { file, target } in staged {
        file.persist(&target).map_err(|e| e.error)?;
        debug!(path = %target.display(), "persisted");
    }
    Ok(())
}
