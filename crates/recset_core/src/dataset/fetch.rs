//! Download collaborators.

use super::DatasetContext;
use crate::error::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Copies a remote file to a local path.
pub trait Fetcher: Send + Sync {
    /// Fetches `url` into `dest`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Implementations return [`CoreError::Download`] or an I/O error.
    fn fetch(&self, url: &str, dest: &Path) -> CoreResult<()>;
}

/// Checks a local file against an expected digest.
pub trait ChecksumVerifier: Send + Sync {
    /// Returns whether `path` matches `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn verify(&self, path: &Path, expected: &str) -> CoreResult<bool>;
}

/// Unpacks a downloaded archive.
pub trait Unarchiver: Send + Sync {
    /// Extracts every member of `archive` below `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive cannot be read or written out.
    fn unarchive(&self, archive: &Path, dest: &Path) -> CoreResult<()>;
}

/// Verifies hex-encoded SHA-256 digests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Verifier;

impl Sha256Verifier {
    /// Hex SHA-256 of a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn digest_file(path: &Path) -> CoreResult<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect())
    }
}

impl ChecksumVerifier for Sha256Verifier {
    fn verify(&self, path: &Path, expected: &str) -> CoreResult<bool> {
        Ok(Self::digest_file(path)?.eq_ignore_ascii_case(expected.trim()))
    }
}

/// A file a dataset needs, and where to get it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// File name inside the working directory.
    pub name: String,
    /// Source URL.
    pub url: String,
    /// Expected digest, if published.
    pub checksum: Option<String>,
}

impl RemoteFile {
    /// A file fetched from `base_url/name`.
    #[must_use]
    pub fn new(base_url: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("{}/{}", base_url.trim_end_matches('/'), name),
            checksum: None,
        }
    }

    /// Sets the expected digest.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }
}

/// Makes sure `file` exists in `dir`, fetching it if needed.
///
/// Present files are never fetched again or re-verified. A fetched file
/// that fails verification is removed.
///
/// # Errors
///
/// Returns [`CoreError::MissingFile`] if the file is absent and `ctx` has no
/// fetcher, [`CoreError::ChecksumFailed`] on a digest mismatch, or the
/// fetcher's error.
pub fn ensure_file(ctx: &DatasetContext, dir: &Path, file: &RemoteFile) -> CoreResult<PathBuf> {
    let path = dir.join(&file.name);
    if path.is_file() {
        debug!(path = %path.display(), "dataset file already present");
        return Ok(path);
    }

    let Some(fetcher) = &ctx.fetcher else {
        return Err(CoreError::MissingFile { path });
    };

    fs::create_dir_all(dir)?;
    debug!(url = %file.url, path = %path.display(), "fetching dataset file");
    fetcher.fetch(&file.url, &path)?;

    if let (Some(expected), Some(verifier)) = (&file.checksum, &ctx.verifier) {
        if !verifier.verify(&path, expected)? {
            fs::remove_file(&path)?;
            return Err(CoreError::ChecksumFailed { path });
        }
    }

    Ok(path)
}

/// Makes sure every file in `members` exists in `dir`, extracting the set
/// from `archive` when any is missing.
///
/// The archive unpacks into `dir/folder`. Each member is moved up into
/// `dir` and the folder is removed afterwards. The archive itself goes
/// through [`ensure_file`] and stays in `dir`.
///
/// # Errors
///
/// Returns [`CoreError::MissingFile`] for the first missing member if `ctx`
/// has no unarchiver or the archive does not contain it, or the errors of
/// [`ensure_file`] and the unarchiver.
pub fn ensure_extracted(
    ctx: &DatasetContext,
    dir: &Path,
    archive: &RemoteFile,
    folder: &str,
    members: &[&str],
) -> CoreResult<()> {
    let Some(missing) = members.iter().map(|m| dir.join(m)).find(|p| !p.is_file()) else {
        debug!(dir = %dir.display(), "extracted dataset files already present");
        return Ok(());
    };
    let Some(unarchiver) = &ctx.unarchiver else {
        return Err(CoreError::MissingFile { path: missing });
    };

    let archive_path = ensure_file(ctx, dir, archive)?;
    debug!(archive = %archive_path.display(), "extracting dataset archive");
    unarchiver.unarchive(&archive_path, dir)?;

    let extracted = dir.join(folder);
    for member in members {
        let target = dir.join(member);
        if target.is_file() {
            continue;
        }
        let source = extracted.join(member);
        if !source.is_file() {
            return Err(CoreError::MissingFile { path: source });
        }
        fs::rename(&source, &target)?;
    }
    if extracted.is_dir() {
        fs::remove_dir_all(&extracted)?;
    }
    Ok(())
}

/// Returns the path of `name` in `dir` if the file exists.
///
/// # Errors
///
/// Returns [`CoreError::MissingFile`] otherwise.
pub fn require_file(dir: &Path, name: &str) -> CoreResult<PathBuf> {
    let path = dir.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(CoreError::MissingFile { path })
    }
}
