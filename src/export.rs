//! Saving rescaled images.
//!
//! A single artifact is saved under its derived file name. "Download all"
//! packages every artifact into `resized_images_{unixMillis}.zip` when the
//! `archive` feature is compiled in and enabled in config; otherwise each
//! artifact is saved in turn with a fixed pause between saves.
//!
//! Bytes always reach the sink through an [`ObjectUrl`], which is revoked
//! after the save whether it succeeded or not.

use crate::blob::{BlobError, BlobStore, ObjectUrl};
use crate::resize::ResizedArtifact;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "archive")]
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No result at position {0}")]
    NoSuchArtifact(usize),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[cfg(feature = "archive")]
    #[error("Archive generation failed: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Destination for saved files.
pub trait DownloadSink {
    fn save(&mut self, file_name: &str, data: &[u8]) -> Result<(), std::io::Error>;
}

/// Writes each saved file into a directory, creating it on first use.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in order.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, data: &[u8]) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, data)?;
        self.saved.push(path);
        Ok(())
    }
}

/// How "download all" behaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Package into one ZIP when the `archive` feature is available.
    pub archive: bool,
    /// Pause between individual saves in the fallback path.
    pub spacing: Duration,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            archive: true,
            spacing: Duration::from_millis(100),
        }
    }
}

/// What "download all" produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportSummary {
    Nothing,
    Archive { file_name: String, entries: usize },
    Files { count: usize },
}

/// Name of a bulk archive created at `unix_millis`.
pub fn archive_file_name(unix_millis: u128) -> String {
    format!("resized_images_{}.zip", unix_millis)
}

#[cfg(feature = "archive")]
fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Whether this build can produce archives.
pub fn archive_supported() -> bool {
    cfg!(feature = "archive")
}

/// Save one artifact under its derived name.
pub fn save_artifact<S: BlobStore + ?Sized>(
    blobs: &S,
    sink: &mut dyn DownloadSink,
    artifact: &ResizedArtifact,
) -> Result<(), ExportError> {
    let url = ObjectUrl::create(blobs, Arc::clone(&artifact.data));
    sink.save(&artifact.file_name, &url.bytes()?)?;
    debug!(file = %artifact.file_name, bytes = artifact.size(), "saved artifact");
    Ok(())
}

/// Save every artifact: one archive when possible, otherwise one by one.
pub fn export_all<S: BlobStore + ?Sized>(
    blobs: &S,
    sink: &mut dyn DownloadSink,
    artifacts: &[ResizedArtifact],
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    if artifacts.is_empty() {
        return Ok(ExportSummary::Nothing);
    }

    #[cfg(feature = "archive")]
    {
        if options.archive {
            let file_name = archive_file_name(now_millis());
            let (bytes, entries) = build_archive(artifacts)?;
            let url = ObjectUrl::create(blobs, bytes);
            sink.save(&file_name, &url.bytes()?)?;
            info!(file = %file_name, entries, "saved archive");
            return Ok(ExportSummary::Archive { file_name, entries });
        }
    }

    for (i, artifact) in artifacts.iter().enumerate() {
        if i > 0 && !options.spacing.is_zero() {
            std::thread::sleep(options.spacing);
        }
        save_artifact(blobs, sink, artifact)?;
    }
    info!(count = artifacts.len(), "saved files individually");
    Ok(ExportSummary::Files {
        count: artifacts.len(),
    })
}

/// Pack artifacts into an in-memory ZIP, in order.
///
/// A repeated file name keeps the position of its first occurrence and the
/// data of its last, so a later artifact replaces an earlier one.
#[cfg(feature = "archive")]
fn build_archive(artifacts: &[ResizedArtifact]) -> Result<(Vec<u8>, usize), ExportError> {
    use std::collections::HashMap;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut entries: Vec<&ResizedArtifact> = Vec::with_capacity(artifacts.len());
    let mut slots: HashMap<&str, usize> = HashMap::new();
    for artifact in artifacts {
        match slots.get(artifact.file_name.as_str()).copied() {
            Some(slot) => {
                debug!(file = %artifact.file_name, "replacing duplicate archive entry");
                entries[slot] = artifact;
            }
            None => {
                slots.insert(artifact.file_name.as_str(), entries.len());
                entries.push(artifact);
            }
        }
    }

    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let file_options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for artifact in &entries {
        writer.start_file(artifact.file_name.as_str(), file_options)?;
        writer.write_all(&artifact.data)?;
    }

    let cursor = writer.finish()?;
    Ok((cursor.into_inner(), entries.len()))
}
