//! Batch image rescaling.
//!
//! Given one source image, an original scale and a list of output scales,
//! produce one [`ResizedArtifact`] per output scale, in input order, in the
//! source's own encoding.
//!
//! ## Per-scale steps
//!
//! ```text
//! factor     = output / original
//! dimensions = max(1, round(edge * factor))     (each edge)
//! render     = resample (Lanczos3) + encode     (JPEG at quality 95)
//! file name  = {stem}-{scale}x{ext}
//! ```
//!
//! Scales are processed strictly one after another. A [`ProgressEvent`] is
//! sent after each completed scale. The first failure aborts the remaining
//! scales; artifacts already produced are kept.
//!
//! ## Session
//!
//! [`ResizeSession`] owns the tool state (selected file, current results)
//! and exposes the user actions as commands: select, remove, process,
//! download, download all. Validation failures never touch that state.

use crate::blob::{BlobError, BlobStore, ObjectUrl};
use crate::export::{self, DownloadSink, ExportError, ExportOptions};
use crate::imaging::{
    BackendError, Filter, ImageBackend, OutputFormat, Quality, RenderParams,
    check_canvas_size, resolve_output_format, scale_factor, scaled_dimensions,
};
use crate::naming::artifact_file_name;
use crate::scales::{ScaleError, ScaleRequest};
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ResizeError {
    #[error("No image selected")]
    NoFile,
    #[error("{name} is not an image (type {declared_type:?})")]
    NotAnImage { name: String, declared_type: String },
    #[error(transparent)]
    Scale(#[from] ScaleError),
    #[error("Image processing failed: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Blob(#[from] BlobError),
}

impl ResizeError {
    /// Raised before any work started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoFile | Self::NotAnImage { .. } | Self::Scale(_)
        )
    }
}

/// A user-supplied file, fully loaded into memory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    /// MIME type as a file picker would declare it.
    pub declared_type: String,
    pub bytes: Arc<[u8]>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, declaring its type from the extension and
    /// falling back to sniffing the content.
    pub fn from_path(path: &Path) -> Result<Self, std::io::Error> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let declared_type = declared_type(path, &bytes);
        Ok(Self::new(name, declared_type, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The acceptance gate for image tools.
    pub fn is_image(&self) -> bool {
        self.declared_type.starts_with("image/")
    }

    pub fn ensure_image(&self) -> Result<(), ResizeError> {
        if self.is_image() {
            Ok(())
        } else {
            Err(ResizeError::NotAnImage {
                name: self.name.clone(),
                declared_type: self.declared_type.clone(),
            })
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        resolve_output_format(&self.name, &self.declared_type)
    }

    /// Pixel size read from the image header, without decoding.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        image::ImageReader::new(Cursor::new(&self.bytes[..]))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}

fn declared_type(path: &Path, bytes: &[u8]) -> String {
    ImageFormat::from_path(path)
        .or_else(|_| image::guess_format(bytes))
        .map(|fmt| fmt.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// One rescaled image.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizedArtifact {
    pub file_name: String,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub data: Arc<[u8]>,
}

impl ResizedArtifact {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Encoding and resampling choices for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResizeOptions {
    pub quality: Quality,
    pub filter: Filter,
}

/// Sent after each completed scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// 1-based position of the scale just completed.
    pub current: usize,
    pub total: usize,
    pub scale: f64,
    pub file_name: String,
}

impl ProgressEvent {
    pub fn fraction(&self) -> f64 {
        self.current as f64 / self.total as f64
    }
}

/// Rescale `source` once per output scale, appending to `artifacts`.
///
/// The source bytes are addressed through an [`ObjectUrl`] while decoding;
/// it is revoked on every path. On error, `artifacts` holds whatever was
/// produced before the failing scale.
pub fn rescale_batch<B: ImageBackend, S: BlobStore + ?Sized>(
    backend: &B,
    blobs: &S,
    source: &SourceFile,
    request: &ScaleRequest,
    options: ResizeOptions,
    progress: Option<&Sender<ProgressEvent>>,
    artifacts: &mut Vec<ResizedArtifact>,
) -> Result<(), ResizeError> {
    let format = source.output_format();
    let total = request.output_scales().len();
    info!(file = %source.name, total, format = format.mime_type(), "starting batch");

    let image = {
        let url = ObjectUrl::create(blobs, Arc::clone(&source.bytes));
        let bytes = url.bytes()?;
        backend.decode(&bytes)?
    };
    let source_dims = backend.dimensions(&image);

    for (index, &scale) in request.output_scales().iter().enumerate() {
        let factor = scale_factor(request.original_scale(), scale);
        let (width, height) = scaled_dimensions(source_dims.as_tuple(), factor);
        debug!(scale, factor, width, height, "rendering scale");

        let params = RenderParams {
            width,
            height,
            format,
            quality: options.quality,
            filter: options.filter,
        };
        let data = check_canvas_size(width, height)
            .and_then(|()| backend.render(&image, &params))
            .inspect_err(|e| {
                warn!(scale, completed = index, total, error = %e, "batch aborted");
            })?;

        let file_name = artifact_file_name(&source.name, scale);
        artifacts.push(ResizedArtifact {
            file_name: file_name.clone(),
            scale,
            width,
            height,
            format,
            data: data.into(),
        });

        if let Some(tx) = progress {
            // A dropped receiver only means nobody is watching
            let _ = tx.send(ProgressEvent {
                current: index + 1,
                total,
                scale,
                file_name,
            });
        }
    }

    info!(file = %source.name, produced = artifacts.len(), "batch complete");
    Ok(())
}

/// State of one rescaler instance.
#[derive(Debug, Default)]
pub struct ResizeSession {
    file: Option<SourceFile>,
    results: Vec<ResizedArtifact>,
    options: ResizeOptions,
}

impl ResizeSession {
    pub fn new(options: ResizeOptions) -> Self {
        Self {
            file: None,
            results: Vec::new(),
            options,
        }
    }

    /// Select a new source file. Non-images are rejected and leave the
    /// current selection untouched.
    pub fn select_file(&mut self, file: SourceFile) -> Result<(), ResizeError> {
        file.ensure_image()?;
        self.file = Some(file);
        self.results.clear();
        Ok(())
    }

    /// Reset: forget the file and every result.
    pub fn remove_file(&mut self) {
        self.file = None;
        self.results.clear();
    }

    pub fn file(&self) -> Option<&SourceFile> {
        self.file.as_ref()
    }

    pub fn results(&self) -> &[ResizedArtifact] {
        &self.results
    }

    pub fn options(&self) -> ResizeOptions {
        self.options
    }

    /// Validate the scale inputs and run a batch over the selected file.
    ///
    /// Previous results are replaced only once validation has passed.
    pub fn process<B: ImageBackend, S: BlobStore + ?Sized>(
        &mut self,
        backend: &B,
        blobs: &S,
        original_scale: &str,
        output_scales: &str,
        progress: Option<&Sender<ProgressEvent>>,
    ) -> Result<&[ResizedArtifact], ResizeError> {
        let file = self.file.as_ref().ok_or(ResizeError::NoFile)?;
        let request = ScaleRequest::parse(original_scale, output_scales)?;

        self.results.clear();
        rescale_batch(
            backend,
            blobs,
            file,
            &request,
            self.options,
            progress,
            &mut self.results,
        )?;
        Ok(&self.results)
    }

    /// Save one result through `sink`.
    pub fn download<S: BlobStore + ?Sized>(
        &self,
        index: usize,
        blobs: &S,
        sink: &mut dyn DownloadSink,
    ) -> Result<(), ExportError> {
        let artifact = self
            .results
            .get(index)
            .ok_or(ExportError::NoSuchArtifact(index))?;
        export::save_artifact(blobs, sink, artifact)
    }

    /// Save every result, as one archive when possible.
    pub fn download_all<S: BlobStore + ?Sized>(
        &self,
        blobs: &S,
        sink: &mut dyn DownloadSink,
        options: &ExportOptions,
    ) -> Result<export::ExportSummary, ExportError> {
        export::export_all(blobs, sink, &self.results, options)
    }
}
