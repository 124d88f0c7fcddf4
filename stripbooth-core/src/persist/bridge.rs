use std::path::{Path, PathBuf};

use anyhow::Context as _;
use chrono::{DateTime, Utc};

use crate::{
    compose::{
        print::{PrintLayout, build_print_artifact},
        strip::PhotoStrip,
    },
    config::settings::AppSettings,
    foundation::{
        core::EncodedImage,
        error::{BoothError, BoothResult},
    },
    persist::filename::artifact_filename,
};

/// Result of one save attempt, as reported by the bridge.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// The file was written.
    pub success: bool,
    /// Where it was written.
    pub file_path: Option<PathBuf>,
    /// Why it was not.
    pub error: Option<String>,
}

impl SaveReport {
    /// Successful write to `path`.
    pub fn saved(path: PathBuf) -> Self {
        Self {
            success: true,
            file_path: Some(path),
            error: None,
        }
    }

    /// Failed write.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_path: None,
            error: Some(error.into()),
        }
    }
}

/// Writes finished artifacts to a destination folder. Chosen and injected by the hosting shell.
pub trait PersistenceBridge: Send + Sync {
    /// Save `image` as `filename` inside `folder`.
    fn save_file(&self, filename: &str, image: &EncodedImage, folder: Option<&Path>) -> SaveReport;
}

/// Hands an artifact to the user when no folder is configured or the bridge failed.
pub trait DownloadFallback: Send + Sync {
    /// Deliver `image` under `filename`; returns where it ended up.
    fn download(&self, filename: &str, image: &EncodedImage) -> BoothResult<PathBuf>;
}

/// Native bridge: writes into the given folder, creating it if needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct FolderBridge;

impl PersistenceBridge for FolderBridge {
    fn save_file(&self, filename: &str, image: &EncodedImage, folder: Option<&Path>) -> SaveReport {
        let Some(folder) = folder else {
            return SaveReport::failed("no destination folder");
        };
        match write_into(folder, filename, image) {
            Ok(path) => SaveReport::saved(path),
            Err(err) => SaveReport::failed(format!("{err:#}")),
        }
    }
}

/// Download fallback that drops the file into the user's downloads directory.
#[derive(Clone, Debug)]
pub struct DownloadDirFallback {
    dir: PathBuf,
}

impl Default for DownloadDirFallback {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadDirFallback {
    /// Use the platform downloads directory, or the temp directory when there is none.
    pub fn new() -> Self {
        let dir = dirs::download_dir().unwrap_or_else(std::env::temp_dir);
        Self { dir }
    }

    /// Use `dir` instead of the platform downloads directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadFallback for DownloadDirFallback {
    fn download(&self, filename: &str, image: &EncodedImage) -> BoothResult<PathBuf> {
        write_into(&self.dir, filename, image)
            .map_err(|e| BoothError::persistence(format!("download fallback failed: {e:#}")))
    }
}

fn write_into(folder: &Path, filename: &str, image: &EncodedImage) -> anyhow::Result<PathBuf> {
    if filename.is_empty() || filename.contains(['/', '\\']) || filename == ".." {
        anyhow::bail!("invalid artifact filename \"{filename}\"");
    }
    std::fs::create_dir_all(folder)
        .with_context(|| format!("create folder '{}'", folder.display()))?;
    let path = folder.join(filename);
    std::fs::write(&path, image.bytes.as_slice())
        .with_context(|| format!("write '{}'", path.display()))?;
    Ok(path)
}

/// Where a printed strip ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SavedTo {
    /// Written by the bridge into the configured folder.
    Folder(PathBuf),
    /// Delivered through the download fallback.
    Download(PathBuf),
}

impl SavedTo {
    /// Final file path.
    pub fn path(&self) -> &Path {
        match self {
            Self::Folder(p) | Self::Download(p) => p,
        }
    }
}

/// Outcome of [`print_photo_strip`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintReceipt {
    /// Artifact filename.
    pub filename: String,
    /// Destination.
    pub saved_to: SavedTo,
    /// Layout that was printed.
    pub layout: PrintLayout,
}

/// Build the print artifact for `strip` and persist it.
///
/// With a save folder configured the bridge is tried first; a failed save is logged and the
/// download fallback takes over. Without a folder the fallback is used directly. Only a failing
/// fallback is an error.
#[tracing::instrument(skip_all, fields(layout = ?settings.print_layout))]
pub fn print_photo_strip(
    strip: &PhotoStrip,
    settings: &AppSettings,
    bridge: &dyn PersistenceBridge,
    fallback: &dyn DownloadFallback,
    now: DateTime<Utc>,
) -> BoothResult<PrintReceipt> {
    let layout = settings.print_layout;
    let artifact = build_print_artifact(&strip.image, layout)?;
    let filename = artifact_filename(&settings.filename_prefix, now);

    if let Some(folder) = settings.save_folder() {
        let report = bridge.save_file(&filename, &artifact, Some(folder));
        if report.success {
            let path = report.file_path.unwrap_or_else(|| folder.join(&filename));
            tracing::info!(path = %path.display(), "photo strip saved");
            return Ok(PrintReceipt {
                filename,
                saved_to: SavedTo::Folder(path),
                layout,
            });
        }
        let err = BoothError::persistence(
            report
                .error
                .unwrap_or_else(|| "unknown error".to_owned()),
        );
        tracing::warn!(
            folder = %folder.display(),
            error = %err,
            "save to folder failed, using download fallback"
        );
    }

    let path = fallback.download(&filename, &artifact)?;
    tracing::info!(path = %path.display(), "photo strip downloaded");
    Ok(PrintReceipt {
        filename,
        saved_to: SavedTo::Download(path),
        layout,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/persist/bridge.rs"]
mod tests;
