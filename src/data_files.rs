//! Staging of user-supplied data files into an output directory.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::workspace::list_files;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "tiff", "tif", "svg", "webp", "ico",
];

/// Folder in the working directory scanned when no explicit files are given.
pub const DATA_FOLDER: &str = "data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Image,
    Data,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub name: String,
    pub kind: DataKind,
    pub original: PathBuf,
    pub destination: PathBuf,
    /// Whether the original was removed after copying.
    pub deleted: bool,
}

/// Files copied into an output directory by [`process_data_files`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataManifest {
    pub files: Vec<StagedFile>,
}

impl DataManifest {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn images(&self) -> impl Iterator<Item = &StagedFile> {
        self.files.iter().filter(|f| f.kind == DataKind::Image)
    }

    pub fn data(&self) -> impl Iterator<Item = &StagedFile> {
        self.files.iter().filter(|f| f.kind == DataKind::Data)
    }

    /// Staged files whose original is still in place.
    pub fn retained(&self) -> impl Iterator<Item = &StagedFile> {
        self.files.iter().filter(|f| !f.deleted)
    }
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Data files for a run: the explicit list resolved against `work_dir`, or
/// every file in `<work_dir>/data` when the list is empty.
pub fn get_data_files(work_dir: &Path, explicit: &[PathBuf]) -> Vec<PathBuf> {
    if !explicit.is_empty() {
        return explicit
            .iter()
            .map(|path| {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    work_dir.join(path)
                };
                path.canonicalize().unwrap_or(path)
            })
            .collect();
    }
    list_files(&work_dir.join(DATA_FOLDER))
}

/// Copy `files` into `paper_dir`: images to `figures/`, everything else to
/// `data/`. Originals are removed after a successful copy when
/// `delete_originals` is set.
///
/// Returns `None` for an empty input. A file that cannot be copied is logged
/// and left out of the manifest.
pub fn process_data_files(files: &[PathBuf], paper_dir: &Path, delete_originals: bool) -> Option<DataManifest> {
    if files.is_empty() {
        return None;
    }

    let data_dir = paper_dir.join("data");
    let figures_dir = paper_dir.join("figures");
    for dir in [&data_dir, &figures_dir] {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(path = %dir.display(), error = %e, "failed to create staging directory");
        }
    }

    let mut manifest = DataManifest::default();
    for original in files {
        let Some(name) = original.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            tracing::warn!(path = %original.display(), "skipping data file without a name");
            continue;
        };
        let (kind, target_dir) = if is_image(original) {
            (DataKind::Image, &figures_dir)
        } else {
            (DataKind::Data, &data_dir)
        };
        let destination = target_dir.join(&name);

        if let Err(e) = std::fs::copy(original, &destination) {
            tracing::warn!(file = %name, error = %e, "could not process data file");
            continue;
        }
        let deleted = delete_originals
            && match std::fs::remove_file(original) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(file = %name, error = %e, "could not remove original data file");
                    false
                }
            };
        tracing::debug!(file = %name, destination = %destination.display(), "staged data file");

        manifest.files.push(StagedFile {
            name,
            kind,
            original: original.clone(),
            destination,
            deleted,
        });
    }
    Some(manifest)
}

/// Prompt context describing staged files. Empty when nothing was staged.
pub fn data_context_message(manifest: Option<&DataManifest>) -> String {
    let Some(manifest) = manifest.filter(|m| !m.is_empty()) else {
        return String::new();
    };

    let mut lines = vec!["\n[DATA FILES AVAILABLE]".to_string()];

    let data: Vec<_> = manifest.data().collect();
    if !data.is_empty() {
        lines.push("\nData files (in data/ folder):".to_string());
        for file in data {
            lines.push(format!("  - {}: {}", file.name, file.destination.display()));
        }
    }

    let images: Vec<_> = manifest.images().collect();
    if !images.is_empty() {
        lines.push("\nImage files (in figures/ folder):".to_string());
        for file in images {
            lines.push(format!("  - {}: {}", file.name, file.destination.display()));
        }
        lines.push("\nNote: These images can be referenced as figures in the paper.".to_string());
    }

    lines.push("[END DATA FILES]\n".to_string());
    lines.join("\n")
}
