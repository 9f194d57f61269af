//! Staging of per-method image directories by copy or symbolic link.

use std::fmt;
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use crate::config::IMAGE_EXTENSIONS;
use crate::error::{EvalError, Result};
use crate::types::Method;

/// How a source image is placed into the per-method directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageMode {
    /// Copy the file, preserving permissions and timestamps.
    Copy,
    /// Create a symbolic link to the absolute source path.
    #[default]
    Symlink,
}

impl fmt::Display for StageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageMode::Copy => f.write_str("copy"),
            StageMode::Symlink => f.write_str("symlink"),
        }
    }
}

/// Outcome of staging a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedPath {
    pub source: PathBuf,
    pub target: PathBuf,
    pub mode: StageMode,
}

/// Places files into one target directory using a fixed [`StageMode`].
#[derive(Debug, Clone)]
pub struct Stager {
    target_dir: PathBuf,
    mode: StageMode,
}

impl Stager {
    pub fn new<P: Into<PathBuf>>(target_dir: P, mode: StageMode) -> Self {
        Self {
            target_dir: target_dir.into(),
            mode,
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    pub fn mode(&self) -> StageMode {
        self.mode
    }

    /// Stage one file under its own file name in the target directory.
    ///
    /// Any existing entry at the target path, including a dangling link, is
    /// removed first so re-staging never writes through a stale link.
    ///
    /// # Errors
    ///
    /// [`EvalError::InvalidParameter`] when the target already is the source
    /// file; nothing is removed in that case.
    pub fn stage(&self, file: &Path) -> Result<StagedPath> {
        let file_name = file.file_name().ok_or_else(|| {
            EvalError::InvalidParameter(format!("not a file path: {}", file.display()))
        })?;
        let target = self.target_dir.join(file_name);

        if is_same_file(file, &target) {
            return Err(EvalError::InvalidParameter(format!(
                "source and target are the same file: {}",
                target.display()
            )));
        }

        if fs::symlink_metadata(&target).is_ok() {
            fs::remove_file(&target)?;
        }

        match self.mode {
            StageMode::Copy => copy_preserving_times(file, &target)?,
            StageMode::Symlink => {
                let source = fs::canonicalize(file)?;
                symlink_file(&source, &target)?;
            }
        }

        Ok(StagedPath {
            source: file.to_path_buf(),
            target,
            mode: self.mode,
        })
    }
}

/// Whether `target` names the same directory entry as `file`, or is a
/// regular file resolving to the same path. A link at `target` pointing at
/// `file` is not the same file: removing it leaves the source intact.
fn is_same_file(file: &Path, target: &Path) -> bool {
    let Ok(metadata) = fs::symlink_metadata(target) else {
        return false;
    };
    let source_entry = entry_path(file);
    if source_entry.is_some() && source_entry == entry_path(target) {
        return true;
    }
    if metadata.file_type().is_symlink() {
        return false;
    }
    match (fs::canonicalize(file), fs::canonicalize(target)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Canonical parent joined with the unresolved file name.
fn entry_path(path: &Path) -> Option<PathBuf> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Some(fs::canonicalize(parent).ok()?.join(path.file_name()?))
}

// Times are set while the copy is still writable; permissions, which may be
// read-only, are applied last.
fn copy_preserving_times(source: &Path, target: &Path) -> Result<()> {
    let metadata = fs::metadata(source)?;
    let mut reader = File::open(source)?;
    let mut writer = File::create(target)?;
    io::copy(&mut reader, &mut writer)?;

    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    writer.set_times(times)?;
    drop(writer);

    fs::set_permissions(target, metadata.permissions())?;
    Ok(())
}

#[cfg(unix)]
fn symlink_file(source: &Path, target: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(source, target)
}

#[cfg(windows)]
fn symlink_file(source: &Path, target: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(source, target)
}

/// Whether a path has one of the recognised image extensions (case-insensitive).
///
/// ```
/// use std::path::Path;
/// use enhance_eval::staging::is_image_file;
///
/// assert!(is_image_file(Path::new("frames/b1c66a42.JPG")));
/// assert!(is_image_file(Path::new("scan.tif")));
/// assert!(!is_image_file(Path::new("labels/b1c66a42.txt")));
/// ```
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Recursively collect image files under `directory`, sorted by path.
///
/// Symbolic links are followed, so a staged directory of links enumerates
/// like a copied one. Unreadable entries are skipped.
pub fn collect_image_files(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_image_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}

/// Summary of one staging run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub method: Method,
    pub source: PathBuf,
    pub target_dir: PathBuf,
    pub mode: StageMode,
    pub staged: usize,
}

/// Prepares the `images/{method}` directories under a data root.
#[derive(Debug, Clone)]
pub struct DataPreparer {
    data_root: PathBuf,
}

impl DataPreparer {
    pub fn new<P: Into<PathBuf>>(data_root: P) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// `{data_root}/images/{method}`
    pub fn images_dir(&self, method: Method) -> PathBuf {
        self.data_root.join("images").join(method.as_str())
    }

    /// `{data_root}/labels/val`
    pub fn labels_dir(&self) -> PathBuf {
        self.data_root.join("labels").join("val")
    }

    /// Stage every image under `source` into `images/{method}`.
    ///
    /// # Errors
    ///
    /// [`EvalError::SourceNotFound`] if `source` does not exist,
    /// [`EvalError::NoImages`] if it holds no image files, or the I/O error of
    /// the first file that could not be staged.
    pub fn stage_method(&self, source: &Path, method: Method, mode: StageMode) -> Result<StageSummary> {
        let target_dir = self.images_dir(method);
        fs::create_dir_all(&target_dir)?;

        if !source.exists() {
            return Err(EvalError::SourceNotFound(source.to_path_buf()));
        }

        let files = collect_image_files(source);
        if files.is_empty() {
            return Err(EvalError::NoImages(source.to_path_buf()));
        }

        log::info!(
            "staging {} images for {} ({}): {} -> {}",
            files.len(),
            method,
            mode,
            source.display(),
            target_dir.display()
        );

        let stager = Stager::new(&target_dir, mode);
        let progress = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}")
        {
            progress.set_style(style.progress_chars("##>-"));
        }
        progress.set_message(method.to_string());

        for file in &files {
            stager.stage(file)?;
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(StageSummary {
            method,
            source: source.to_path_buf(),
            target_dir,
            mode,
            staged: files.len(),
        })
    }

    /// Stage images and report success as a boolean; failures are logged.
    pub fn prepare_dataset(&self, source: &Path, method: Method, mode: StageMode) -> bool {
        match self.stage_method(source, method, mode) {
            Ok(summary) => {
                log::info!("{} dataset ready: {} files staged", summary.method, summary.staged);
                true
            }
            Err(err) => {
                log::error!("failed to prepare {method} dataset: {err}");
                false
            }
        }
    }
}
