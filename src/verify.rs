//! Post-staging integrity checks: directory existence and image/label pairing.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::staging::{collect_image_files, DataPreparer};
use crate::types::Method;

/// A non-fatal problem found while verifying a staged dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingImageDir(PathBuf),
    MissingLabelDir(PathBuf),
    /// Image stems without a label file.
    UnmatchedImages(Vec<String>),
    /// Label stems without an image file.
    UnmatchedLabels(Vec<String>),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingImageDir(path) => write!(f, "image directory does not exist: {}", path.display()),
            Issue::MissingLabelDir(path) => write!(f, "label directory does not exist: {}", path.display()),
            Issue::UnmatchedImages(stems) => write!(f, "{} images have no matching label", stems.len()),
            Issue::UnmatchedLabels(stems) => write!(f, "{} labels have no matching image", stems.len()),
        }
    }
}

/// Intersection and differences between image stems and label stems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairingReport {
    pub matched: BTreeSet<String>,
    pub unmatched_images: BTreeSet<String>,
    pub unmatched_labels: BTreeSet<String>,
}

impl PairingReport {
    pub fn matched_count(&self) -> usize {
        self.matched.len()
    }

    /// Issues for each non-empty difference, images first.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        if !self.unmatched_images.is_empty() {
            issues.push(Issue::UnmatchedImages(self.unmatched_images.iter().cloned().collect()));
        }
        if !self.unmatched_labels.is_empty() {
            issues.push(Issue::UnmatchedLabels(self.unmatched_labels.iter().cloned().collect()));
        }
        issues
    }
}

/// Pair image stems with label stems.
///
/// # Example
///
/// ```
/// use enhance_eval::verify::pair_stems;
///
/// let report = pair_stems(["a", "b", "c"], ["b", "c", "d"]);
/// assert_eq!(report.matched_count(), 2);
/// assert!(report.unmatched_images.contains("a"));
/// assert!(report.unmatched_labels.contains("d"));
/// ```
pub fn pair_stems<I, L, S, T>(images: I, labels: L) -> PairingReport
where
    I: IntoIterator<Item = S>,
    L: IntoIterator<Item = T>,
    S: Into<String>,
    T: Into<String>,
{
    let images: BTreeSet<String> = images.into_iter().map(Into::into).collect();
    let labels: BTreeSet<String> = labels.into_iter().map(Into::into).collect();

    PairingReport {
        matched: images.intersection(&labels).cloned().collect(),
        unmatched_images: images.difference(&labels).cloned().collect(),
        unmatched_labels: labels.difference(&images).cloned().collect(),
    }
}

/// Result of verifying one method's staged dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub method: Method,
    pub images_exist: bool,
    pub labels_exist: bool,
    pub image_count: usize,
    pub label_count: usize,
    pub matched_count: usize,
    pub issues: Vec<Issue>,
}

impl VerificationReport {
    fn new(method: Method) -> Self {
        Self {
            method,
            images_exist: false,
            labels_exist: false,
            image_count: 0,
            label_count: 0,
            matched_count: 0,
            issues: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

/// Label files (`*.txt`) directly inside `dir`.
fn label_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    files.sort();
    files
}

/// Verify `{data_root}/images/{method}` against `{data_root}/labels/val`.
///
/// A missing directory is reported as an issue and ends the check.
pub fn verify_dataset(data_root: &Path, method: Method) -> VerificationReport {
    let preparer = DataPreparer::new(data_root);
    let mut report = VerificationReport::new(method);

    let images_dir = preparer.images_dir(method);
    if !images_dir.exists() {
        report.issues.push(Issue::MissingImageDir(images_dir));
        return report;
    }
    report.images_exist = true;
    let images = collect_image_files(&images_dir);
    report.image_count = images.len();

    let labels_dir = preparer.labels_dir();
    if !labels_dir.exists() {
        report.issues.push(Issue::MissingLabelDir(labels_dir));
        return report;
    }
    report.labels_exist = true;
    let labels = label_files(&labels_dir);
    report.label_count = labels.len();

    let pairing = pair_stems(
        images.iter().filter_map(|path| file_stem(path)),
        labels.iter().filter_map(|path| file_stem(path)),
    );
    report.matched_count = pairing.matched_count();
    report.issues = pairing.issues();
    report
}

fn mark(flag: bool) -> &'static str {
    if flag {
        "✓"
    } else {
        "✗"
    }
}

/// Render verification reports for several methods.
pub fn render_verification_report(reports: &[VerificationReport]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();
    out.push_str(&format!("{rule}\nDataset Verification Report\n{rule}\n"));

    for report in reports {
        out.push_str(&format!("\n[{}]\n", report.method.as_str().to_uppercase()));
        out.push_str(&format!("  Images directory exists: {}\n", mark(report.images_exist)));
        out.push_str(&format!("  Labels directory exists: {}\n", mark(report.labels_exist)));
        out.push_str(&format!("  Images: {}\n", report.image_count));
        out.push_str(&format!("  Labels: {}\n", report.label_count));
        out.push_str(&format!("  Matched: {}\n", report.matched_count));
        if report.is_clean() {
            out.push_str("  ✓ all checks passed\n");
        } else {
            out.push_str("  ⚠ issues:\n");
            for issue in &report.issues {
                out.push_str(&format!("    - {issue}\n"));
            }
        }
    }

    out.push_str(&format!("\n{rule}\n"));
    out
}

/// Verify each method and print the combined report to stdout.
pub fn print_verification_report(data_root: &Path, methods: &[Method]) -> Vec<VerificationReport> {
    let reports: Vec<VerificationReport> = methods
        .iter()
        .map(|&method| verify_dataset(data_root, method))
        .collect();
    print!("{}", render_verification_report(&reports));
    reports
}
