//! Batch input collection
//!
//! Turns command-line paths into upload requests. Directories are walked
//! recursively; only `.txt` files are eligible and names containing `crep`
//! are skipped. Order is deterministic (sorted by file name per directory).

use crate::models::UploadRequest;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Substring marking files that are never uploaded
const EXCLUDED_MARKER: &str = "crep";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("File access error {}: {}", .0.display(), .1)]
    FileAccess(PathBuf, String),
}

/// Paths selected for upload and paths passed over
#[derive(Debug, Clone, Default)]
pub struct IntakeResult {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Whether a file name is eligible for upload
pub fn is_eligible(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".txt") && !lower.contains(EXCLUDED_MARKER)
}

/// Expand the given paths into eligible input files
pub fn collect_inputs(paths: &[PathBuf]) -> Result<IntakeResult, IntakeError> {
    let mut result = IntakeResult::default();

    for path in paths {
        if !path.exists() {
            return Err(IntakeError::PathNotFound(path.clone()));
        }

        if path.is_file() {
            sort_into(&mut result, path.clone());
            continue;
        }

        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| IntakeError::FileAccess(path.clone(), e.to_string()))?;
            if entry.file_type().is_file() {
                sort_into(&mut result, entry.into_path());
            }
        }
    }

    tracing::debug!(
        selected = result.files.len(),
        skipped = result.skipped.len(),
        "Input collection complete"
    );

    Ok(result)
}

fn sort_into(result: &mut IntakeResult, path: PathBuf) {
    let eligible = path
        .file_name()
        .map(|name| is_eligible(&name.to_string_lossy()))
        .unwrap_or(false);

    if eligible {
        result.files.push(path);
    } else {
        result.skipped.push(path);
    }
}

/// Read one file into an upload request
pub fn load_request(path: &Path, queue: Option<&str>) -> Result<UploadRequest, IntakeError> {
    let bytes =
        std::fs::read(path).map_err(|e| IntakeError::FileAccess(path.to_path_buf(), e.to_string()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let request = UploadRequest::new(bytes, filename);
    Ok(match queue {
        Some(queue) => request.with_queue(queue),
        None => request,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_is_eligible() {
        assert!(is_eligible("EUR_rec.txt"));
        assert!(is_eligible("SBP_0101.TXT"));
        assert!(!is_eligible("EUR_CREP_0101.txt"));
        assert!(!is_eligible("report.csv"));
    }

    #[test]
    fn test_collect_walks_directories_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b_eur.txt"), "x\n").unwrap();
        fs::write(dir.path().join("a_sbp.txt"), "x\n").unwrap();
        fs::write(dir.path().join("crep_0101.txt"), "x\n").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c_rec.txt"), "x\n").unwrap();
        fs::write(dir.path().join("notes.md"), "x\n").unwrap();

        let result = collect_inputs(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<String> = result
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a_sbp.txt", "b_eur.txt", "c_rec.txt"]);
        assert_eq!(result.skipped.len(), 2);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            collect_inputs(&[missing]),
            Err(IntakeError::PathNotFound(_))
        ));
    }

    #[test]
    fn test_load_request_uses_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("EUR_rec.txt");
        fs::write(&path, "a\nb\n").unwrap();

        let request = load_request(&path, Some("euro")).unwrap();
        assert_eq!(request.filename, "EUR_rec.txt");
        assert_eq!(request.bytes, b"a\nb\n");
        assert_eq!(request.queue.as_deref(), Some("euro"));
    }
}
