//! Concat demuxer manifest.
//!
//! One `file '<path>'` line per input, embedded single quotes escaped as
//! `'\''`. The manifest is written fresh for every build and overwritten by
//! the next one.

use crate::error::CoreResult;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the manifest inside the work directory.
pub const MANIFEST_FILE_NAME: &str = "_ffconcat.txt";

/// Manifest contents and the path it will be written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatManifest {
    pub path: PathBuf,
    pub contents: String,
}

impl ConcatManifest {
    /// Builds the manifest for `inputs` inside `work_dir`.
    ///
    /// Paths are made absolute so the concat demuxer does not resolve them
    /// relative to the manifest's own directory.
    #[must_use]
    pub fn for_inputs(work_dir: &Path, inputs: &[PathBuf]) -> Self {
        let contents = inputs
            .iter()
            .map(|input| format!("file '{}'\n", escape_path(&absolute(input))))
            .collect();
        Self {
            path: absolute(&work_dir.join(MANIFEST_FILE_NAME)),
            contents,
        }
    }

    /// Writes the manifest, replacing any previous one.
    pub fn write(&self) -> CoreResult<()> {
        log::debug!("Writing concat manifest to {}", self.path.display());
        fs::write(&self.path, &self.contents)?;
        Ok(())
    }
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn escape_path(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_quotes_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("it's here.mp4");
        let manifest = ConcatManifest::for_inputs(dir.path(), &[input.clone()]);
        let expected = format!(
            "file '{}'\n",
            input.to_string_lossy().replace('\'', "'\\''")
        );
        assert_eq!(manifest.contents, expected);
        assert!(manifest.contents.contains("it'\\''s here.mp4"));
    }

    #[test]
    fn test_one_line_per_input_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = [dir.path().join("a.mp4"), dir.path().join("b.mp4")];
        let manifest = ConcatManifest::for_inputs(dir.path(), &inputs);
        let lines: Vec<&str> = manifest.contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a.mp4'"));
        assert!(lines[1].ends_with("b.mp4'"));
        assert!(manifest.path.ends_with(MANIFEST_FILE_NAME));
    }

    #[test]
    fn test_write_overwrites_previous_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let first = ConcatManifest::for_inputs(dir.path(), &[dir.path().join("a.mp4"), dir.path().join("b.mp4")]);
        first.write().unwrap();
        let second = ConcatManifest::for_inputs(dir.path(), &[dir.path().join("c.mp4")]);
        second.write().unwrap();
        assert_eq!(fs::read_to_string(&second.path).unwrap(), second.contents);
    }
}
