//! Description file discovery with gitignore support
//!
//! Walks the given roots with the ignore crate, keeps JSON files (using the
//! ignore crate's ripgrep type definitions) and filters them through the
//! configured include/exclude glob sets.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use ignore::types::{Types, TypesBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file walking
#[derive(Debug, Error)]
pub enum FileWalkerError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },

    #[error("Invalid file type definition: {0}")]
    Types(ignore::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),
}

/// Reason why a file was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// File did not match include patterns or matched an exclude pattern
    ExcludedByPattern,
    /// File is not a JSON file
    NotJson,
    /// Entry is not a regular file
    NotAFile,
}

/// Result of file walking: either a description file or a skipped entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkResult {
    File(PathBuf),
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Iterator source over discovered description files
pub struct FileWalker {
    walker: ignore::Walk,
    include_set: Option<GlobSet>,
    exclude_set: GlobSet,
    json: Types,
}

impl FileWalker {
    /// Creates a new FileWalker over one or more roots
    ///
    /// # Arguments
    /// * `roots` - Files or directories to walk; must not be empty
    /// * `include` - Include patterns (empty means include every JSON file)
    /// * `exclude` - Exclude patterns (applied after include)
    pub fn new(
        roots: &[PathBuf],
        include: &[String],
        exclude: &[String],
    ) -> Result<Self, FileWalkerError> {
        let current = [PathBuf::from(".")];
        let roots = if roots.is_empty() { &current[..] } else { roots };
        let mut builder = WalkBuilder::new(&roots[0]);
        for root in &roots[1..] {
            builder.add(root);
        }
        let walker = builder
            .hidden(false) // Don't skip hidden files by default
            .git_ignore(true) // Respect .gitignore
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        let include_set = if include.is_empty() {
            None
        } else {
            Some(Self::build_globset(include)?)
        };

        // Always exclude .git directories
        let mut exclude_patterns = exclude.to_vec();
        exclude_patterns.push("**/.git/**".to_string());
        let exclude_set = Self::build_globset(&exclude_patterns)?;

        let mut types = TypesBuilder::new();
        types.add_defaults();
        types.select("json");
        let json = types.build().map_err(FileWalkerError::Types)?;

        Ok(Self {
            walker,
            include_set,
            exclude_set,
            json,
        })
    }

    /// Builds a GlobSet from patterns
    fn build_globset(patterns: &[String]) -> Result<GlobSet, FileWalkerError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| FileWalkerError::InvalidGlob {
                pattern: pattern.clone(),
                source: e,
            })?;
            builder.add(glob);
        }
        builder.build().map_err(|e| FileWalkerError::InvalidGlob {
            pattern: "<globset>".to_string(),
            source: e,
        })
    }

    /// Walks the roots and returns matching description files
    pub fn walk(self) -> impl Iterator<Item = Result<PathBuf, FileWalkerError>> {
        self.walk_with_skip_info().filter_map(|result| match result {
            Ok(WalkResult::File(path)) => Some(Ok(path)),
            Ok(WalkResult::Skipped { .. }) => None,
            Err(e) => Some(Err(e)),
        })
    }

    /// Walks the roots and reports skipped entries as well
    pub fn walk_with_skip_info(self) -> impl Iterator<Item = Result<WalkResult, FileWalkerError>> {
        let Self {
            walker,
            include_set,
            exclude_set,
            json,
        } = self;

        walker.map(move |result| {
            let entry = result?;
            let path = entry.path();

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return Ok(skipped(path, SkipReason::NotAFile));
            }

            if !json.matched(path, false).is_whitelist() {
                return Ok(skipped(path, SkipReason::NotJson));
            }

            // Globs are written relative to the working directory
            let relative = path.strip_prefix(".").unwrap_or(path);
            let included = include_set.as_ref().is_none_or(|set| set.is_match(relative));
            if !included || exclude_set.is_match(relative) {
                return Ok(skipped(path, SkipReason::ExcludedByPattern));
            }

            Ok(WalkResult::File(path.to_path_buf()))
        })
    }
}

fn skipped(path: &Path, reason: SkipReason) -> WalkResult {
    tracing::trace!(path = %path.display(), ?reason, "skipping entry");
    WalkResult::Skipped {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_globset_valid() {
        let patterns = vec!["*.json".to_string(), "schemas/**/*.json".to_string()];
        assert!(FileWalker::build_globset(&patterns).is_ok());
    }

    #[test]
    fn test_build_globset_invalid() {
        let patterns = vec!["[invalid".to_string()];
        assert!(matches!(
            FileWalker::build_globset(&patterns),
            Err(FileWalkerError::InvalidGlob { .. })
        ));
    }

    #[test]
    fn test_walk_keeps_only_json() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("user.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();

        let walker = FileWalker::new(&[temp_dir.path().to_path_buf()], &[], &[]).unwrap();
        let files: Vec<PathBuf> = walker.walk().filter_map(Result::ok).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("user.json"));
    }

    #[test]
    fn test_walk_with_exclude_filter() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp_dir.path().join("fixtures")).unwrap();
        fs::write(temp_dir.path().join("a.json"), "{}").unwrap();
        fs::write(temp_dir.path().join("fixtures/b.json"), "{}").unwrap();

        let exclude = vec!["**/fixtures/**".to_string()];
        let walker = FileWalker::new(&[temp_dir.path().to_path_buf()], &[], &exclude).unwrap();
        let results: Vec<WalkResult> = walker.walk_with_skip_info().filter_map(Result::ok).collect();

        assert!(results.iter().any(|r| matches!(r, WalkResult::File(p) if p.ends_with("a.json"))));
        assert!(results.iter().any(|r| matches!(
            r,
            WalkResult::Skipped { path, reason: SkipReason::ExcludedByPattern } if path.ends_with("b.json")
        )));
    }

    #[test]
    fn test_walk_single_file_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("only.json");
        fs::write(&file, "{}").unwrap();

        let walker = FileWalker::new(&[file.clone()], &["**/*.json".to_string()], &[]).unwrap();
        let files: Vec<PathBuf> = walker.walk().filter_map(Result::ok).collect();
        assert_eq!(files, vec![file]);
    }
}
