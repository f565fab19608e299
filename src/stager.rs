//! Stage static web assets into the directory PlatformIO packs into the
//! SPIFFS image (`pio run --target buildfs`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::config::StageConfig;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Source directory '{}' not found", .0.display())]
    SourceMissing(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to resolve {}: {source}", .path.display())]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {} -> {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Paths relative to the source root
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

pub fn is_excluded(file_name: &str, excluded_suffixes: &[String]) -> bool {
    excluded_suffixes
        .iter()
        .any(|suffix| file_name.ends_with(suffix.as_str()))
}

fn create_dir(path: &Path) -> Result<(), StageError> {
    fs::create_dir_all(path).map_err(|source| StageError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn is_same_dir(entry: &walkdir::DirEntry, dir: &Path) -> bool {
    entry.file_type().is_dir()
        && fs::canonicalize(entry.path()).map_or(false, |path| path == dir)
}

/// Mirror `config.source` into `config.target`, skipping excluded files.
/// Existing target files are overwritten; extra target files are left alone.
/// A target nested inside the source is skipped by the walk.
pub fn stage(config: &StageConfig) -> Result<StageReport, StageError> {
    let source = &config.source;
    let target = &config.target;

    if !source.is_dir() {
        return Err(StageError::SourceMissing(source.clone()));
    }

    if !target.exists() {
        log::info!("Creating {} directory...", target.display());
    }
    create_dir(target)?;
    // The target may live inside the source; never stage it into itself
    let target_canon = fs::canonicalize(target).map_err(|source| StageError::Resolve {
        path: target.clone(),
        source,
    })?;

    log::info!(
        "Copying static files from {} to {}...",
        source.display(),
        target.display()
    );

    let mut report = StageReport::default();
    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_same_dir(e, &target_canon));

    for entry in walker {
        let entry = entry.map_err(|source_err| StageError::Walk {
            path: source_err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source.clone()),
            source: source_err,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();

        if is_excluded(&name, &config.excluded_suffixes) {
            log::info!("Skipping: {}", entry.path().display());
            report.skipped.push(relative.to_path_buf());
            continue;
        }

        let destination = target.join(relative);
        if let Some(parent) = destination.parent() {
            create_dir(parent)?;
        }
        fs::copy(entry.path(), &destination).map_err(|source| StageError::Copy {
            from: entry.path().to_path_buf(),
            to: destination.clone(),
            source,
        })?;
        log::info!("Copied: {} -> {}", entry.path().display(), destination.display());
        report.copied.push(relative.to_path_buf());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffixes() -> Vec<String> {
        StageConfig::default().excluded_suffixes
    }

    #[test]
    fn test_excluded_suffixes() {
        assert!(is_excluded("driver.cpp", &suffixes()));
        assert!(is_excluded("WebApp.h", &suffixes()));
        assert!(is_excluded("build.sh", &suffixes()));
        assert!(!is_excluded("index.html", &suffixes()));
        assert!(!is_excluded("app.js", &suffixes()));
        // Suffix match on the name, not an extension parse
        assert!(!is_excluded("notes.hpp", &suffixes()));
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = StageConfig {
            source: dir.path().join("src/static"),
            target: dir.path().join("data"),
            ..StageConfig::default()
        };

        let err = stage(&config).unwrap_err();
        assert!(matches!(err, StageError::SourceMissing(_)));
        assert!(!config.target.exists());
    }
}
