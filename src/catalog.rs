//! Startup scan of the photo folder into a read-only catalog.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::Error;
use crate::name::{self, PersonName};
use crate::session::{Mode, QUIZ_OPTION_COUNT};

/// Extensions accepted when no override is configured (lowercase, without dot).
pub const DEFAULT_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// One usable photo. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoEntry {
    pub path: PathBuf,
    pub raw_filename: String,
    pub name: PersonName,
}

impl PhotoEntry {
    /// Build an entry from a path whose file name passes validation.
    ///
    /// # Errors
    /// Returns [`Error::MalformedFilename`] if the file name does not encode a name.
    pub fn from_path(path: PathBuf) -> Result<Self, Error> {
        let raw_filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = name::parse_filename(&raw_filename)?;
        Ok(Self {
            path,
            raw_filename,
            name,
        })
    }
}

/// The validated photos for one run, plus the set of distinct display names.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<PhotoEntry>,
    distinct_names: Vec<PersonName>,
}

impl Catalog {
    /// Scan `folder` (non-recursive) and keep the photos usable in `mode`.
    ///
    /// Files with unsupported extensions are ignored silently; image files
    /// whose names do not follow `Family,Given.ext` are skipped with a warning.
    ///
    /// # Errors
    /// - [`Error::DirectoryNotFound`] if `folder` is not a readable directory.
    /// - [`Error::InsufficientEntries`] if fewer valid photos remain than `mode` needs.
    /// - [`Error::InsufficientNames`] in quiz mode when fewer than four distinct
    ///   names are available for the options.
    pub fn load(folder: &Path, mode: Mode, exts: &[String]) -> Result<Self, Error> {
        if !folder.is_dir() || fs::read_dir(folder).is_err() {
            return Err(Error::DirectoryNotFound(folder.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable folder entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !is_supported_image(path, exts) {
                debug!(path = %path.display(), "not a supported image; ignored");
                continue;
            }
            match PhotoEntry::from_path(path.to_path_buf()) {
                Ok(photo) => entries.push(photo),
                Err(err) => warn!("{err}"),
            }
        }

        let catalog = Self::from_entries(entries);
        catalog.check_minimum(mode)?;
        info!(
            folder = %folder.display(),
            photos = catalog.len(),
            names = catalog.distinct_names.len(),
            %mode,
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from already validated entries, preserving their order.
    pub fn from_entries(entries: Vec<PhotoEntry>) -> Self {
        let mut seen = HashSet::new();
        let distinct_names = entries
            .iter()
            .filter(|entry| seen.insert(entry.name.display_name()))
            .map(|entry| entry.name.clone())
            .collect();
        Self {
            entries,
            distinct_names,
        }
    }

    /// Ensure the catalog is large enough for `mode`.
    ///
    /// # Errors
    /// See [`Catalog::load`].
    pub fn check_minimum(&self, mode: Mode) -> Result<(), Error> {
        let required = mode.min_entries();
        if self.entries.len() < required {
            return Err(Error::InsufficientEntries {
                mode,
                found: self.entries.len(),
                required,
            });
        }
        if mode == Mode::Quiz && self.distinct_names.len() < QUIZ_OPTION_COUNT {
            return Err(Error::InsufficientNames {
                found: self.distinct_names.len(),
                required: QUIZ_OPTION_COUNT,
            });
        }
        Ok(())
    }

    pub fn entries(&self) -> &[PhotoEntry] {
        &self.entries
    }

    /// Distinct names in order of first appearance, compared by display form.
    pub fn distinct_names(&self) -> &[PersonName] {
        &self.distinct_names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Return `true` if `path` has one of `exts` as its extension (case-insensitive).
/// An empty `exts` falls back to [`DEFAULT_EXTENSIONS`].
pub fn is_supported_image(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            if exts.is_empty() {
                DEFAULT_EXTENSIONS.contains(&ext.as_str())
            } else {
                exts.iter().any(|e| e.eq_ignore_ascii_case(&ext))
            }
        })
}
