//! Decoding of person names from `Family,Given.ext` file names.

use std::fmt;

use crate::error::Error;

/// Separator between the family and given parts of a file stem.
pub const SEPARATOR: char = ',';

/// A person's name as encoded in a photo's file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonName {
    pub given: String,
    pub family: String,
}

impl PersonName {
    pub fn new(given: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            given: given.into(),
            family: family.into(),
        }
    }

    /// Display form, always `"<given> <family>"`.
    pub fn display_name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.given, self.family)
    }
}

/// Split a file name into its name parts.
///
/// The stem is split on the first separator: the part before is the family
/// name, the part after is the given name. Callers are expected to have run
/// [`parse_filename`] first; an unseparated stem decodes as a family name with
/// an empty given name.
#[must_use]
pub fn decode(raw_filename: &str) -> PersonName {
    let stem = stem_of(raw_filename);
    let (family, given) = stem.split_once(SEPARATOR).unwrap_or((stem, ""));
    PersonName::new(given.trim(), family.trim())
}

/// Validate a file name and decode it.
///
/// Both parts are trimmed before the emptiness check, so a part made only of
/// whitespace is rejected: it would show up as a blank name in the drill.
///
/// # Errors
/// Returns [`Error::MalformedFilename`] unless the stem holds exactly one
/// separator with non-empty text on both sides.
pub fn parse_filename(raw_filename: &str) -> Result<PersonName, Error> {
    let stem = stem_of(raw_filename);
    if stem.matches(SEPARATOR).count() != 1 {
        return Err(Error::MalformedFilename(raw_filename.to_string()));
    }
    let name = decode(raw_filename);
    if name.given.is_empty() || name.family.is_empty() {
        return Err(Error::MalformedFilename(raw_filename.to_string()));
    }
    Ok(name)
}

// Everything before the first dot, so `Smith,Anna.2.png` names Anna Smith.
fn stem_of(raw_filename: &str) -> &str {
    raw_filename
        .split_once('.')
        .map_or(raw_filename, |(stem, _)| stem)
}
