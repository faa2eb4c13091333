use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::catalog::DEFAULT_EXTENSIONS;
use crate::session::Mode;
use crate::sizing::SizingPolicy;

pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;

/// Optional YAML settings. Every key has a default, so an empty file is valid.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Supported image extensions, compared case-insensitively.
    #[serde(default = "Settings::default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub sizing: SizingPolicy,
    /// Random photos to try before a decode failure is shown to the user.
    #[serde(default = "Settings::default_decode_attempts")]
    pub decode_attempts: usize,
    /// Screen size assumed when the monitor cannot be queried.
    #[serde(default = "Settings::default_fallback_screen")]
    pub fallback_screen: [u32; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
            sizing: SizingPolicy::default(),
            decode_attempts: Self::default_decode_attempts(),
            fallback_screen: Self::default_fallback_screen(),
        }
    }
}

impl Settings {
    fn default_extensions() -> Vec<String> {
        DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect()
    }

    fn default_decode_attempts() -> usize {
        5
    }

    fn default_fallback_screen() -> [u32; 2] {
        [1280, 800]
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::from_yaml_str(&data)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document for a struct; treat it as all defaults
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Normalize extensions (lowercase, no leading dot) and check value ranges.
    pub fn validated(mut self) -> Result<Self> {
        self.extensions = self
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        ensure!(!self.extensions.is_empty(), "extensions must list at least one file type");
        ensure!(self.decode_attempts > 0, "decode-attempts must be positive");
        ensure!(
            self.fallback_screen[0] > 0 && self.fallback_screen[1] > 0,
            "fallback-screen dimensions must be positive"
        );
        if let SizingPolicy::FixedBox {
            max_width,
            max_height,
        } = self.sizing
        {
            ensure!(
                max_width > 0 && max_height > 0,
                "fixed-box sizing needs positive max-width and max-height"
            );
        }
        Ok(self)
    }
}

/// What to drill on, resolved from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOptions {
    pub mode: Mode,
    pub scale_factor: f64,
    pub folder: PathBuf,
}

impl LaunchOptions {
    /// Apply defaults to the classified positionals: scale 1.0 and the
    /// current working directory.
    pub fn resolve(quiz: bool, positionals: &[String]) -> Result<Self> {
        let (scale_factor, folder) = classify_positionals(positionals);
        let folder = match folder {
            Some(folder) => folder,
            None => std::env::current_dir().context("failed to determine the current directory")?,
        };
        Ok(Self {
            mode: if quiz { Mode::Quiz } else { Mode::Flashcard },
            scale_factor: scale_factor.unwrap_or(DEFAULT_SCALE_FACTOR),
            folder,
        })
    }
}

/// Split free arguments into an optional scale factor and photo folder.
///
/// The first argument that parses as a finite positive number is the scale
/// factor; the first one that does not is the folder. Later arguments of an
/// already filled kind are ignored.
#[must_use]
pub fn classify_positionals(args: &[String]) -> (Option<f64>, Option<PathBuf>) {
    let mut scale = None;
    let mut folder = None;
    for arg in args {
        match parse_scale(arg) {
            Some(value) if scale.is_none() => scale = Some(value),
            None if folder.is_none() => folder = Some(PathBuf::from(arg)),
            _ => {}
        }
    }
    (scale, folder)
}

fn parse_scale(arg: &str) -> Option<f64> {
    arg.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
