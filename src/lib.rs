//! Name-learning drills over a folder of photos named `Family,Given.ext`.
//!
//! The engine (catalog, names, distractors, sizing, session) is UI-free; the
//! [`presenter`] drives it against any [`presenter::Frontend`], and [`ui`]
//! provides the winit window used by the binary.

pub mod catalog;
pub mod config;
pub mod distractors;
pub mod error;
pub mod image_source;
pub mod name;
pub mod presenter;
pub mod session;
pub mod sizing;
pub mod ui;

pub use catalog::{Catalog, PhotoEntry};
pub use error::Error;
pub use name::PersonName;
pub use session::{Mode, Session};
