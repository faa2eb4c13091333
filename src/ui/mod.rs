//! winit window bound to the presenter through [`crate::presenter::Frontend`].

pub mod draw;
pub mod window;

pub use window::run;
