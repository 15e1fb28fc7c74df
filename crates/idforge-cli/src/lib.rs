//! Export orchestration for idforge.
//!
//! Ties the core validator, the card renderer and the PDF packager together
//! behind a [`Session`], with pluggable [`Capture`](idforge_render::Capture)
//! and [`Delivery`] facilities.

pub mod capture;
pub mod delivery;
pub mod error;
pub mod session;
pub mod settings;

pub use capture::SoftwareCapture;
pub use delivery::{Delivery, DirectoryDelivery};
pub use error::{ExportError, SubmitError};
pub use session::{Notice, Session};
pub use settings::Settings;
