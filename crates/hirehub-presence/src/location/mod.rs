//! Continuous location reporting while the worker is available.

mod reporter;
mod types;
mod uploader;

pub use reporter::LocationReporter;
pub use types::{LocationStatus, ReporterSettings};
pub use uploader::{HttpLocationUploader, LocationUpdate, LocationUploader};
