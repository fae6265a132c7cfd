pub mod geolocation;
pub mod paths;
pub mod session;

pub use geolocation::{FixedPositionWatcher, GpsdWatcher, NoGeolocation};
pub use paths::{config_dir, data_dir, ensure_dirs, session_file};
pub use session::{FileSessionStore, Session};
