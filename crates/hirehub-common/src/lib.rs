pub mod credentials;
pub mod errors;
pub mod geo;
pub mod notifications;

pub use credentials::{ClientStorage, CredentialProvider, Role};
pub use errors::{ConfigError, HireHubError, PlatformError};
pub use geo::{
    PositionCallback, PositionError, PositionErrorKind, PositionSample, PositionWatcher,
    WatchId, WatchOptions,
};
pub use notifications::{Navigator, Toast, ToastAction, ToastLevel, ToastQueue, Toaster};

pub type Result<T> = std::result::Result<T, HireHubError>;
