use hirehub_common::HireHubError;

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("http error: {0}")]
    Http(String),

    #[error("backend rejected request: HTTP {status}")]
    Rejected { status: u16 },
}

impl From<PresenceError> for HireHubError {
    fn from(e: PresenceError) -> Self {
        HireHubError::Presence(e.to_string())
    }
}
