//! Login and registration against the backend, and the worker-only route
//! gate.

use std::time::Duration;

use hirehub_common::credentials::{ROLE_KEY, TOKEN_KEY};
use hirehub_common::{ClientStorage, HireHubError, PlatformError, Role};
use hirehub_platform::Session;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("auth request failed: {0}")]
    Http(String),

    #[error("{0}")]
    Rejected(String),

    #[error("unexpected auth response: {0}")]
    InvalidResponse(String),

    #[error("Please login to continue")]
    NotLoggedIn,

    #[error("Access denied. Redirecting to your dashboard.")]
    AccessDenied { role: Option<Role> },

    #[error(transparent)]
    Storage(#[from] PlatformError),
}

impl From<AuthError> for HireHubError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Storage(e) => HireHubError::Platform(e),
            other => HireHubError::Auth(other.to_string()),
        }
    }
}

impl AuthError {
    /// Where a rejected caller should land instead.
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            AuthError::NotLoggedIn => Some("/login"),
            AuthError::AccessDenied { role: Some(role) } => Some(role.dashboard_path()),
            AuthError::AccessDenied { role: None } => Some("/"),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    role: Role,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    phone: &'a str,
    password: &'a str,
    role: Role,
}

/// New account details for [`AuthClient::register`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub role: Role,
}

/// Token response shared by login and registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JwtResponse {
    token: String,
    role: Role,
    #[serde(deserialize_with = "string_or_number")]
    user_id: String,
}

/// The backend sends numeric ids; older builds sent strings.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

/// Client for the backend's `/api/auth` endpoints.
pub struct AuthClient {
    http: reqwest::Client,
    url: String,
}

impl AuthClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Http(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<Session, AuthError> {
        debug!(email = %email, role = %role, "Logging in");
        let request = LoginRequest {
            email,
            password,
            role,
        };
        let session = self.issue_session("login", &request, "Login failed").await?;
        info!(role = %session.role, user_id = %session.user_id, "Login succeeded");
        Ok(session)
    }

    /// Create an account; the backend signs the new user in straight away.
    pub async fn register(&self, registration: &Registration) -> Result<Session, AuthError> {
        debug!(
            email = %registration.email,
            role = %registration.role,
            "Registering"
        );
        let request = RegisterRequest {
            username: &registration.username,
            email: &registration.email,
            phone: &registration.phone,
            password: &registration.password,
            role: registration.role,
        };
        let session = self
            .issue_session("register", &request, "Registration failed")
            .await?;
        info!(role = %session.role, user_id = %session.user_id, "Registration succeeded");
        Ok(session)
    }

    /// POST `body` to `{url}/{endpoint}` and read back a token response.
    /// A non-2xx status becomes the response text, or `fallback` if empty.
    async fn issue_session<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
        fallback: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .http
            .post(format!("{}/{endpoint}", self.url))
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let text = text.chars().take(200).collect::<String>();
            let message = if text.trim().is_empty() {
                format!("{fallback} (HTTP {status})")
            } else {
                text
            };
            return Err(AuthError::Rejected(message));
        }

        let body: JwtResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(Session {
            token: body.token,
            user_id: body.user_id,
            role: body.role,
        })
    }
}

/// Allow only a logged-in worker through.
pub fn require_worker(storage: &dyn ClientStorage) -> Result<(), AuthError> {
    if storage.get(TOKEN_KEY).filter(|t| !t.is_empty()).is_none() {
        return Err(AuthError::NotLoggedIn);
    }
    let role = storage.get(ROLE_KEY).and_then(|r| r.parse::<Role>().ok());
    match role {
        Some(Role::Worker) => Ok(()),
        other => Err(AuthError::AccessDenied { role: other }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    struct MapStorage(HashMap<&'static str, &'static str>);

    impl ClientStorage for MapStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key).map(|v| v.to_string())
        }
    }

    /// Serve one canned response and hand back the request line and body.
    async fn backend(response: String) -> (String, oneshot::Receiver<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/api/auth", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if n == 0 || text.ends_with('}') {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let text = String::from_utf8_lossy(&raw).to_string();
            let request_line = text.lines().next().unwrap_or_default().to_string();
            let body = text
                .split_once("\r\n\r\n")
                .map(|(_, b)| b.to_string())
                .unwrap_or_default();
            let _ = tx.send((request_line, body));
        });
        (url, rx)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[tokio::test]
    async fn login_posts_credentials_and_returns_session() {
        let (url, request) = backend(http_response(
            "200 OK",
            r#"{"token":"jwt-xyz","role":"WORKER","userId":17}"#,
        ))
        .await;
        let client = AuthClient::new(url, Duration::from_secs(5)).unwrap();
        let session = client
            .login("ravi@example.com", "pw", Role::Worker)
            .await
            .unwrap();

        assert_eq!(session.token, "jwt-xyz");
        assert_eq!(session.user_id, "17");
        assert_eq!(session.role, Role::Worker);

        let (request_line, body) = request.await.unwrap();
        assert!(request_line.starts_with("POST /api/auth/login "));
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["email"], "ravi@example.com");
        assert_eq!(body["password"], "pw");
        assert_eq!(body["role"], "WORKER");
    }

    #[tokio::test]
    async fn rejected_login_surfaces_response_text() {
        let (url, _request) = backend(http_response("401 Unauthorized", "Invalid credentials")).await;
        let client = AuthClient::new(url, Duration::from_secs(5)).unwrap();
        let err = client.login("a@b.c", "bad", Role::Worker).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
    }

    fn new_worker() -> Registration {
        Registration {
            username: "ravi".into(),
            email: "ravi@example.com".into(),
            phone: "9820012345".into(),
            password: "pw".into(),
            role: Role::Worker,
        }
    }

    #[tokio::test]
    async fn register_posts_account_and_returns_session() {
        let (url, request) = backend(http_response(
            "200 OK",
            r#"{"token":"jwt-new","role":"WORKER","userId":"31"}"#,
        ))
        .await;
        let client = AuthClient::new(url, Duration::from_secs(5)).unwrap();
        let session = client.register(&new_worker()).await.unwrap();

        assert_eq!(session.token, "jwt-new");
        assert_eq!(session.user_id, "31");
        assert_eq!(session.role, Role::Worker);

        let (request_line, body) = request.await.unwrap();
        assert!(request_line.starts_with("POST /api/auth/register "));
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["username"], "ravi");
        assert_eq!(body["email"], "ravi@example.com");
        assert_eq!(body["phone"], "9820012345");
        assert_eq!(body["password"], "pw");
        assert_eq!(body["role"], "WORKER");
    }

    #[tokio::test]
    async fn rejected_registration_surfaces_response_text() {
        let (url, _request) = backend(http_response("409 Conflict", "Email already registered")).await;
        let client = AuthClient::new(url, Duration::from_secs(5)).unwrap();
        let err = client.register(&new_worker()).await.unwrap_err();
        assert_eq!(err.to_string(), "Email already registered");
    }

    #[tokio::test]
    async fn empty_rejection_falls_back_to_generic_message() {
        let (url, _request) = backend(http_response("500 Internal Server Error", "")).await;
        let client = AuthClient::new(url, Duration::from_secs(5)).unwrap();
        let err = client.register(&new_worker()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Registration failed (HTTP 500 Internal Server Error)"
        );
    }

    #[test]
    fn user_id_accepts_string_or_number() {
        let r: JwtResponse =
            serde_json::from_str(r#"{"token":"t","role":"OWNER","userId":"abc"}"#).unwrap();
        assert_eq!(r.user_id, "abc");
        let r: JwtResponse =
            serde_json::from_str(r#"{"token":"t","role":"ADMIN","userId":5}"#).unwrap();
        assert_eq!(r.user_id, "5");
        assert!(serde_json::from_str::<JwtResponse>(
            r#"{"token":"t","role":"ADMIN","userId":null}"#
        )
        .is_err());
    }

    #[test]
    fn gate_requires_token() {
        let storage = MapStorage(HashMap::from([("role", "WORKER")]));
        let err = require_worker(&storage).unwrap_err();
        assert_eq!(err.to_string(), "Please login to continue");
        assert_eq!(err.redirect_path(), Some("/login"));
    }

    #[test]
    fn gate_redirects_other_roles_to_their_dashboard() {
        let storage = MapStorage(HashMap::from([("token", "t"), ("role", "OWNER")]));
        let err = require_worker(&storage).unwrap_err();
        assert_eq!(err.to_string(), "Access denied. Redirecting to your dashboard.");
        assert_eq!(err.redirect_path(), Some("/owner-dashboard"));
    }

    #[test]
    fn gate_admits_worker() {
        let storage = MapStorage(HashMap::from([("token", "t"), ("role", "worker")]));
        assert!(require_worker(&storage).is_ok());
    }
}
