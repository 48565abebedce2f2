// Signed-in user and bearer token, passed explicitly to every screen.
// Persisted to a JSON file so the next run can skip the login prompt.

use std::path::Path;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::models::{SessionResponse, User};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Deserialize)]
struct Claims {
    exp: Option<i64>,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Session {
            user,
            token: token.into(),
        }
    }

    pub fn update_user(&mut self, user: User) {
        self.user = user;
    }

    /// True when the token is a JWT whose `exp` lies in the past. Tokens we
    /// cannot decode are left for the backend to judge.
    pub fn is_expired(&self) -> bool {
        match token_expiry(&self.token) {
            Some(exp) => exp <= Utc::now().timestamp(),
            None => false,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let data = serde_json::to_string_pretty(self).map_err(SessionError::Encode)?;
        std::fs::write(path, data).map_err(|source| SessionError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "session saved");
        Ok(())
    }

    /// Load a persisted session. A missing file or an expired token yields
    /// `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Session>, SessionError> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SessionError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let session: Session = serde_json::from_str(&data).map_err(SessionError::Corrupt)?;
        if session.is_expired() {
            info!("stored session expired, signing in again");
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn forget(path: &Path) -> Result<(), SessionError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

impl From<SessionResponse> for Session {
    fn from(resp: SessionResponse) -> Self {
        Session::new(resp.user, resp.token)
    }
}

fn token_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    claims.exp
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            name: "Ana".into(),
            email: "ana@example.com".into(),
            avatar_url: None,
        }
    }

    fn jwt_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"u1","exp":{}}}"#, exp));
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let session = Session::new(user(), jwt_with_exp(Utc::now().timestamp() + 3600));

        session.save(&path).unwrap();

        assert_eq!(Session::load(&path).unwrap(), Some(session));
    }

    #[test]
    fn expired_session_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        Session::new(user(), jwt_with_exp(Utc::now().timestamp() - 60))
            .save(&path)
            .unwrap();

        assert_eq!(Session::load(&path).unwrap(), None);
    }

    #[test]
    fn opaque_token_never_expires_locally() {
        let session = Session::new(user(), "not-a-jwt");
        assert!(!session.is_expired());
    }

    #[test]
    fn missing_file_is_no_session() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Session::load(&dir.path().join("nope.json")).unwrap(), None);
        Session::forget(&dir.path().join("nope.json")).unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(Session::load(&path), Err(SessionError::Corrupt(_))));
    }

    #[test]
    fn encode_failure_is_not_reported_as_corrupt_file() {
        let source = serde_json::from_str::<u8>("x").unwrap_err();
        let message = SessionError::Encode(source).to_string();
        assert!(message.starts_with("could not encode session"));
        assert!(!message.contains("corrupt"));
    }

    #[test]
    fn update_user_replaces_user() {
        let mut session = Session::new(user(), "t");
        let mut renamed = user();
        renamed.name = "Ana Lima".into();
        session.update_user(renamed.clone());
        assert_eq!(session.user, renamed);
    }
}
