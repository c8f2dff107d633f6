//! Session types and backend payload validation
//!
//! The hosted auth service's session payload is validated here, at the
//! boundary; malformed responses surface as errors instead of untyped
//! data leaking into the rest of the crate.

use crate::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Email/password credentials for sign-in
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Backend-agnostic session exposed to the rest of the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Left empty here; populated later from stored user preferences
    pub timezone: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Session payload as the hosted auth service returns it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Epoch seconds
    pub expires_at: Option<i64>,
    pub user: Option<RawUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUser {
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: RawUserMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawUserMetadata {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Validate a raw backend payload into a [`Session`].
///
/// Missing access token, user id or email reject the payload; expiry
/// converts from epoch seconds to an instant.
pub fn map_session(raw: RawSession) -> Result<Session> {
    let access_token = raw
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::InvalidSession("missing access token".to_string()))?;

    let user = raw
        .user
        .ok_or_else(|| Error::InvalidSession("missing user object".to_string()))?;
    let user_id = user
        .id
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidSession("missing user id".to_string()))?;
    let email = user
        .email
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::InvalidSession("missing user email".to_string()))?;

    let expires_at = match raw.expires_at {
        Some(secs) => Some(
            Utc.timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| Error::InvalidSession(format!("invalid expiry {}", secs)))?,
        ),
        None => None,
    };

    Ok(Session {
        user_id,
        email,
        display_name: user.user_metadata.display_name,
        avatar_url: user.user_metadata.avatar_url,
        timezone: None,
        access_token,
        refresh_token: raw.refresh_token,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_fixture() -> RawSession {
        serde_json::from_value(serde_json::json!({
            "access_token": "at-123",
            "refresh_token": "rt-456",
            "expires_at": 1772409600,
            "user": {
                "id": "u1",
                "email": "sam@example.com",
                "user_metadata": { "display_name": "Sam" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_map_valid_payload() {
        let session = map_session(raw_fixture()).unwrap();

        assert_eq!(session.user_id, "u1");
        assert_eq!(session.email, "sam@example.com");
        assert_eq!(session.display_name.as_deref(), Some("Sam"));
        assert_eq!(session.access_token, "at-123");
        assert_eq!(session.refresh_token.as_deref(), Some("rt-456"));
        assert_eq!(session.expires_at.unwrap().timestamp(), 1772409600);
        // Timezone comes from preferences later, never from the backend
        assert!(session.timezone.is_none());
    }

    #[test]
    fn test_missing_token_rejected() {
        let mut raw = raw_fixture();
        raw.access_token = None;
        assert!(matches!(map_session(raw), Err(Error::InvalidSession(_))));

        let mut raw = raw_fixture();
        raw.access_token = Some(String::new());
        assert!(matches!(map_session(raw), Err(Error::InvalidSession(_))));
    }

    #[test]
    fn test_missing_user_rejected() {
        let mut raw = raw_fixture();
        raw.user = None;
        assert!(matches!(map_session(raw), Err(Error::InvalidSession(_))));
    }

    #[test]
    fn test_optional_fields_absent() {
        let raw: RawSession = serde_json::from_value(serde_json::json!({
            "access_token": "at-123",
            "user": { "id": "u1", "email": "sam@example.com" }
        }))
        .unwrap();

        let session = map_session(raw).unwrap();
        assert!(session.refresh_token.is_none());
        assert!(session.expires_at.is_none());
        assert!(session.display_name.is_none());
    }
}
