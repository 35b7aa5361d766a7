//! Authentication collaborator
//!
//! Name+password sessions for the image board: user records with argon2
//! password hashes, bearer-token sessions, and the [`CurrentViewer`]
//! extractor that hands every handler the caller's identity and permission
//! level. The search surface is public; the viewer only gates which posts
//! are visible. IP-ban enforcement and the login/logout audit trail live in
//! the submodules.

pub mod events;
pub mod ip_ban;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicI64, Ordering};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;

pub use events::{UserEvent, UserEventKind, UserEventLog};
pub use ip_ban::{IpBan, IpBanCategory, IpBanStore};

/// Permission levels, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserLevel {
    #[default]
    Anonymous,
    Member,
    Builder,
    Moderator,
    Admin,
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Argon2 PHC-format hash; never the plaintext.
    pub password_hash: String,
    pub level: UserLevel,
    /// Address of the most recent successful login.
    pub last_ip_addr: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
}

/// Errors from the user store.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a user named {0} already exists")]
    NameTaken(String),
    #[error("failed to hash password: {0}")]
    Hash(String),
}

/// The identity and permission level a request is evaluated under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    /// `None` for anonymous callers.
    pub user_id: Option<i64>,
    pub level: UserLevel,
}

impl Viewer {
    /// The viewer used when no valid session accompanies a request.
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            level: UserLevel::Anonymous,
        }
    }

    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: Some(user.id),
            level: user.level,
        }
    }
}

/// In-process user repository keyed by id with a name index.
///
/// The real account system is an external collaborator; this store covers
/// the server binary and the test suites.
#[derive(Default)]
pub struct UserStore {
    users: DashMap<i64, User>,
    by_name: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            by_name: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Create a user with a freshly hashed password.
    pub fn create(&self, name: &str, password: &str, level: UserLevel) -> Result<User, AuthError> {
        if self.by_name.contains_key(name) {
            return Err(AuthError::NameTaken(name.to_string()));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .to_string();

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User {
            id,
            name: name.to_string(),
            password_hash,
            level,
            last_ip_addr: None,
            created_at: Utc::now(),
        };
        self.users.insert(id, user.clone());
        self.by_name.insert(name.to_string(), id);
        Ok(user)
    }

    pub fn get(&self, id: i64) -> Option<User> {
        self.users.get(&id).map(|u| u.clone())
    }

    pub fn find_by_name(&self, name: &str) -> Option<User> {
        let id = *self.by_name.get(name)?;
        self.get(id)
    }

    /// Verify a name+password pair. Returns the user on success.
    pub fn authenticate(&self, name: &str, password: &str) -> Option<User> {
        let user = self.find_by_name(name)?;
        let parsed = PasswordHash::new(&user.password_hash).ok()?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .ok()?;
        Some(user)
    }

    /// Record the address of a successful login.
    pub fn record_login_ip(&self, id: i64, ip: IpAddr) {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.last_ip_addr = Some(ip);
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Uuid,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// In-memory session store; tokens are opaque UUIDs handed out at login.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, user_id: i64) -> Session {
        let session = Session {
            token: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        };
        self.sessions.insert(session.token, session.clone());
        session
    }

    pub fn get(&self, token: Uuid) -> Option<Session> {
        self.sessions.get(&token).map(|s| s.clone())
    }

    /// Remove and return a session, ending it.
    pub fn destroy(&self, token: Uuid) -> Option<Session> {
        self.sessions.remove(&token).map(|(_, s)| s)
    }
}

/// Extractor resolving the caller's session token to a [`Viewer`].
///
/// Reads `Authorization: Bearer <token>`; a missing or unknown token yields
/// the anonymous viewer rather than a rejection.
pub struct CurrentViewer(pub Viewer);

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(CurrentViewer(viewer_from_headers(&parts.headers, state)))
    }
}

/// Resolve the bearer token in `headers` to a viewer.
pub fn viewer_from_headers(headers: &HeaderMap, state: &AppState) -> Viewer {
    let Some(token) = bearer_token(headers) else {
        return Viewer::anonymous();
    };
    let Some(session) = state.sessions.get(token) else {
        return Viewer::anonymous();
    };
    match state.users.get(session.user_id) {
        Some(user) => Viewer::for_user(&user),
        None => Viewer::anonymous(),
    }
}

/// Parse `Authorization: Bearer <uuid>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// The caller's network address, taken from the first `X-Forwarded-For` hop
/// with a loopback fallback.
pub fn client_ip(headers: &HeaderMap) -> IpAddr {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_authenticate() {
        let store = UserStore::new();
        let user = store.create("alice", "hunter2", UserLevel::Member).unwrap();
        assert_eq!(user.name, "alice");
        assert_ne!(user.password_hash, "hunter2");

        assert!(store.authenticate("alice", "hunter2").is_some());
        assert!(store.authenticate("alice", "wrong").is_none());
        assert!(store.authenticate("nobody", "hunter2").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let store = UserStore::new();
        store.create("alice", "a", UserLevel::Member).unwrap();
        assert!(matches!(
            store.create("alice", "b", UserLevel::Member),
            Err(AuthError::NameTaken(_))
        ));
    }

    #[test]
    fn test_session_lifecycle() {
        let sessions = SessionStore::new();
        let session = sessions.create(7);
        assert_eq!(sessions.get(session.token).unwrap().user_id, 7);
        assert_eq!(sessions.destroy(session.token).unwrap().user_id, 7);
        assert!(sessions.get(session.token).is_none());
    }

    #[test]
    fn test_level_ordering() {
        assert!(UserLevel::Anonymous < UserLevel::Member);
        assert!(UserLevel::Member < UserLevel::Moderator);
        assert!(UserLevel::Moderator < UserLevel::Admin);
    }

    #[test]
    fn test_client_ip_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), IpAddr::V4(Ipv4Addr::LOCALHOST));

        headers.insert("x-forwarded-for", "1.2.3.4".parse().unwrap());
        assert_eq!(client_ip(&headers), "1.2.3.4".parse::<IpAddr>().unwrap());

        headers.insert("x-forwarded-for", "5.6.7.8, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "5.6.7.8".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        let token = Uuid::new_v4();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        assert_eq!(bearer_token(&headers), Some(token));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }
}
