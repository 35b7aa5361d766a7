//! Login audit trail
//!
//! Every authentication outcome appends an event: successful logins, failed
//! attempts, and logouts. The log is append-only and in-memory; a production
//! deployment would drain it into durable storage.

use std::net::IpAddr;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserEventKind {
    Login,
    FailedLogin,
    Logout,
}

/// One audit entry.
#[derive(Debug, Clone, Serialize)]
pub struct UserEvent {
    /// `None` for failed logins against unknown names.
    pub user_id: Option<i64>,
    /// The name the caller presented.
    pub name: String,
    pub ip: IpAddr,
    pub kind: UserEventKind,
    pub created_at: DateTime<Utc>,
}

/// Append-only event log.
#[derive(Default)]
pub struct UserEventLog {
    events: RwLock<Vec<UserEvent>>,
}

impl UserEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user_id: Option<i64>, name: &str, ip: IpAddr, kind: UserEventKind) {
        tracing::info!(user = name, ip = %ip, kind = ?kind, "user event");
        let event = UserEvent {
            user_id,
            name: name.to_string(),
            ip,
            kind,
            created_at: Utc::now(),
        };
        if let Ok(mut events) = self.events.write() {
            events.push(event);
        }
    }

    /// Whether an event of `kind` exists for the given user.
    pub fn exists(&self, user_id: i64, kind: UserEventKind) -> bool {
        self.events
            .read()
            .map(|events| {
                events
                    .iter()
                    .any(|e| e.user_id == Some(user_id) && e.kind == kind)
            })
            .unwrap_or(false)
    }

    /// Snapshot of all events, oldest first.
    pub fn all(&self) -> Vec<UserEvent> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip() -> IpAddr {
        "127.0.0.1".parse().unwrap()
    }

    #[test]
    fn test_record_and_query() {
        let log = UserEventLog::new();
        log.record(Some(1), "alice", ip(), UserEventKind::Login);
        log.record(None, "ghost", ip(), UserEventKind::FailedLogin);

        assert!(log.exists(1, UserEventKind::Login));
        assert!(!log.exists(1, UserEventKind::Logout));
        assert_eq!(log.all().len(), 2);
    }

    #[test]
    fn test_failed_login_for_unknown_name_has_no_user() {
        let log = UserEventLog::new();
        log.record(None, "dne", ip(), UserEventKind::FailedLogin);
        let events = log.all();
        assert_eq!(events[0].user_id, None);
        assert_eq!(events[0].kind, UserEventKind::FailedLogin);
    }
}
