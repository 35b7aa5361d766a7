//! IP ban records and enforcement bookkeeping
//!
//! A **full** ban rejects authentication outright and records the hit
//! (counter + timestamp). A **partial** ban still allows login and mutates
//! nothing here; its effects are rate limits applied elsewhere. Soft-deleted
//! bans are ignored entirely.

use std::net::IpAddr;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// How hard the ban bites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpBanCategory {
    /// Blocks authentication (403).
    Full,
    /// Logged and limited, but login is allowed.
    Partial,
}

/// A ban record keyed by network address.
#[derive(Debug, Clone)]
pub struct IpBan {
    pub id: i64,
    pub ip_addr: IpAddr,
    pub category: IpBanCategory,
    pub reason: String,
    /// Soft-delete flag; deleted bans behave as if absent.
    pub is_deleted: bool,
    /// Number of blocked login attempts.
    pub hit_count: u64,
    /// When the ban last blocked a login.
    pub last_hit_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// In-memory ban table.
#[derive(Default)]
pub struct IpBanStore {
    bans: DashMap<i64, IpBan>,
    next_id: AtomicI64,
}

impl IpBanStore {
    pub fn new() -> Self {
        Self {
            bans: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn create(&self, ip_addr: IpAddr, category: IpBanCategory, reason: &str) -> IpBan {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let ban = IpBan {
            id,
            ip_addr,
            category,
            reason: reason.to_string(),
            is_deleted: false,
            hit_count: 0,
            last_hit_at: None,
            created_at: Utc::now(),
        };
        self.bans.insert(id, ban.clone());
        ban
    }

    pub fn get(&self, id: i64) -> Option<IpBan> {
        self.bans.get(&id).map(|b| b.clone())
    }

    /// The live (not soft-deleted) ban covering `ip`, if any.
    pub fn find_active(&self, ip: IpAddr) -> Option<IpBan> {
        self.bans
            .iter()
            .find(|entry| !entry.is_deleted && entry.ip_addr == ip)
            .map(|entry| entry.clone())
    }

    /// Record a blocked login attempt against this ban.
    pub fn record_hit(&self, id: i64) {
        if let Some(mut ban) = self.bans.get_mut(&id) {
            ban.hit_count += 1;
            ban.last_hit_at = Some(Utc::now());
            tracing::info!(
                ban_id = id,
                ip = %ban.ip_addr,
                hit_count = ban.hit_count,
                "blocked login from banned address"
            );
        }
    }

    /// Soft-delete a ban; it stops matching but keeps its history.
    pub fn soft_delete(&self, id: i64) {
        if let Some(mut ban) = self.bans.get_mut(&id) {
            ban.is_deleted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_find_active() {
        let store = IpBanStore::new();
        store.create(ip("1.2.3.4"), IpBanCategory::Full, "spam");

        assert!(store.find_active(ip("1.2.3.4")).is_some());
        assert!(store.find_active(ip("4.3.2.1")).is_none());
    }

    #[test]
    fn test_soft_deleted_bans_ignored() {
        let store = IpBanStore::new();
        let ban = store.create(ip("1.2.3.4"), IpBanCategory::Full, "spam");
        store.soft_delete(ban.id);

        assert!(store.find_active(ip("1.2.3.4")).is_none());
        // The record itself survives
        assert!(store.get(ban.id).unwrap().is_deleted);
    }

    #[test]
    fn test_record_hit() {
        let store = IpBanStore::new();
        let ban = store.create(ip("1.2.3.4"), IpBanCategory::Full, "spam");
        assert_eq!(ban.hit_count, 0);
        assert!(ban.last_hit_at.is_none());

        store.record_hit(ban.id);
        store.record_hit(ban.id);

        let ban = store.get(ban.id).unwrap();
        assert_eq!(ban.hit_count, 2);
        assert!(ban.last_hit_at.is_some());
    }
}
