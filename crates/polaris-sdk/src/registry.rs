//! Active subscription registry
//!
//! One entry per running subscription group, keyed by the id handed back
//! to the caller. The registry is the single source of truth for which
//! groups exist: insertion happens before any consumer task spawns, and
//! removal is idempotent because a stop request and the group's
//! supervisor both clean up.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use polaris_types::{PolarisError, PolarisResult, SubscriptionView};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A running subscription group: endpoints, lifetime, and cancel handle
///
/// Clones share the cancellation token, so cancelling any clone stops the
/// whole group.
#[derive(Debug, Clone)]
pub struct SubscriptionGroup {
    pub id: Uuid,
    pub web_socket_urls: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub cancel: CancellationToken,
}

impl SubscriptionGroup {
    /// Caller-facing view without the cancel handle
    pub fn view(&self) -> SubscriptionView {
        SubscriptionView {
            id: self.id,
            web_socket_urls: self.web_socket_urls.clone(),
            started_at: self.started_at,
            expires_at: self.expires_at,
        }
    }
}

/// Concurrent map of active subscription groups
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    groups: DashMap<Uuid, SubscriptionGroup>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a group; returns `false` when the id is already present
    pub fn try_add(&self, group: SubscriptionGroup) -> bool {
        match self.groups.entry(group.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(group);
                true
            }
        }
    }

    /// Look up a group by id
    pub fn get(&self, id: Uuid) -> PolarisResult<SubscriptionGroup> {
        self.groups
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(PolarisError::SubscriptionNotFound { id })
    }

    /// All groups, in no particular order
    pub fn get_all(&self) -> Vec<SubscriptionGroup> {
        self.groups.iter().map(|entry| entry.clone()).collect()
    }

    /// Caller-facing views of all groups
    pub fn views(&self) -> Vec<SubscriptionView> {
        self.groups.iter().map(|entry| entry.view()).collect()
    }

    /// Remove a group; `true` when an entry existed
    pub fn remove(&self, id: Uuid) -> bool {
        self.groups.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: Uuid) -> SubscriptionGroup {
        SubscriptionGroup {
            id,
            web_socket_urls: vec!["wss://stream.test/abc".into()],
            started_at: Utc::now(),
            expires_at: None,
            cancel: CancellationToken::new(),
        }
    }

    #[test]
    fn test_try_add_rejects_duplicate_id() {
        let registry = SubscriptionRegistry::new();
        let id = Uuid::new_v4();

        let mut first = group(id);
        first.web_socket_urls = vec!["wss://stream.test/original".into()];
        assert!(registry.try_add(first));
        assert!(!registry.try_add(group(id)));

        // The original entry is untouched
        let kept = registry.get(id).unwrap();
        assert_eq!(kept.web_socket_urls, vec!["wss://stream.test/original"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_unknown_id_is_not_found() {
        let registry = SubscriptionRegistry::new();
        let id = Uuid::new_v4();
        match registry.get(id) {
            Err(PolarisError::SubscriptionNotFound { id: missing }) => assert_eq!(missing, id),
            other => panic!("expected SubscriptionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let id = Uuid::new_v4();
        registry.try_add(group(id));

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clones_share_the_cancel_handle() {
        let registry = SubscriptionRegistry::new();
        let id = Uuid::new_v4();
        registry.try_add(group(id));

        let fetched = registry.get(id).unwrap();
        fetched.cancel.cancel();
        assert!(registry.get(id).unwrap().cancel.is_cancelled());
    }

    #[test]
    fn test_views_carry_group_fields() {
        let registry = SubscriptionRegistry::new();
        let id = Uuid::new_v4();
        registry.try_add(group(id));

        let views = registry.views();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, id);
        assert_eq!(views[0].web_socket_urls, vec!["wss://stream.test/abc"]);
        assert!(views[0].expires_at.is_none());
    }
}
