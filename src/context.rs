//! Per-user context storage behind the capability router.
//!
//! Every successful non-chat capability stores its result under a fixed key
//! for the requesting user. The chatbot reads the seven tracked keys back as
//! one composite view, substituting "Not available" for anything the user
//! has not produced yet. The store is a bounded in-memory cache: capacity is
//! enforced by dropping the least recently written user, and an optional TTL
//! expires whole users lazily on access.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::capability::Capability;
use crate::executor::TaskOutput;
use crate::prompts::NOT_AVAILABLE;
use crate::settings::ContextConfig;

/// One user's stored capability results, keyed by context key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserContext {
    results: HashMap<&'static str, TaskOutput>,
}

impl UserContext {
    pub fn get(&self, capability: Capability) -> Option<&TaskOutput> {
        capability.context_key().and_then(|key| self.results.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }
}

/// Storage contract between the capability router and the chatbot.
pub trait ContextStore: Send + Sync {
    /// Snapshot of everything stored for `user_id`. Unknown users get an
    /// empty context.
    fn get(&self, user_id: &str) -> UserContext;

    /// Store a capability result for `user_id`, replacing any previous value
    /// under the same key. `Chat` results are dropped; the chatbot never
    /// writes.
    fn put(&self, user_id: &str, capability: Capability, output: TaskOutput);

    /// Composite chatbot view: the seven tracked context keys mapped to the
    /// stored result's prompt form, or "Not available" when absent.
    fn resolve_context(&self, user_id: &str) -> BTreeMap<&'static str, String>;
}

struct StoredContext {
    context: UserContext,
    last_write: Instant,
}

impl StoredContext {
    fn is_expired(&self, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => self.last_write.elapsed() >= ttl,
            None => false,
        }
    }
}

/// In-memory store keyed by user id.
pub struct InMemoryContextStore {
    entries: DashMap<String, StoredContext>,
    max_users: usize,
    ttl: Option<Duration>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            max_users: 10_000,
            ttl: None,
        }
    }

    pub fn with_max_users(mut self, max_users: usize) -> Self {
        self.max_users = max_users.max(1);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        let store = Self::new().with_max_users(config.max_users);
        match config.ttl_seconds {
            Some(secs) => store.with_ttl(Duration::from_secs(secs)),
            None => store,
        }
    }

    pub fn user_count(&self) -> usize {
        self.entries.len()
    }

    /// Drop the least recently written user to make room for a new one.
    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().last_write)
            .map(|entry| entry.key().clone());

        if let Some(user_id) = oldest {
            self.entries.remove(&user_id);
            debug!(user_id = %user_id, "evicted least recently written user context");
        }
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextStore for InMemoryContextStore {
    fn get(&self, user_id: &str) -> UserContext {
        // The read guard must be gone before any remove on the same shard.
        let snapshot = self
            .entries
            .get(user_id)
            .map(|entry| (!entry.is_expired(self.ttl)).then(|| entry.context.clone()));

        match snapshot {
            Some(Some(context)) => context,
            Some(None) => {
                // Lazy expiry, re-checked under the write lock in case a
                // concurrent put refreshed the entry.
                self.entries
                    .remove_if(user_id, |_, stored| stored.is_expired(self.ttl));
                UserContext::default()
            }
            None => UserContext::default(),
        }
    }

    fn put(&self, user_id: &str, capability: Capability, output: TaskOutput) {
        let Some(key) = capability.context_key() else {
            debug!(%capability, "capability stores no context");
            return;
        };

        // Capacity is approximate under concurrent first writes.
        if !self.entries.contains_key(user_id) && self.entries.len() >= self.max_users {
            self.evict_oldest();
        }

        let mut entry = self
            .entries
            .entry(user_id.to_string())
            .or_insert_with(|| StoredContext {
                context: UserContext::default(),
                last_write: Instant::now(),
            });
        entry.context.results.insert(key, output);
        entry.last_write = Instant::now();
        debug!(user_id = %user_id, key, "stored capability result");
    }

    fn resolve_context(&self, user_id: &str) -> BTreeMap<&'static str, String> {
        let context = self.get(user_id);
        let mut resolved = BTreeMap::new();
        for capability in Capability::CHAT_TRACKED {
            let Some(key) = capability.context_key() else {
                continue;
            };
            let value = context
                .get(capability)
                .map(|output| output.as_prompt_value())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            resolved.insert(key, value);
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn output(text: &str) -> TaskOutput {
        TaskOutput::from_engine_text(text.to_string())
    }

    #[test]
    fn unknown_user_resolves_to_all_not_available() {
        let store = InMemoryContextStore::new();
        let resolved = store.resolve_context("nobody");
        assert_eq!(resolved.len(), 7);
        assert!(resolved.values().all(|v| v == NOT_AVAILABLE));
    }

    #[test]
    fn writes_replace_only_their_own_key() {
        let store = InMemoryContextStore::new();
        store.put("u1", Capability::Plan, output("first plan"));
        store.put("u1", Capability::Budget, output("the budget"));
        store.put("u1", Capability::Plan, output("second plan"));

        let context = store.get("u1");
        assert_eq!(context.len(), 2);
        assert_eq!(context.get(Capability::Plan), Some(&output("second plan")));
        assert_eq!(context.get(Capability::Budget), Some(&output("the budget")));
    }

    #[test]
    fn chat_results_are_never_stored() {
        let store = InMemoryContextStore::new();
        store.put("u1", Capability::Chat, output("hello there"));
        assert!(store.get("u1").is_empty());
    }

    #[test]
    fn place_details_is_stored_but_invisible_to_the_chatbot() {
        let store = InMemoryContextStore::new();
        store.put("u1", Capability::PlaceDetails, output("the Louvre"));

        assert!(store.get("u1").get(Capability::PlaceDetails).is_some());

        let resolved = store.resolve_context("u1");
        assert!(!resolved.contains_key("place_details"));
        assert!(resolved.values().all(|v| v == NOT_AVAILABLE));
    }

    #[test]
    fn users_are_isolated() {
        let store = InMemoryContextStore::new();
        store.put("u1", Capability::Plan, output("u1 plan"));

        assert!(store.get("u2").is_empty());
        let resolved = store.resolve_context("u2");
        assert!(resolved.values().all(|v| v == NOT_AVAILABLE));
    }

    #[test]
    fn structured_results_resolve_to_their_json_form() {
        let store = InMemoryContextStore::new();
        store.put("u1", Capability::Budget, output(r#"{"Total":"$850"}"#));

        let resolved = store.resolve_context("u1");
        assert_eq!(resolved["budget"], r#"{"Total":"$850"}"#);
    }

    #[test]
    fn capacity_evicts_the_least_recently_written_user() {
        let store = InMemoryContextStore::new().with_max_users(2);
        store.put("u1", Capability::Plan, output("p1"));
        std::thread::sleep(Duration::from_millis(5));
        store.put("u2", Capability::Plan, output("p2"));
        std::thread::sleep(Duration::from_millis(5));
        store.put("u1", Capability::Budget, output("b1"));
        std::thread::sleep(Duration::from_millis(5));
        store.put("u3", Capability::Plan, output("p3"));

        assert_eq!(store.user_count(), 2);
        assert!(store.get("u2").is_empty(), "u2 was written least recently");
        assert!(!store.get("u1").is_empty());
        assert!(!store.get("u3").is_empty());
    }

    #[test]
    fn ttl_expires_whole_users() {
        let store = InMemoryContextStore::new().with_ttl(Duration::from_millis(20));
        store.put("u1", Capability::Plan, output("p1"));
        assert!(!store.get("u1").is_empty());

        std::thread::sleep(Duration::from_millis(40));
        assert!(store.get("u1").is_empty());
        let resolved = store.resolve_context("u1");
        assert!(resolved.values().all(|v| v == NOT_AVAILABLE));
    }

    #[test]
    fn concurrent_writes_to_one_user_both_land() {
        let store = Arc::new(InMemoryContextStore::new());

        let writer_a = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    store.put("u1", Capability::Plan, output("the plan"));
                }
            })
        };
        let writer_b = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..100 {
                    store.put("u1", Capability::Budget, output("the budget"));
                }
            })
        };
        writer_a.join().unwrap();
        writer_b.join().unwrap();

        let context = store.get("u1");
        assert!(context.get(Capability::Plan).is_some());
        assert!(context.get(Capability::Budget).is_some());
    }
}
