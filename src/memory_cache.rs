use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::assignment::RoleAssignment;
use crate::cache::Cache;
use crate::role::PermissionGrant;
use crate::types::{RoleId, TenantId, UserId};

/// In-memory cache for grants and assignment rows.
///
/// Two simple LRU sections with optional TTL, intended for tests and
/// single-process deployments. Grants live under (tenant, role) keys;
/// assignment rows under (tenant, user, day) keys.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    grants: Arc<Mutex<Lru<(TenantId, RoleId), Vec<PermissionGrant>>>>,
    assignments: Arc<Mutex<Lru<(TenantId, UserId, NaiveDate), Vec<RoleAssignment>>>>,
    capacity: usize,
    ttl: Option<Duration>,
}

#[derive(Debug)]
struct Lru<K, V> {
    entries: HashMap<K, Entry<V>>,
    order: VecDeque<K>,
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    updated_at: Instant,
}

impl<K: Clone + Eq + Hash, V: Clone> Lru<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    fn get(&mut self, key: &K, ttl: Option<Duration>, now: Instant) -> Option<V> {
        if let Some(ttl) = ttl {
            let expired = self
                .entries
                .get(key)
                .is_some_and(|entry| now.saturating_duration_since(entry.updated_at) > ttl);
            if expired {
                self.remove(key);
                return None;
            }
        }
        let value = self.entries.get(key).map(|entry| entry.value.clone());
        if value.is_some() {
            self.touch(key);
        }
        value
    }

    fn insert(&mut self, key: K, value: V, capacity: usize, now: Instant) {
        self.entries.insert(
            key.clone(),
            Entry {
                value,
                updated_at: now,
            },
        );
        self.touch(&key);
        if capacity == 0 {
            self.entries.clear();
            self.order.clear();
            return;
        }
        while self.entries.len() > capacity {
            if let Some(evicted) = self.order.pop_front() {
                self.entries.remove(&evicted);
            } else {
                break;
            }
        }
    }

    fn remove(&mut self, key: &K) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|existing| existing != key);
        }
    }

    fn retain(&mut self, keep: impl Fn(&K) -> bool) {
        self.entries.retain(|key, _| keep(key));
        self.order.retain(|key| self.entries.contains_key(key));
    }

    fn touch(&mut self, key: &K) {
        self.order.retain(|existing| existing != key);
        self.order.push_back(key.clone());
    }
}

impl MemoryCache {
    /// Creates a new cache; `capacity` bounds each section separately.
    ///
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            grants: Arc::new(Mutex::new(Lru::new())),
            assignments: Arc::new(Mutex::new(Lru::new())),
            capacity,
            ttl: None,
        }
    }

    /// Configures a time-to-live for cache entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get_grants(&self, tenant: &TenantId, role: &RoleId) -> Option<Vec<PermissionGrant>> {
        if self.capacity == 0 {
            return None;
        }
        let key = (tenant.clone(), role.clone());
        let mut guard = self.grants.lock().expect("poisoned lock");
        guard.get(&key, self.ttl, Instant::now())
    }

    async fn set_grants(&self, tenant: &TenantId, role: &RoleId, grants: Vec<PermissionGrant>) {
        if self.capacity == 0 {
            return;
        }
        let key = (tenant.clone(), role.clone());
        let mut guard = self.grants.lock().expect("poisoned lock");
        guard.insert(key, grants, self.capacity, Instant::now());
    }

    async fn get_assignments(
        &self,
        tenant: &TenantId,
        user: &UserId,
        day: NaiveDate,
    ) -> Option<Vec<RoleAssignment>> {
        if self.capacity == 0 {
            return None;
        }
        let key = (tenant.clone(), user.clone(), day);
        let mut guard = self.assignments.lock().expect("poisoned lock");
        guard.get(&key, self.ttl, Instant::now())
    }

    async fn set_assignments(
        &self,
        tenant: &TenantId,
        user: &UserId,
        day: NaiveDate,
        rows: Vec<RoleAssignment>,
    ) {
        if self.capacity == 0 {
            return;
        }
        let key = (tenant.clone(), user.clone(), day);
        let mut guard = self.assignments.lock().expect("poisoned lock");
        guard.insert(key, rows, self.capacity, Instant::now());
    }

    async fn invalidate_user(&self, tenant: &TenantId, user: &UserId) {
        let mut guard = self.assignments.lock().expect("poisoned lock");
        guard.retain(|(entry_tenant, entry_user, _)| {
            entry_tenant != tenant || entry_user != user
        });
    }

    async fn invalidate_role(&self, tenant: &TenantId, role: &RoleId) {
        let mut guard = self.grants.lock().expect("poisoned lock");
        guard.remove(&(tenant.clone(), role.clone()));
    }

    async fn invalidate_tenant(&self, tenant: &TenantId) {
        {
            let mut guard = self.grants.lock().expect("poisoned lock");
            guard.retain(|(entry_tenant, _)| entry_tenant != tenant);
        }
        let mut guard = self.assignments.lock().expect("poisoned lock");
        guard.retain(|(entry_tenant, _, _)| entry_tenant != tenant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::{PermissionCode, Scope};
    use futures::executor::block_on;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tenant() -> TenantId {
        TenantId::try_from("tenant_1").unwrap()
    }

    fn user(value: &str) -> UserId {
        UserId::try_from(value).unwrap()
    }

    fn role(value: &str) -> RoleId {
        RoleId::try_from(value).unwrap()
    }

    fn grants_for(role_id: &RoleId) -> Vec<PermissionGrant> {
        vec![PermissionGrant::new(
            role_id.clone(),
            PermissionCode::try_from("ENROLLMENT_READ").unwrap(),
            Scope::Tenant,
            user("admin_1"),
            date(2025, 1, 1),
        )]
    }

    #[test]
    fn lru_should_evict_least_recently_used_grants() {
        let cache = MemoryCache::new(2);
        let tenant = tenant();
        let role_a = role("role_a");
        let role_b = role("role_b");
        let role_c = role("role_c");

        block_on(cache.set_grants(&tenant, &role_a, grants_for(&role_a)));
        block_on(cache.set_grants(&tenant, &role_b, grants_for(&role_b)));
        let _ = block_on(cache.get_grants(&tenant, &role_a));
        block_on(cache.set_grants(&tenant, &role_c, grants_for(&role_c)));

        assert!(block_on(cache.get_grants(&tenant, &role_b)).is_none());
        assert!(block_on(cache.get_grants(&tenant, &role_a)).is_some());
        assert!(block_on(cache.get_grants(&tenant, &role_c)).is_some());
    }

    #[test]
    fn ttl_should_expire_entries() {
        let cache = MemoryCache::new(4).with_ttl(Duration::from_millis(10));
        let tenant = tenant();
        let role_a = role("role_a");

        block_on(cache.set_grants(&tenant, &role_a, grants_for(&role_a)));
        std::thread::sleep(Duration::from_millis(20));

        assert!(block_on(cache.get_grants(&tenant, &role_a)).is_none());
    }

    #[test]
    fn assignment_entries_are_keyed_per_day() {
        let cache = MemoryCache::new(4);
        let tenant = tenant();
        let user = user("user_7");

        block_on(cache.set_assignments(&tenant, &user, date(2025, 4, 1), Vec::new()));

        assert!(
            block_on(cache.get_assignments(&tenant, &user, date(2025, 4, 1))).is_some()
        );
        assert!(
            block_on(cache.get_assignments(&tenant, &user, date(2025, 4, 2))).is_none()
        );
    }

    #[test]
    fn invalidate_user_should_drop_all_days() {
        let cache = MemoryCache::new(4);
        let tenant = tenant();
        let user_a = user("user_a");
        let user_b = user("user_b");

        block_on(cache.set_assignments(&tenant, &user_a, date(2025, 4, 1), Vec::new()));
        block_on(cache.set_assignments(&tenant, &user_a, date(2025, 4, 2), Vec::new()));
        block_on(cache.set_assignments(&tenant, &user_b, date(2025, 4, 1), Vec::new()));
        block_on(cache.invalidate_user(&tenant, &user_a));

        assert!(
            block_on(cache.get_assignments(&tenant, &user_a, date(2025, 4, 1))).is_none()
        );
        assert!(
            block_on(cache.get_assignments(&tenant, &user_a, date(2025, 4, 2))).is_none()
        );
        assert!(
            block_on(cache.get_assignments(&tenant, &user_b, date(2025, 4, 1))).is_some()
        );
    }

    #[test]
    fn invalidate_tenant_should_clear_both_sections() {
        let cache = MemoryCache::new(4);
        let tenant_a = tenant();
        let tenant_b = TenantId::try_from("tenant_2").unwrap();
        let role_a = role("role_a");
        let user_a = user("user_a");

        block_on(cache.set_grants(&tenant_a, &role_a, grants_for(&role_a)));
        block_on(cache.set_grants(&tenant_b, &role_a, grants_for(&role_a)));
        block_on(cache.set_assignments(&tenant_a, &user_a, date(2025, 4, 1), Vec::new()));
        block_on(cache.invalidate_tenant(&tenant_a));

        assert!(block_on(cache.get_grants(&tenant_a, &role_a)).is_none());
        assert!(
            block_on(cache.get_assignments(&tenant_a, &user_a, date(2025, 4, 1))).is_none()
        );
        assert!(block_on(cache.get_grants(&tenant_b, &role_a)).is_some());
    }
}
