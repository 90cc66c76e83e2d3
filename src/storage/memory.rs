//! In-process subscription store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::{NewSubscription, SumFilter, Subscription};
use crate::storage::{StorageError, SubscriptionStore};

/// The `(user_id, service_name, start_date)` uniqueness key.
type UniqueKey = (Uuid, String, DateTime<Utc>);

fn unique_key(sub: &Subscription) -> UniqueKey {
    (sub.user_id, sub.service_name.clone(), sub.start_date)
}

/// DashMap-backed store. Data lives as long as the process.
///
/// `keys` owns the uniqueness rule: a key is claimed through `entry()` before
/// the record is written, and always locked before `subscriptions`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    subscriptions: DashMap<Uuid, Subscription>,
    keys: DashMap<UniqueKey, Uuid>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Overwrite the stored record with `subscription`, returning the result
    /// and the key it was stored under before.
    fn write(&self, subscription: Subscription) -> Result<(Subscription, UniqueKey), StorageError> {
        let mut entry = self
            .subscriptions
            .get_mut(&subscription.id)
            .ok_or(StorageError::NotFound)?;

        let stored = entry.value_mut();
        let previous = unique_key(stored);
        stored.service_name = subscription.service_name;
        stored.price = subscription.price;
        stored.user_id = subscription.user_id;
        stored.start_date = subscription.start_date;
        stored.end_date = subscription.end_date;
        stored.updated_at = Utc::now();

        Ok((stored.clone(), previous))
    }
}

fn matches(filter: &SumFilter, sub: &Subscription) -> bool {
    filter.user_id.map_or(true, |user_id| sub.user_id == user_id)
        && filter
            .service_name
            .as_deref()
            .map_or(true, |name| sub.service_name == name)
        && filter.start.contains(Some(sub.start_date))
        && filter.end.contains(sub.end_date)
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn save(&self, new: NewSubscription) -> Result<(Uuid, DateTime<Utc>), StorageError> {
        let now = Utc::now();
        let subscription = Subscription {
            id: Uuid::new_v4(),
            service_name: new.service_name,
            price: new.price,
            user_id: new.user_id,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: now,
            updated_at: now,
        };
        let id = subscription.id;

        match self.keys.entry(unique_key(&subscription)) {
            Entry::Occupied(_) => return Err(StorageError::AlreadyExists),
            Entry::Vacant(slot) => {
                self.subscriptions.insert(id, subscription);
                slot.insert(id);
            }
        }

        Ok((id, now))
    }

    async fn get(&self, id: Uuid) -> Result<Subscription, StorageError> {
        self.subscriptions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(StorageError::NotFound)
    }

    async fn update(&self, subscription: Subscription) -> Result<Subscription, StorageError> {
        let id = subscription.id;
        if !self.subscriptions.contains_key(&id) {
            return Err(StorageError::NotFound);
        }

        match self.keys.entry(unique_key(&subscription)) {
            Entry::Occupied(owner) if *owner.get() != id => Err(StorageError::AlreadyExists),
            // Key unchanged; holding the entry keeps it claimed while writing.
            Entry::Occupied(_owner) => self.write(subscription).map(|(updated, _)| updated),
            Entry::Vacant(slot) => {
                let (updated, previous) = self.write(subscription)?;
                slot.insert(id);
                self.keys.remove_if(&previous, |_, owner| *owner == id);
                Ok(updated)
            }
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let (_, removed) = self
            .subscriptions
            .remove(&id)
            .ok_or(StorageError::NotFound)?;
        self.keys.remove_if(&unique_key(&removed), |_, owner| *owner == id);
        Ok(())
    }

    async fn sum(&self, filter: &SumFilter) -> Result<i64, StorageError> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|entry| matches(filter, entry.value()))
            .map(|entry| entry.value().price)
            .sum())
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::month::month_start;
    use crate::domain::DateWindow;

    fn new_sub(user_id: Uuid, name: &str, price: i64, start: (i32, u32)) -> NewSubscription {
        NewSubscription {
            service_name: name.to_string(),
            price,
            user_id,
            start_date: month_start(start.0, start.1).unwrap(),
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_save_get_delete() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let (id, _) = store.save(new_sub(user, "Netflix", 500, (2024, 1))).await.unwrap();
        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.price, 500);
        assert_eq!(fetched.user_id, user);

        store.delete(id).await.unwrap();
        assert!(matches!(store.get(id).await, Err(StorageError::NotFound)));
        assert!(matches!(store.delete(id).await, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_duplicate_is_rejected() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store.save(new_sub(user, "Netflix", 500, (2024, 1))).await.unwrap();
        let dup = store.save(new_sub(user, "Netflix", 900, (2024, 1))).await;
        assert!(matches!(dup, Err(StorageError::AlreadyExists)));

        // Different start month is a different subscription.
        store.save(new_sub(user, "Netflix", 500, (2024, 2))).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_and_conflicting() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let (a, _) = store.save(new_sub(user, "Netflix", 500, (2024, 1))).await.unwrap();
        let (b, _) = store.save(new_sub(user, "Spotify", 200, (2024, 1))).await.unwrap();

        let mut moved = store.get(b).await.unwrap();
        moved.service_name = "Netflix".into();
        assert!(matches!(store.update(moved).await, Err(StorageError::AlreadyExists)));

        // Updating a record onto its own key is fine.
        let mut same = store.get(a).await.unwrap();
        same.price = 650;
        assert_eq!(store.update(same).await.unwrap().price, 650);

        // A missing id is reported as missing even when its key is taken.
        let mut ghost = store.get(a).await.unwrap();
        ghost.id = Uuid::new_v4();
        assert!(matches!(store.update(ghost).await, Err(StorageError::NotFound)));
    }

    #[tokio::test]
    async fn test_key_change_releases_old_key() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        let (id, _) = store.save(new_sub(user, "Netflix", 500, (2024, 1))).await.unwrap();
        let mut moved = store.get(id).await.unwrap();
        moved.start_date = month_start(2024, 2).unwrap();
        store.update(moved).await.unwrap();

        store.save(new_sub(user, "Netflix", 500, (2024, 1))).await.unwrap();
        let dup = store.save(new_sub(user, "Netflix", 500, (2024, 2))).await;
        assert!(matches!(dup, Err(StorageError::AlreadyExists)));

        store.delete(id).await.unwrap();
        store.save(new_sub(user, "Netflix", 500, (2024, 2))).await.unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_admit_one() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();

        for _ in 0..50 {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let store = store.clone();
                    tokio::spawn(async move {
                        store.save(new_sub(user, "Netflix", 500, (2024, 1))).await
                    })
                })
                .collect();

            let mut saved = Vec::new();
            for handle in handles {
                if let Ok((id, _)) = handle.await.unwrap() {
                    saved.push(id);
                }
            }
            assert_eq!(saved.len(), 1);

            store.delete(saved[0]).await.unwrap();
            assert!(store.is_empty());
        }
    }

    #[tokio::test]
    async fn test_sum_applies_every_predicate() {
        let store = MemoryStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.save(new_sub(alice, "Netflix", 500, (2024, 1))).await.unwrap();
        store.save(new_sub(alice, "Spotify", 200, (2024, 3))).await.unwrap();
        store.save(new_sub(alice, "Netflix", 500, (2024, 9))).await.unwrap();
        store.save(new_sub(bob, "Netflix", 700, (2024, 2))).await.unwrap();

        assert_eq!(store.sum(&SumFilter::default()).await.unwrap(), 1900);

        let by_user = SumFilter {
            user_id: Some(alice),
            ..Default::default()
        };
        assert_eq!(store.sum(&by_user).await.unwrap(), 1200);

        let windowed = SumFilter {
            user_id: Some(alice),
            start: DateWindow::new(month_start(2024, 1), month_start(2024, 6)),
            ..Default::default()
        };
        assert_eq!(store.sum(&windowed).await.unwrap(), 700);

        let by_name = SumFilter {
            service_name: Some("Netflix".into()),
            start: DateWindow::new(month_start(2024, 2), month_start(2024, 12)),
            ..Default::default()
        };
        assert_eq!(store.sum(&by_name).await.unwrap(), 1200);
    }

    #[tokio::test]
    async fn test_end_window_skips_open_subscriptions() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store.save(new_sub(user, "Open", 100, (2024, 1))).await.unwrap();
        let mut ended = new_sub(user, "Ended", 300, (2024, 1));
        ended.end_date = month_start(2024, 4);
        store.save(ended).await.unwrap();

        let filter = SumFilter {
            end: DateWindow::new(month_start(2024, 1), month_start(2024, 6)),
            ..Default::default()
        };
        assert_eq!(store.sum(&filter).await.unwrap(), 300);
    }

    #[tokio::test]
    async fn test_sum_of_nothing_is_zero() {
        let store = MemoryStore::new();
        let filter = SumFilter {
            user_id: Some(Uuid::new_v4()),
            ..Default::default()
        };
        assert_eq!(store.sum(&filter).await.unwrap(), 0);
    }
}
