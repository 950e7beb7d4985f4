use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Parent context partitioning a sibling set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Categories of one restaurant.
    Restaurant(Uuid),
    /// Dishes of one category.
    Category(Uuid),
    /// Every dish of one restaurant, across its categories. Read-only view.
    Menu(Uuid),
}

/// One async lock per scope. Mutations that read the live sibling set before
/// writing (create, reorder, move) hold it so two of them never interleave on
/// the same set.
#[derive(Clone, Default)]
pub struct ScopeLocks {
    inner: Arc<Mutex<HashMap<Scope, Arc<AsyncMutex<()>>>>>,
}

impl ScopeLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, scope: Scope) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // drop locks nobody is holding or waiting on
            locks.retain(|key, lock| *key == scope || Arc::strong_count(lock) > 1);
            locks.entry(scope).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn tracked(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_scope_is_serialized() {
        let locks = ScopeLocks::new();
        let scope = Scope::Category(Uuid::new_v4());

        let guard = locks.acquire(scope).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.acquire(scope)).await;
        assert!(waiting.is_err(), "second acquire should wait for the first");

        drop(guard);
        let _again = locks.acquire(scope).await;
    }

    #[tokio::test]
    async fn different_scopes_do_not_block_each_other() {
        let locks = ScopeLocks::new();
        let _a = locks.acquire(Scope::Category(Uuid::new_v4())).await;
        let b = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(Scope::Category(Uuid::new_v4())),
        )
        .await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn idle_locks_are_pruned() {
        let locks = ScopeLocks::new();
        for _ in 0..10 {
            let _guard = locks.acquire(Scope::Restaurant(Uuid::new_v4())).await;
        }
        assert_eq!(locks.tracked(), 1);
    }
}
