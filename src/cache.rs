//! Ordered list views keyed by scope.
//!
//! Views are replaced wholesale: a mutation invalidates the scope and the next
//! read reloads it from the store. Each scope carries a generation counter so a
//! load that started before an invalidation of that scope cannot put its stale
//! result back. Loads of other scopes are unaffected.

use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use lru::LruCache;

use uuid::Uuid;

use crate::{
    models::{Category, Dish},
    scope::Scope,
};

pub const DEFAULT_CAPACITY: usize = 256;

struct ViewState<V> {
    lru: LruCache<Scope, V>,
    generations: HashMap<Scope, u64>,
}

impl<V> ViewState<V> {
    fn generation(&self, scope: &Scope) -> u64 {
        self.generations.get(scope).copied().unwrap_or(0)
    }
}

pub struct ViewCache<V> {
    inner: Arc<Mutex<ViewState<V>>>,
}

impl<V> Clone for ViewCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Ticket handed out before a load; see [`ViewCache::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl<V: Clone> ViewCache<V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(ViewState {
                lru: LruCache::new(capacity),
                generations: HashMap::new(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, ViewState<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, scope: &Scope) -> Option<V> {
        self.state().lru.get(scope).cloned()
    }

    /// Call before reading `scope` from the store.
    pub fn ticket(&self, scope: &Scope) -> LoadTicket {
        LoadTicket(self.state().generation(scope))
    }

    /// Store a loaded view unless `scope` was invalidated since `ticket`.
    /// Returns whether the view was kept.
    pub fn put(&self, ticket: LoadTicket, scope: Scope, view: V) -> bool {
        let mut state = self.state();
        if state.generation(&scope) != ticket.0 {
            return false;
        }
        state.lru.put(scope, view);
        true
    }

    pub fn invalidate(&self, scope: &Scope) {
        let mut state = self.state();
        *state.generations.entry(*scope).or_default() += 1;
        state.lru.pop(scope);
    }

    pub fn len(&self) -> usize {
        self.state().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The cached views the menu services read through.
#[derive(Clone)]
pub struct MenuViews {
    pub categories: ViewCache<Vec<Category>>,
    pub dishes: ViewCache<Vec<Dish>>,
}

impl MenuViews {
    pub fn new(capacity: usize) -> Self {
        Self {
            categories: ViewCache::new(capacity),
            dishes: ViewCache::new(capacity),
        }
    }

    /// Invalidate every dish view that can contain dishes of `category_id`,
    /// a category of `restaurant_id`.
    pub fn invalidate_dishes_of(&self, restaurant_id: Uuid, category_id: Uuid) {
        self.dishes.invalidate(&Scope::Category(category_id));
        self.dishes.invalidate(&Scope::Menu(restaurant_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidation_drops_only_that_scope() {
        let cache: ViewCache<Vec<u32>> = ViewCache::new(8);
        let a = Scope::Category(Uuid::new_v4());
        let b = Scope::Category(Uuid::new_v4());

        assert!(cache.put(cache.ticket(&a), a, vec![1]));
        assert!(cache.put(cache.ticket(&b), b, vec![2]));

        cache.invalidate(&a);
        assert_eq!(cache.get(&a), None);
        assert_eq!(cache.get(&b), Some(vec![2]));
    }

    #[test]
    fn load_racing_an_invalidation_is_discarded() {
        let cache: ViewCache<Vec<u32>> = ViewCache::new(8);
        let scope = Scope::Restaurant(Uuid::new_v4());

        let ticket = cache.ticket(&scope);
        cache.invalidate(&scope);
        assert!(!cache.put(ticket, scope, vec![7]));
        assert!(cache.is_empty());

        let fresh = cache.ticket(&scope);
        assert!(cache.put(fresh, scope, vec![8]));
        assert_eq!(cache.get(&scope), Some(vec![8]));
    }

    #[test]
    fn capacity_is_bounded() {
        let cache: ViewCache<u8> = ViewCache::new(2);
        for n in 0..5 {
            let scope = Scope::Category(Uuid::new_v4());
            cache.put(cache.ticket(&scope), scope, n);
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn zero_capacity_falls_back_to_one() {
        let cache: ViewCache<u8> = ViewCache::new(0);
        let scope = Scope::Menu(Uuid::new_v4());
        cache.put(cache.ticket(&scope), scope, 1);
        assert_eq!(cache.get(&scope), Some(1));
    }

    #[test]
    fn invalidating_one_scope_keeps_loads_of_others() {
        let cache: ViewCache<Vec<u32>> = ViewCache::new(8);
        let loading = Scope::Restaurant(Uuid::new_v4());
        let written = Scope::Restaurant(Uuid::new_v4());

        let ticket = cache.ticket(&loading);
        cache.invalidate(&written);
        assert!(cache.put(ticket, loading, vec![3]));
        assert_eq!(cache.get(&loading), Some(vec![3]));
    }

    #[test]
    fn dish_invalidation_covers_category_and_menu() {
        let views = MenuViews::new(8);
        let restaurant_id = Uuid::new_v4();
        let category_id = Uuid::new_v4();
        let other = Scope::Category(Uuid::new_v4());
        for scope in [
            Scope::Category(category_id),
            Scope::Menu(restaurant_id),
            other,
        ] {
            views.dishes.put(views.dishes.ticket(&scope), scope, Vec::new());
        }

        views.invalidate_dishes_of(restaurant_id, category_id);

        assert_eq!(views.dishes.get(&Scope::Category(category_id)), None);
        assert_eq!(views.dishes.get(&Scope::Menu(restaurant_id)), None);
        assert_eq!(views.dishes.get(&other), Some(Vec::new()));
    }
}
