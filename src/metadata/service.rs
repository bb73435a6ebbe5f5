//! The metadata service: routes retrieval, notification and eviction.
//!
//! [`MetadataService`] owns the provider table, the item cache, the dependency
//! registry, the trigger table and the event logger. Every public operation
//! takes a single re-entrant lock, so a provider computing its item may call
//! back into the service on the same thread while other threads wait.
//!
//! # Retrieval
//!
//! `get` for an identifier already being computed further up the call stack
//! returns `Ok(None)` immediately. This is how mutually dependent providers
//! break cycles: the nested caller treats the metadata as temporarily unknown.
//! Otherwise the cache is consulted, then the provider for the identifier's
//! class is invoked and its result cached. A provider returning `None` leaves
//! no stale cache entry behind.
//!
//! # Notification
//!
//! `notify_downstream(upstream)` delivers `notify(upstream, downstream)` for
//! every immediate downstream of `upstream`, then for every downstream of
//! `upstream`'s class identifier not yet notified, and finally hands
//! `upstream` to each additional listener. A provider that is itself a
//! [`MetadataNotificationListener`] decides what to do; otherwise an instance
//! downstream is evicted, recomputed and fanned out further.

use parking_lot::ReentrantMutex;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::{
    CacheStatistics, DependencyRegistry, MetadataCache, MetadataId, MetadataLogger,
    MetadataNotificationListener, MetadataProvider, SharedItem, TimingStatistic, TriggerTable,
};
use crate::config::EngineConfig;
use crate::constants::DEFAULT_CACHE_CAPACITY;
use crate::core::{MetadataError, Result};
use crate::model::JavaType;

/// Snapshot of service counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceStatistics {
    pub cache: CacheStatistics,
    /// Well-formed retrieval requests.
    pub valid_gets: u64,
    /// Retrievals short-circuited because the identifier was being computed.
    pub recursive_gets: u64,
    pub cached_items: usize,
    pub cache_capacity: usize,
    pub providers: usize,
    pub dependencies: usize,
}

impl fmt::Display for ServiceStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Providers:      {}", self.providers)?;
        writeln!(f, "Dependencies:   {}", self.dependencies)?;
        writeln!(f, "Valid gets:     {}", self.valid_gets)?;
        writeln!(f, "Recursive gets: {}", self.recursive_gets)?;
        writeln!(f, "Cached items:   {}/{}", self.cached_items, self.cache_capacity)?;
        write!(f, "Cache:          {}", self.cache)
    }
}

/// What the service knows about one identifier.
#[derive(Debug, Clone)]
pub struct MetadataDescription {
    pub id: MetadataId,
    pub item: Option<SharedItem>,
    pub upstream: BTreeSet<MetadataId>,
    pub downstream: BTreeSet<MetadataId>,
}

impl fmt::Display for MetadataDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.id)?;
        match &self.item {
            Some(item) if item.is_valid() => writeln!(f, "  cached: valid")?,
            Some(_) => writeln!(f, "  cached: invalid")?,
            None => writeln!(f, "  cached: no")?,
        }
        writeln!(f, "  upstream:")?;
        for id in &self.upstream {
            writeln!(f, "    {id}")?;
        }
        writeln!(f, "  downstream:")?;
        for id in &self.downstream {
            writeln!(f, "    {id}")?;
        }
        Ok(())
    }
}

struct ServiceState {
    providers: BTreeMap<MetadataId, Arc<dyn MetadataProvider>>,
    cache: MetadataCache,
    active: HashSet<MetadataId>,
    registry: DependencyRegistry,
    triggers: TriggerTable,
    logger: MetadataLogger,
    valid_gets: u64,
    recursive_gets: u64,
}

/// Orchestrator for providers, the cache and the dependency registry.
pub struct MetadataService {
    state: ReentrantMutex<RefCell<ServiceState>>,
}

impl Default for MetadataService {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataService {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self::with_capacity(capacity)
    }

    fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            state: ReentrantMutex::new(RefCell::new(ServiceState {
                providers: BTreeMap::new(),
                cache: MetadataCache::new(capacity),
                active: HashSet::new(),
                registry: DependencyRegistry::new(),
                triggers: TriggerTable::new(),
                logger: MetadataLogger::new(),
                valid_gets: 0,
                recursive_gets: 0,
            })),
        }
    }

    /// Build a service from engine configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Config`] for a zero capacity or an unknown trace level.
    pub fn with_config(config: &EngineConfig) -> Result<Self> {
        let capacity = non_zero_capacity(config.cache_capacity)?;
        let service = Self::with_capacity(capacity);
        service.set_trace_level(config.trace_level)?;
        Ok(service)
    }

    /// Run `f` against the state. `f` must not call into providers.
    fn with_state<R>(&self, f: impl FnOnce(&mut ServiceState) -> R) -> R {
        let guard = self.state.lock();
        let mut state = guard.borrow_mut();
        f(&mut state)
    }

    fn log(&self, message: impl FnOnce() -> String) {
        self.with_state(|s| {
            if s.logger.trace_level() > 0 {
                s.logger.log(&message());
            }
        });
    }

    // ---- providers ---------------------------------------------------------

    /// Register the provider for its class identifier and run its `on_register` hook.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::DuplicateProvider`] if the class is already
    /// provided, [`MetadataError::InvalidIdentifier`] if `provides_type` is not
    /// a class identifier, or whatever the hook returns (in which case the
    /// provider is unregistered again).
    pub fn register_provider(&self, provider: Arc<dyn MetadataProvider>) -> Result<()> {
        let _guard = self.state.lock();
        let class_id = provider.provides_type();
        class_id.expect_class()?;
        self.with_state(|s| {
            if s.providers.contains_key(&class_id) {
                return Err(MetadataError::DuplicateProvider {
                    class_id: class_id.to_string(),
                });
            }
            s.providers.insert(class_id.clone(), Arc::clone(&provider));
            Ok(())
        })?;
        tracing::debug!("Registered metadata provider for {class_id}");

        if let Err(e) = provider.on_register(self) {
            self.unregister_provider(&class_id);
            return Err(e);
        }
        Ok(())
    }

    /// Remove the provider for a class, evicting every cached item of that class.
    pub fn unregister_provider(&self, class_id: &MetadataId) -> Option<Arc<dyn MetadataProvider>> {
        let _guard = self.state.lock();
        let removed = self.with_state(|s| {
            let removed = s.providers.remove(class_id)?;
            let evicted = s.cache.evict_class(class_id);
            s.triggers.deregister_class(class_id);
            tracing::debug!("Unregistered metadata provider for {class_id} ({evicted} cached items evicted)");
            Some(removed)
        })?;
        if let Some(holder) = removed.as_cache_holder() {
            holder.evict_all();
        }
        Some(removed)
    }

    pub fn provider(&self, class_id: &MetadataId) -> Option<Arc<dyn MetadataProvider>> {
        self.with_state(|s| s.providers.get(class_id).cloned())
    }

    /// Registered providers ordered by class identifier.
    pub fn providers(&self) -> Vec<Arc<dyn MetadataProvider>> {
        self.with_state(|s| s.providers.values().cloned().collect())
    }

    /// Providers exposing the ITD capability, ordered by class identifier.
    pub fn itd_providers(&self) -> Vec<Arc<dyn MetadataProvider>> {
        self.providers()
            .into_iter()
            .filter(|p| p.as_itd_provider().is_some())
            .collect()
    }

    // ---- retrieval ---------------------------------------------------------

    /// Retrieve an item, from the cache when possible.
    ///
    /// # Errors
    ///
    /// Fails if `id` is not an instance identifier, no provider is registered
    /// for its class, or the provider itself fails.
    pub fn get(&self, id: &MetadataId) -> Result<Option<SharedItem>> {
        self.get_with_eviction(id, false)
    }

    /// Evict `id` and its downstream items, then recompute `id`.
    pub fn evict_and_get(&self, id: &MetadataId) -> Result<Option<SharedItem>> {
        self.get_with_eviction(id, true)
    }

    /// Retrieve an item, optionally bypassing and evicting the cached copy first.
    pub fn get_with_eviction(&self, id: &MetadataId, evict_cache: bool) -> Result<Option<SharedItem>> {
        id.expect_instance()?;
        let _guard = self.state.lock();

        let cached = self.with_state(|s| {
            s.valid_gets += 1;
            if s.active.contains(id) {
                s.recursive_gets += 1;
                tracing::trace!("Recursive request for {id} returns nothing");
                return Err(());
            }
            Ok(if evict_cache { None } else { s.cache.get(id) })
        });
        match cached {
            Err(()) => return Ok(None),
            Ok(Some(item)) => return Ok(Some(item)),
            Ok(None) => {}
        }

        let provider = self.provider(&id.class_id()).ok_or_else(|| MetadataError::ProviderNotFound {
            id: id.to_string(),
        })?;

        if evict_cache {
            self.evict(id);
        }

        self.with_state(|s| {
            s.active.insert(id.clone());
            s.logger.start_timer(id.metadata_class());
        });
        let result = provider.get(self, id);
        self.with_state(|s| {
            s.logger.stop_timer();
            s.active.remove(id);
        });

        match result? {
            Some(item) => {
                self.with_state(|s| s.cache.put(id.clone(), Arc::clone(&item)));
                Ok(Some(item))
            }
            None => {
                if !evict_cache {
                    self.evict(id);
                }
                tracing::debug!("Provider returned no metadata for {id}");
                Ok(None)
            }
        }
    }

    /// Prime the cache with an item computed outside [`Self::get`].
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidIdentifier`] if the item's id is not an instance identifier.
    pub fn put(&self, item: SharedItem) -> Result<()> {
        let id = item.id().clone();
        id.expect_instance()?;
        self.with_state(|s| s.cache.put(id, item));
        Ok(())
    }

    /// Item currently cached for `id`, without computing it.
    pub fn cached(&self, id: &MetadataId) -> Option<SharedItem> {
        self.with_state(|s| s.cache.peek(id))
    }

    /// Evict `id` and every instance identifier downstream of it.
    pub fn evict(&self, id: &MetadataId) {
        let _guard = self.state.lock();
        let (evicted, holders) = self.with_state(|s| {
            let mut evicted = vec![id.clone()];
            evicted.extend(
                s.registry
                    .transitive_downstream(id)
                    .into_iter()
                    .filter(MetadataId::is_instance),
            );
            for target in &evicted {
                s.cache.evict(target);
            }
            let holders: Vec<_> = s
                .providers
                .values()
                .filter(|p| p.as_cache_holder().is_some())
                .cloned()
                .collect();
            (evicted, holders)
        });
        tracing::debug!("Evicted {} metadata item(s) starting at {id}", evicted.len());
        for provider in holders {
            if let Some(holder) = provider.as_cache_holder() {
                for target in &evicted {
                    holder.evict(target);
                }
            }
        }
    }

    /// Clear the service cache and every provider-private cache.
    pub fn evict_all(&self) {
        let _guard = self.state.lock();
        let holders: Vec<_> = self.with_state(|s| {
            s.cache.clear();
            s.providers
                .values()
                .filter(|p| p.as_cache_holder().is_some())
                .cloned()
                .collect()
        });
        for provider in holders {
            if let Some(holder) = provider.as_cache_holder() {
                holder.evict_all();
            }
        }
        tracing::debug!("Evicted all cached metadata");
    }

    // ---- notification ------------------------------------------------------

    /// Tell the provider of `downstream` that `upstream` changed.
    ///
    /// A downstream class without a provider is ignored.
    pub fn notify(&self, upstream: &MetadataId, downstream: &MetadataId) -> Result<()> {
        let _guard = self.state.lock();
        let Some(provider) = self.provider(&downstream.class_id()) else {
            tracing::trace!("No provider for {downstream}, ignoring notification from {upstream}");
            return Ok(());
        };
        self.log(|| format!("{upstream} -> {downstream}"));

        if let Some(listener) = provider.as_notification_listener() {
            return listener.notify(self, upstream, Some(downstream));
        }

        if downstream.is_instance() {
            self.evict_and_get(downstream)?;
            self.notify_downstream(downstream)?;
        }
        Ok(())
    }

    /// Notify everything that depends on `upstream`, then the additional listeners.
    pub fn notify_downstream(&self, upstream: &MetadataId) -> Result<()> {
        let _guard = self.state.lock();
        self.with_state(|s| s.logger.start_event());
        let result = self.dispatch_downstream(upstream);
        self.with_state(|s| s.logger.stop_event());
        result
    }

    fn dispatch_downstream(&self, upstream: &MetadataId) -> Result<()> {
        let direct = self.downstream(upstream);
        for downstream in &direct {
            self.notify(upstream, downstream)?;
        }

        if upstream.is_instance() {
            let class_downstream = self.downstream(&upstream.class_id());
            for downstream in class_downstream
                .iter()
                .filter(|d| !direct.contains(*d) && *d != upstream)
            {
                self.notify(upstream, downstream)?;
            }
        }

        let listeners: Vec<Arc<dyn MetadataNotificationListener>> =
            self.with_state(|s| s.registry.listeners().to_vec());
        for listener in listeners {
            listener.notify(self, upstream, None)?;
        }
        Ok(())
    }

    pub fn add_notification_listener(&self, listener: Arc<dyn MetadataNotificationListener>) {
        self.with_state(|s| s.registry.add_listener(listener));
    }

    pub fn remove_notification_listener(&self, listener: &Arc<dyn MetadataNotificationListener>) {
        self.with_state(|s| s.registry.remove_listener(listener));
    }

    // ---- dependencies ------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`MetadataError::InvalidDependency`] if the edge would create a cycle.
    pub fn register_dependency(&self, upstream: &MetadataId, downstream: &MetadataId) -> Result<()> {
        self.with_state(|s| s.registry.register(upstream, downstream))?;
        tracing::trace!("Registered dependency {upstream} -> {downstream}");
        Ok(())
    }

    pub fn deregister_dependency(&self, upstream: &MetadataId, downstream: &MetadataId) {
        self.with_state(|s| s.registry.deregister(upstream, downstream));
    }

    /// Remove every edge whose downstream is `downstream`.
    pub fn deregister_dependencies(&self, downstream: &MetadataId) {
        self.with_state(|s| s.registry.deregister_all(downstream));
    }

    pub fn is_valid_dependency(&self, upstream: &MetadataId, downstream: &MetadataId) -> bool {
        self.with_state(|s| s.registry.is_valid_dependency(upstream, downstream))
    }

    pub fn downstream(&self, upstream: &MetadataId) -> BTreeSet<MetadataId> {
        self.with_state(|s| s.registry.downstream(upstream))
    }

    pub fn upstream(&self, downstream: &MetadataId) -> BTreeSet<MetadataId> {
        self.with_state(|s| s.registry.upstream(downstream))
    }

    /// Render the downstream tree of `root`.
    pub fn dependency_tree(&self, root: &MetadataId) -> String {
        self.with_state(|s| s.registry.to_tree_string(root))
    }

    // ---- triggers ----------------------------------------------------------

    pub fn register_trigger(&self, annotation: JavaType, class_id: &MetadataId) {
        self.with_state(|s| s.triggers.register(annotation, class_id));
    }

    /// Whether a type carrying `annotations` activates the provider for `class_id`.
    pub fn is_triggered<'a>(
        &self,
        class_id: &MetadataId,
        annotations: impl IntoIterator<Item = &'a JavaType>,
    ) -> bool {
        self.with_state(|s| s.triggers.is_triggered(class_id, annotations))
    }

    pub fn triggers(&self) -> TriggerTable {
        self.with_state(|s| s.triggers.clone())
    }

    // ---- diagnostics and tuning --------------------------------------------

    pub fn describe(&self, id: &MetadataId) -> MetadataDescription {
        self.with_state(|s| MetadataDescription {
            id: id.clone(),
            item: s.cache.peek(id),
            upstream: s.registry.upstream(id),
            downstream: s.registry.downstream(id),
        })
    }

    pub fn statistics(&self) -> ServiceStatistics {
        self.with_state(|s| ServiceStatistics {
            cache: s.cache.statistics(),
            valid_gets: s.valid_gets,
            recursive_gets: s.recursive_gets,
            cached_items: s.cache.len(),
            cache_capacity: s.cache.capacity(),
            providers: s.providers.len(),
            dependencies: s.registry.edge_count(),
        })
    }

    pub fn timings(&self) -> Vec<TimingStatistic> {
        self.with_state(|s| s.logger.timings())
    }

    /// # Errors
    ///
    /// Returns [`MetadataError::Config`] for a zero capacity.
    pub fn set_max_capacity(&self, capacity: usize) -> Result<()> {
        let capacity = non_zero_capacity(capacity)?;
        self.with_state(|s| s.cache.resize(capacity));
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MetadataError::Config`] for levels above 2.
    pub fn set_trace_level(&self, level: u8) -> Result<()> {
        self.with_state(|s| s.logger.set_trace_level(level))
    }
}

fn non_zero_capacity(capacity: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(capacity).ok_or_else(|| MetadataError::Config {
        message: "cache_capacity must be greater than zero".to_string(),
    })
}
