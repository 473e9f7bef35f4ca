//! In-memory mock store
//!
//! Holds instances in memory, records every call, and supports per-operation
//! failure injection for exercising error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use holiday_model::{ConfigurationInstance, InstanceSummary};

use super::{ConfigStore, StoreError};

/// Store operation, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    ListAll,
    Fetch,
    Persist,
}

/// Failure to inject for one operation
#[derive(Debug, Clone)]
pub struct FailureConfig {
    /// Reason reported by the store
    pub reason: String,
    /// Only fail for this instance id (None = every instance)
    pub instance_id: Option<String>,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Fail every call with `reason`
    pub fn error(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            instance_id: None,
            fail_count: None,
        }
    }

    /// Restrict the failure to one instance id
    pub fn for_instance(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Per-operation failure injection
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<StoreOp, FailureConfig>,
    hits: HashMap<StoreOp, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, op: StoreOp, config: FailureConfig) {
        self.configs.insert(op, config);
        self.hits.insert(op, 0);
    }

    pub fn clear(&mut self) {
        self.configs.clear();
        self.hits.clear();
    }

    /// Reason to fail this call, if any
    pub fn check(&mut self, op: StoreOp, instance_id: Option<&str>) -> Option<String> {
        let config = self.configs.get(&op)?;
        if let (Some(wanted), Some(actual)) = (&config.instance_id, instance_id) {
            if wanted != actual {
                return None;
            }
        }

        let hits = self.hits.entry(op).or_insert(0);
        *hits += 1;
        match config.fail_count {
            Some(limit) if *hits > limit => None,
            _ => Some(config.reason.clone()),
        }
    }
}

/// Calls made against a [`MockStore`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallLog {
    pub list_all: usize,
    pub fetched: Vec<String>,
    /// Every persist call, including rejected ones
    pub persist_attempts: usize,
    /// Ids whose persist succeeded
    pub persisted: Vec<String>,
}

/// In-memory store for tests and simulations
#[derive(Debug, Default)]
pub struct MockStore {
    instances: Mutex<BTreeMap<String, ConfigurationInstance>>,
    failures: Mutex<FailureInjector>,
    calls: Mutex<CallLog>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with instances
    pub fn with_instances(instances: impl IntoIterator<Item = ConfigurationInstance>) -> Self {
        let store = Self::new();
        for instance in instances {
            store.insert(instance);
        }
        store
    }

    /// Insert or replace an instance without recording a call
    pub fn insert(&self, instance: ConfigurationInstance) {
        lock(&self.instances).insert(instance.id.clone(), instance);
    }

    /// Current stored copy of an instance, bypassing the call log
    pub fn get(&self, id: &str) -> Option<ConfigurationInstance> {
        lock(&self.instances).get(id).cloned()
    }

    pub fn inject_failure(&self, op: StoreOp, config: FailureConfig) {
        lock(&self.failures).inject(op, config);
    }

    pub fn clear_failures(&self) {
        lock(&self.failures).clear();
    }

    pub fn calls(&self) -> CallLog {
        lock(&self.calls).clone()
    }

    /// Number of times persist was called, successful or not
    pub fn persist_count(&self) -> usize {
        lock(&self.calls).persist_attempts
    }
}

impl ConfigStore for MockStore {
    fn list_all(&self) -> Result<Vec<InstanceSummary>, StoreError> {
        lock(&self.calls).list_all += 1;
        if let Some(reason) = lock(&self.failures).check(StoreOp::ListAll, None) {
            return Err(StoreError::Unavailable(reason));
        }

        let mut summaries: Vec<_> = lock(&self.instances).values().map(|i| i.summary()).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(summaries)
    }

    fn fetch(&self, id: &str) -> Result<ConfigurationInstance, StoreError> {
        lock(&self.calls).fetched.push(id.to_string());
        if let Some(reason) = lock(&self.failures).check(StoreOp::Fetch, Some(id)) {
            return Err(StoreError::Unavailable(reason));
        }

        self.get(id).ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn persist(&self, instance: &ConfigurationInstance) -> Result<(), StoreError> {
        lock(&self.calls).persist_attempts += 1;
        if let Some(reason) = lock(&self.failures).check(StoreOp::Persist, Some(&instance.id)) {
            return Err(StoreError::Rejected(reason));
        }

        let mut instances = lock(&self.instances);
        if !instances.contains_key(&instance.id) {
            return Err(StoreError::NotFound(instance.id.clone()));
        }
        instances.insert(instance.id.clone(), instance.clone());
        lock(&self.calls).persisted.push(instance.id.clone());
        Ok(())
    }
}
