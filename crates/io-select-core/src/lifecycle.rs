//! Instance Lifecycle
//!
//! Explicit Uninitialized/Initialized state for one upgraded control, the
//! per-element registry that makes re-initialization replace the previous
//! instance, and the by-name method dispatch used by script callers.

use std::str::FromStr;

use log::warn;

use crate::error::IoSelectError;

/// Methods callable by name on an upgraded control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Destroy,
}

impl FromStr for Method {
    type Err = IoSelectError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "destroy" => Ok(Method::Destroy),
            other => Err(IoSelectError::InvalidMethodCall(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum Lifecycle<T> {
    Uninitialized,
    Initialized(T),
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Lifecycle::Uninitialized
    }
}

impl<T> Lifecycle<T> {
    pub fn is_initialized(&self) -> bool {
        matches!(self, Lifecycle::Initialized(_))
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Lifecycle::Initialized(instance) => Some(instance),
            Lifecycle::Uninitialized => None,
        }
    }

    /// Uninitialized -> Initialized. Fails if already initialized.
    pub fn initialize(&mut self, instance: T) -> Result<(), IoSelectError> {
        if self.is_initialized() {
            return Err(IoSelectError::AlreadyInitialized);
        }
        *self = Lifecycle::Initialized(instance);
        Ok(())
    }

    /// Initialized -> Uninitialized, handing back the torn-down instance
    pub fn teardown(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Lifecycle::Initialized(instance) => Some(instance),
            Lifecycle::Uninitialized => None,
        }
    }

    /// Tear down any prior instance through `destroy`, then initialize with
    /// the instance built by `build`
    pub fn reinitialize<E>(
        &mut self,
        destroy: impl FnOnce(T),
        build: impl FnOnce() -> Result<T, E>,
    ) -> Result<(), E>
    where
        E: From<IoSelectError>,
    {
        if let Some(previous) = self.teardown() {
            destroy(previous);
        }
        let instance = build()?;
        self.initialize(instance)?;
        Ok(())
    }

    /// Dispatch a method by name. Unknown names log and do nothing. Returns
    /// the lifecycle so calls chain.
    pub fn call(&mut self, name: &str, destroy: impl FnOnce(T)) -> &mut Self {
        match name.parse::<Method>() {
            Ok(Method::Destroy) => {
                if let Some(instance) = self.teardown() {
                    destroy(instance);
                }
            }
            Err(err) => warn!("{err}"),
        }
        self
    }
}

/// Lifecycles keyed by the element they belong to. Keys are matched with a
/// predicate because element handles compare by node identity.
#[derive(Debug)]
pub struct Registry<K, T> {
    entries: Vec<(K, Lifecycle<T>)>,
}

impl<K, T> Default for Registry<K, T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<K, T> Registry<K, T> {
    /// Remove the lifecycle for the matching key, or start a fresh one
    pub fn take(&mut self, is_key: impl Fn(&K) -> bool) -> Lifecycle<T> {
        match self.entries.iter().position(|(key, _)| is_key(key)) {
            Some(index) => self.entries.swap_remove(index).1,
            None => Lifecycle::Uninitialized,
        }
    }

    /// Store a lifecycle back under `key`. Uninitialized ones leave no entry.
    pub fn put(&mut self, key: K, lifecycle: Lifecycle<T>) {
        if lifecycle.is_initialized() {
            self.entries.push((key, lifecycle));
        }
    }

    pub fn is_initialized(&self, is_key: impl Fn(&K) -> bool) -> bool {
        self.entries
            .iter()
            .any(|(key, lifecycle)| is_key(key) && lifecycle.is_initialized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_initialize_twice_requires_teardown() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.initialize(1).unwrap();
        assert_eq!(lifecycle.initialize(2), Err(IoSelectError::AlreadyInitialized));
        assert_eq!(lifecycle.teardown(), Some(1));
        assert!(!lifecycle.is_initialized());
        lifecycle.initialize(2).unwrap();
        assert_eq!(lifecycle.get(), Some(&2));
    }

    #[test]
    fn test_reinitialize_destroys_previous() {
        let destroyed = RefCell::new(Vec::new());
        let mut lifecycle = Lifecycle::default();
        lifecycle
            .reinitialize::<IoSelectError>(|old| destroyed.borrow_mut().push(old), || Ok("first"))
            .unwrap();
        lifecycle
            .reinitialize::<IoSelectError>(|old| destroyed.borrow_mut().push(old), || Ok("second"))
            .unwrap();
        assert_eq!(*destroyed.borrow(), vec!["first"]);
        assert_eq!(lifecycle.get(), Some(&"second"));
    }

    #[test]
    fn test_failed_build_leaves_uninitialized() {
        let mut lifecycle = Lifecycle::Initialized(1);
        let result = lifecycle.reinitialize(|_| {}, || Err(IoSelectError::MissingCollaborator("a document")));
        assert!(result.is_err());
        assert!(!lifecycle.is_initialized());
    }

    #[test]
    fn test_call_dispatch() {
        let mut lifecycle = Lifecycle::Initialized(5);
        lifecycle.call("explode", |_| panic!("unknown method must not destroy"));
        assert!(lifecycle.is_initialized());

        let mut destroyed = None;
        lifecycle.call("destroy", |v| destroyed = Some(v));
        assert_eq!(destroyed, Some(5));
        assert!(!lifecycle.is_initialized());

        // destroying an uninitialized instance is a no-op
        lifecycle.call("destroy", |_| panic!("nothing to destroy"));
    }

    #[test]
    fn test_unknown_method_chains_into_destroy() {
        let mut lifecycle = Lifecycle::Initialized("widget");
        let mut destroyed = Vec::new();
        let after = lifecycle
            .call("refresh", |_| panic!("unknown method must not destroy"))
            .call("destroy", |old| destroyed.push(old));
        assert!(!after.is_initialized());
        assert_eq!(destroyed, vec!["widget"]);
    }

    #[test]
    fn test_registry_reinitialize_replaces_instance_for_same_key() {
        let mut registry = Registry::default();
        let mut destroyed = Vec::new();
        for name in ["first", "second"] {
            let mut lifecycle = registry.take(|key| *key == 7);
            lifecycle
                .reinitialize::<IoSelectError>(|old| destroyed.push(old), || Ok(name))
                .unwrap();
            registry.put(7, lifecycle);
        }
        assert_eq!(destroyed, vec!["first"]);
        assert!(registry.is_initialized(|key| *key == 7));
        assert!(!registry.is_initialized(|key| *key == 8));

        let mut other = registry.take(|key| *key == 8);
        other.initialize("third").unwrap();
        registry.put(8, other);

        let mut lifecycle = registry.take(|key| *key == 7);
        assert_eq!(lifecycle.get(), Some(&"second"));
        lifecycle.call("destroy", |old| destroyed.push(old));
        registry.put(7, lifecycle);
        assert_eq!(destroyed, vec!["first", "second"]);
        assert!(!registry.is_initialized(|key| *key == 7));
        assert!(registry.is_initialized(|key| *key == 8));
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("destroy".parse::<Method>(), Ok(Method::Destroy));
        assert_eq!(
            "open".parse::<Method>(),
            Err(IoSelectError::InvalidMethodCall("open".to_string()))
        );
    }
}
