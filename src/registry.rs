//! Name → factory registry for pluggable subsystems.
//!
//! # Responsibilities
//! - Collect factories under unique names during initialization
//! - Freeze into an immutable, shareable lookup table
//!
//! # Design Decisions
//! - Two phases: a mutable [`RegistryBuilder`] used only while the process
//!   initializes, then a read-only [`Registry`] behind an `Arc`
//! - Duplicate names are rejected, never overwritten
//! - Lookups take no locks; the table is immutable after `build()`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Zero-argument constructor for an implementation of `T`.
pub type Factory<T> = Arc<dyn Fn() -> Box<T> + Send + Sync>;

/// A second registration under a name that is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} {name:?} is already registered")]
pub struct RegistrationConflict {
    /// What kind of subsystem the registry holds (e.g. "engine").
    pub kind: &'static str,
    /// The conflicting name.
    pub name: String,
}

/// Mutable registry used during process initialization.
pub struct RegistryBuilder<T: ?Sized> {
    kind: &'static str,
    entries: HashMap<String, Factory<T>>,
}

impl<T: ?Sized> RegistryBuilder<T> {
    /// Create an empty builder for subsystems of the given kind.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    /// Register `factory` under `name`.
    ///
    /// Fails if `name` is already taken; the existing entry is kept.
    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<(), RegistrationConflict>
    where
        F: Fn() -> Box<T> + Send + Sync + 'static,
    {
        self.register_factory(name, Arc::new(factory))
    }

    /// Register an already shared factory under `name`.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: Factory<T>,
    ) -> Result<(), RegistrationConflict> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistrationConflict {
                kind: self.kind,
                name,
            });
        }
        tracing::debug!(kind = self.kind, name = %name, "Registered factory");
        self.entries.insert(name, factory);
        Ok(())
    }

    /// Freeze the builder. No further registration is possible.
    pub fn build(self) -> Registry<T> {
        Registry {
            kind: self.kind,
            entries: Arc::new(self.entries),
        }
    }
}

/// Read-only name → factory table. Cheap to clone.
pub struct Registry<T: ?Sized> {
    kind: &'static str,
    entries: Arc<HashMap<String, Factory<T>>>,
}

impl<T: ?Sized> Registry<T> {
    /// Factory registered under `name`, if any.
    pub fn lookup(&self, name: &str) -> Option<Factory<T>> {
        self.entries.get(name).cloned()
    }

    /// Construct a fresh instance of the implementation registered under `name`.
    pub fn create(&self, name: &str) -> Option<Box<T>> {
        self.entries.get(name).map(|factory| factory())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The kind of subsystem this registry holds.
    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl<T: ?Sized> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct Hello;
    impl Greeter for Hello {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    struct Hola;
    impl Greeter for Hola {
        fn greet(&self) -> &'static str {
            "hola"
        }
    }

    #[test]
    fn duplicate_name_conflicts() {
        let mut builder = RegistryBuilder::<dyn Greeter>::new("greeter");
        builder.register("en", || Box::new(Hello)).unwrap();

        let err = builder.register("en", || Box::new(Hola)).unwrap_err();
        assert_eq!(err.name, "en");
        assert_eq!(err.to_string(), "greeter \"en\" is already registered");

        // The first registration survives.
        let registry = builder.build();
        assert_eq!(registry.create("en").unwrap().greet(), "hello");
    }

    #[test]
    fn distinct_names_never_conflict() {
        let mut builder = RegistryBuilder::<dyn Greeter>::new("greeter");
        builder.register("en", || Box::new(Hello)).unwrap();
        builder.register("es", || Box::new(Hola)).unwrap();

        let registry = builder.build();
        assert_eq!(registry.names(), vec!["en", "es"]);
        assert_eq!(registry.create("es").unwrap().greet(), "hola");
        assert!(registry.lookup("fr").is_none());
    }

    #[test]
    fn lookup_returns_registered_factory() {
        let factory: Factory<dyn Greeter> = Arc::new(|| Box::new(Hello) as Box<dyn Greeter>);
        let mut builder = RegistryBuilder::<dyn Greeter>::new("greeter");
        builder.register_factory("en", Arc::clone(&factory)).unwrap();

        let registry = builder.build();
        let found = registry.lookup("en").unwrap();
        assert!(Arc::ptr_eq(&found, &factory));
    }

    #[test]
    fn clones_share_entries_across_threads() {
        let mut builder = RegistryBuilder::<dyn Greeter>::new("greeter");
        builder.register("en", || Box::new(Hello)).unwrap();
        let registry = builder.build();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || registry.create("en").map(|g| g.greet()))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some("hello"));
        }
    }
}
