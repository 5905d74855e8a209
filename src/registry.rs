//! Named lookup of shared collaborators
//!
//! Currency formats and exchanges are handed around explicitly through
//! registries instead of living in process-wide globals.

use std::collections::HashMap;

/// A map from names to values with lookup that treats absence as normal
#[derive(Debug, Clone)]
pub struct NamedRegistry<T> {
    entries: HashMap<String, T>,
}

impl<T> NamedRegistry<T> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registers a value, returning the one it replaced
    pub fn register(&mut self, name: &str, value: T) -> Option<T> {
        self.entries.insert(name.to_string(), value)
    }

    /// Looks up a value by name
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Removes a value by name
    pub fn remove(&mut self, name: &str) -> Option<T> {
        self.entries.remove(name)
    }

    /// Returns the registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Default for NamedRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = NamedRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.register("a", 1), None);
        assert_eq!(registry.register("a", 2), Some(1));
        registry.register("b", 3);

        assert_eq!(registry.lookup("a"), Some(&2));
        assert_eq!(registry.lookup("missing"), None);
        assert_eq!(registry.names(), vec!["a", "b"]);
        assert_eq!(registry.remove("b"), Some(3));
        assert_eq!(registry.len(), 1);
    }
}
