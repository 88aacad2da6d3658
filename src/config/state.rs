// Application state module
// Holds the loaded configuration and the read-only person registry

use std::collections::BTreeSet;

use super::types::Config;

/// Fixed set of person ids used for existence checks.
///
/// Built once at startup from `people.known_ids` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRegistry {
    ids: BTreeSet<i64>,
}

impl PersonRegistry {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Ids outside the `i64` range are never registered
    pub fn contains(&self, person_id: i128) -> bool {
        i64::try_from(person_id).is_ok_and(|id| self.ids.contains(&id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    pub registry: PersonRegistry,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            registry: PersonRegistry::new(config.people.known_ids.iter().copied()),
            config: config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_membership() {
        let registry = PersonRegistry::new([1, 2, 3, 4, 5]);
        assert_eq!(registry.len(), 5);
        assert!(registry.contains(1));
        assert!(registry.contains(5));
        assert!(!registry.contains(6));
        assert!(!registry.contains(0));
    }

    #[test]
    fn test_registry_ids_beyond_i64() {
        let registry = PersonRegistry::new([i64::MAX]);
        assert!(registry.contains(i128::from(i64::MAX)));
        assert!(!registry.contains(i128::from(i64::MAX) + 1));
        assert!(!registry.contains(99_999_999_999_999_999_999));
    }

    #[test]
    fn test_registry_deduplicates() {
        let registry = PersonRegistry::new([3, 3, 4]);
        assert_eq!(registry.len(), 2);
    }
}
