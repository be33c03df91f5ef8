use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::{Cadence, CadenceFilter, Category};

/// The live set of categories a session is validated against.
///
/// Insertion order is kept so front ends list categories the way the user
/// added them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// The built-in starter set used on first run.
    pub fn starter() -> Self {
        let categories = ["Health", "Work", "Social", "Learning", "Creativity", "Mindset"]
            .into_iter()
            .map(|name| Category::new(name, Cadence::Daily))
            .collect();
        Self { categories }
    }

    pub fn from_categories(categories: Vec<Category>) -> Self {
        let mut registry = Self::empty();
        for category in categories {
            if let Err(e) = registry.add(&category.name, category.cadence) {
                tracing::warn!("Dropping category while loading: {e}");
            }
        }
        registry
    }

    /// Add a category. Names are trimmed; empty and duplicate names are rejected.
    pub fn add(&mut self, name: &str, cadence: Cadence) -> Result<&Category, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidCategoryName(name.to_string()));
        }
        if self.contains(name) {
            return Err(CoreError::DuplicateCategory {
                name: name.to_string(),
            });
        }
        tracing::debug!(name, %cadence, "Adding category");
        self.categories.push(Category::new(name, cadence));
        Ok(&self.categories[self.categories.len() - 1])
    }

    /// Remove a category. History entries that mention it are not touched.
    pub fn remove(&mut self, name: &str) -> Option<Category> {
        let idx = self.categories.iter().position(|c| c.name == name)?;
        tracing::debug!(name, "Removing category");
        Some(self.categories.remove(idx))
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Categories whose cadence passes the filter.
    pub fn list(&self, filter: &CadenceFilter) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|c| filter.matches(c.cadence))
            .collect()
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::starter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_set() {
        let registry = CategoryRegistry::starter();
        assert_eq!(registry.len(), 6);
        assert_eq!(registry.all()[0].name, "Health");
        assert!(registry.all().iter().all(|c| c.cadence == Cadence::Daily));
    }

    #[test]
    fn test_add_and_duplicate() {
        let mut registry = CategoryRegistry::empty();
        registry.add("Reading", Cadence::Weekly).unwrap();
        assert!(registry.contains("Reading"));

        let err = registry.add("Reading", Cadence::Daily).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateCategory { .. }));
        assert_eq!(registry.get("Reading").unwrap().cadence, Cadence::Weekly);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut registry = CategoryRegistry::empty();
        registry.add("health", Cadence::Daily).unwrap();
        registry.add("Health", Cadence::Daily).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = CategoryRegistry::empty();
        assert!(matches!(
            registry.add("   ", Cadence::Daily),
            Err(CoreError::InvalidCategoryName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut registry = CategoryRegistry::starter();
        let removed = registry.remove("Work").unwrap();
        assert_eq!(removed.name, "Work");
        assert!(!registry.contains("Work"));
        assert!(registry.remove("Work").is_none());
    }

    #[test]
    fn test_list_by_filter() {
        let mut registry = CategoryRegistry::empty();
        registry.add("Health", Cadence::Daily).unwrap();
        registry.add("Finances", Cadence::Weekly).unwrap();
        registry.add("Travel", Cadence::Occasional).unwrap();

        assert_eq!(registry.list(&CadenceFilter::All).len(), 3);
        let weekly = registry.list(&CadenceFilter::only(Cadence::Weekly));
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].name, "Finances");
    }

    #[test]
    fn test_from_categories_drops_duplicates() {
        let registry = CategoryRegistry::from_categories(vec![
            Category::new("Health", Cadence::Daily),
            Category::new("Health", Cadence::Weekly),
            Category::new("Work", Cadence::Daily),
        ]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Health").unwrap().cadence, Cadence::Daily);
    }
}
