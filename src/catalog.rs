//! Pure presentation helpers over a fetched menu catalog.
//!
//! Both the customer browsing view and the manager view render the same
//! catalog through these functions. Nothing here touches the network or
//! mutates the underlying items; search and category filtering always apply
//! before grouping.

use crate::domain::{Category, MenuItem};

/// Category filter for the browsing and management views. `All` is a
/// wildcard; `Only` matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, item: &MenuItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == *category,
        }
    }
}

/// A composed catalog view: a search term plus a category filter.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub term: String,
    pub category: CategoryFilter,
}

impl CatalogQuery {
    pub fn matches(&self, item: &MenuItem) -> bool {
        self.category.matches(item) && name_matches(item, &self.term)
    }

    /// Applies search and category filter, preserving catalog order.
    pub fn apply<'a>(&self, items: &'a [MenuItem]) -> Vec<&'a MenuItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

fn name_matches(item: &MenuItem, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    item.name.to_lowercase().contains(&term.to_lowercase())
}

/// Case-insensitive substring match on the item name. An empty term matches
/// everything.
pub fn search<'a>(items: &'a [MenuItem], term: &str) -> Vec<&'a MenuItem> {
    items.iter().filter(|item| name_matches(item, term)).collect()
}

pub fn filter_by_category<'a>(items: &'a [MenuItem], filter: CategoryFilter) -> Vec<&'a MenuItem> {
    items.iter().filter(|item| filter.matches(item)).collect()
}

/// Buckets items by category for display. Buckets appear in [`Category::ALL`]
/// order, empty buckets are omitted, and input order is preserved within
/// each bucket.
pub fn group_by_category<'a, I>(items: I) -> Vec<(Category, Vec<&'a MenuItem>)>
where
    I: IntoIterator<Item = &'a MenuItem>,
{
    let items: Vec<&MenuItem> = items.into_iter().collect();
    Category::ALL
        .iter()
        .filter_map(|category| {
            let bucket: Vec<&MenuItem> = items
                .iter()
                .copied()
                .filter(|item| item.category == *category)
                .collect();
            if bucket.is_empty() {
                None
            } else {
                Some((*category, bucket))
            }
        })
        .collect()
}
