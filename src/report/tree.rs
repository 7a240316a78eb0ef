//! Three-level grouping of catalog entries.

use indexmap::IndexMap;
use wpt_core::QualifiedName;

use crate::registry::TesterCatalog;

/// A leaf of the tree: one catalogued test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafEntry {
    pub name: QualifiedName,
    pub source: String,
}

pub type Subcategory = IndexMap<String, LeafEntry>;
pub type Category = IndexMap<String, Subcategory>;

/// Category → subcategory → leaf, each level in first-seen order.
///
/// Two names that split to the same path share one leaf; the later catalog entry replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    categories: IndexMap<String, Category>,
}

impl CategoryTree {
    pub fn from_catalog(catalog: &TesterCatalog) -> Self {
        let mut tree = Self::default();
        for (name, source) in catalog.iter() {
            tree.insert(name, source);
        }
        tree
    }

    pub fn insert(&mut self, name: &QualifiedName, source: &str) {
        let (category, subcategory, leaf) = name.segments();
        self.categories
            .entry(category.to_string())
            .or_default()
            .entry(subcategory.to_string())
            .or_default()
            .insert(
                leaf.to_string(),
                LeafEntry {
                    name: name.clone(),
                    source: source.to_string(),
                },
            );
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.categories.iter().map(|(name, category)| (name.as_str(), category))
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of distinct leaves.
    pub fn leaf_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(IndexMap::values)
            .map(IndexMap::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> TesterCatalog {
        names
            .iter()
            .map(|n| (QualifiedName::from(*n), format!("src of {n}")))
            .collect()
    }

    fn shape(tree: &CategoryTree) -> Vec<(String, String, Vec<String>)> {
        let mut out = Vec::new();
        for (category, subs) in tree.categories() {
            for (sub, leaves) in subs {
                out.push((category.to_string(), sub.clone(), leaves.keys().cloned().collect()));
            }
        }
        out
    }

    fn row(category: &str, sub: &str, leaves: &[&str]) -> (String, String, Vec<String>) {
        (category.to_string(), sub.to_string(), leaves.iter().map(|l| l.to_string()).collect())
    }

    #[test]
    fn test_shared_prefix_groups_under_one_node() {
        let tree = CategoryTree::from_catalog(&catalog(&["a›b›c", "a›b›d"]));
        assert_eq!(shape(&tree), vec![row("a", "b", &["c", "d"])]);
    }

    #[test]
    fn test_first_seen_order_not_alphabetical() {
        let tree = CategoryTree::from_catalog(&catalog(&["z›y›x", "a›b›c", "z›a›q"]));
        let categories: Vec<_> = tree.categories().map(|(c, _)| c).collect();
        assert_eq!(categories, vec!["z", "a"]);
        let subs: Vec<String> = tree.categories().next().map(|(_, s)| s.keys().cloned().collect()).unwrap_or_default();
        assert_eq!(subs, vec!["y", "a"]);
    }

    #[test]
    fn test_two_segments_get_empty_subcategory() {
        let tree = CategoryTree::from_catalog(&catalog(&["a›c"]));
        assert_eq!(shape(&tree), vec![row("a", "", &["c"])]);
    }

    #[test]
    fn test_leaf_keeps_source_and_name() {
        let tree = CategoryTree::from_catalog(&catalog(&["a›b›c"]));
        let (_, subs) = tree.categories().next().unwrap_or_else(|| panic!("no category"));
        let leaf = &subs["b"]["c"];
        assert_eq!(leaf.name.as_str(), "a›b›c");
        assert_eq!(leaf.source, "src of a›b›c");
    }

    #[test]
    fn test_colliding_paths_replace_in_place() {
        let tree = CategoryTree::from_catalog(&catalog(&["a›c", "a›b›x", "a››c"]));
        assert_eq!(tree.leaf_count(), 2);
        let (_, subs) = tree.categories().next().unwrap_or_else(|| panic!("no category"));
        assert_eq!(subs[""]["c"].name.as_str(), "a››c");
        assert_eq!(subs.keys().collect::<Vec<_>>(), vec!["", "b"]);
    }
}
