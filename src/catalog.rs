//! Category catalog: the read-only parent → subcategory tree
//!
//! Loaded once per session from `GET /categories` and passed by reference to
//! whatever needs to resolve ids. There is no global instance; refreshing means
//! loading a new catalog and replacing the old value.

use crate::api::TrendsApi;
use crate::error::{Result, TrendsError};
use crate::model::{Category, CategoryGroup, Selection};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    groups: Vec<CategoryGroup>,
    /// parent id -> index into `groups`
    parents: HashMap<String, usize>,
    /// leaf id -> (group index, subcategory index)
    leaves: HashMap<String, (usize, usize)>,
}

impl CategoryCatalog {
    /// Fetch and validate the catalog
    pub async fn load(api: &dyn TrendsApi) -> Result<Self> {
        let groups = api.categories().await?;
        let catalog = Self::from_groups(groups)?;
        log::info!(
            "Loaded category catalog: {} parents, {} subcategories",
            catalog.parents.len(),
            catalog.leaves.len()
        );
        Ok(catalog)
    }

    /// Build a catalog from already-fetched groups
    ///
    /// Subcategories without a parent id get their group's id; a subcategory
    /// claiming a different parent, a duplicate id, or an id shared between a
    /// parent and a leaf is rejected.
    pub fn from_groups(mut groups: Vec<CategoryGroup>) -> Result<Self> {
        let mut parents = HashMap::new();
        for (gi, group) in groups.iter().enumerate() {
            if parents.insert(group.id.clone(), gi).is_some() {
                return Err(TrendsError::InvalidArgument(format!(
                    "duplicate parent category {}",
                    group.id
                )));
            }
        }

        let mut leaves = HashMap::new();
        for (gi, group) in groups.iter_mut().enumerate() {
            for (si, sub) in group.subcategories.iter_mut().enumerate() {
                let parent = sub.parent_id.get_or_insert_with(|| group.id.clone());
                if *parent != group.id {
                    return Err(TrendsError::InvalidArgument(format!(
                        "{} listed under {} but claims parent {}",
                        sub.id, group.id, parent
                    )));
                }
                if parents.contains_key(&sub.id) {
                    return Err(TrendsError::InvalidArgument(format!(
                        "{} is both a parent and a subcategory",
                        sub.id
                    )));
                }
                if leaves.insert(sub.id.clone(), (gi, si)).is_some() {
                    return Err(TrendsError::InvalidArgument(format!(
                        "duplicate subcategory {}",
                        sub.id
                    )));
                }
            }
        }

        Ok(Self {
            groups,
            parents,
            leaves,
        })
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn is_parent(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    pub fn parent(&self, parent_id: &str) -> Option<&CategoryGroup> {
        self.parents.get(parent_id).map(|&gi| &self.groups[gi])
    }

    pub fn leaf(&self, category_id: &str) -> Option<&Category> {
        self.leaves
            .get(category_id)
            .map(|&(gi, si)| &self.groups[gi].subcategories[si])
    }

    pub fn parent_of(&self, category_id: &str) -> Option<&CategoryGroup> {
        self.leaves
            .get(category_id)
            .map(|&(gi, _)| &self.groups[gi])
    }

    /// Ordered subcategories of a parent
    pub fn subcategories(&self, parent_id: &str) -> Result<&[Category]> {
        self.parent(parent_id)
            .map(|group| group.subcategories.as_slice())
            .ok_or_else(|| TrendsError::NotFound(format!("parent category {}", parent_id)))
    }

    /// Display name for any id, falling back to the id itself
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        if let Some(leaf) = self.leaf(id) {
            &leaf.name
        } else if let Some(group) = self.parent(id) {
            &group.name
        } else {
            id
        }
    }

    /// Leaf ids a selection stands for, in catalog order
    pub fn resolve(&self, selection: &Selection) -> Result<Vec<String>> {
        match selection {
            Selection::Leaf(id) => {
                if self.leaves.contains_key(id) {
                    Ok(vec![id.clone()])
                } else {
                    Err(TrendsError::NotFound(format!("category {}", id)))
                }
            }
            Selection::ParentGroup(parent_id) => Ok(self
                .subcategories(parent_id)?
                .iter()
                .map(|c| c.id.clone())
                .collect()),
        }
    }
}
