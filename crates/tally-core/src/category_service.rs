//! Category lookup contract and the storage-backed category manager.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, PoisonError, RwLock},
};

use tally_domain::{predefined_categories, Category, CategoryId, TransactionKind};
use tracing::{debug, info};

use crate::error::LedgerResult;
use crate::mapping::RecordMapping;
use crate::storage::StorageBackend;

/// Label shown for transactions without a resolvable category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Read-only access to categories by identifier.
pub trait CategoryLookup {
    fn get_by_id(&self, id: CategoryId) -> Option<Category>;
}

impl CategoryLookup for BTreeMap<CategoryId, Category> {
    fn get_by_id(&self, id: CategoryId) -> Option<Category> {
        self.get(&id).cloned()
    }
}

impl CategoryLookup for HashMap<CategoryId, Category> {
    fn get_by_id(&self, id: CategoryId) -> Option<Category> {
        self.get(&id).cloned()
    }
}

/// Resolves a display name, falling back to [`UNCATEGORIZED`].
pub fn category_name(lookup: &dyn CategoryLookup, id: Option<CategoryId>) -> String {
    id.and_then(|id| lookup.get_by_id(id))
        .map(|category| category.name)
        .unwrap_or_else(|| UNCATEGORIZED.to_string())
}

/// Mirrors the `categories` table the same way the transaction cache mirrors
/// `transactions`: storage first, memory second.
pub struct CategoryManager {
    storage: Arc<dyn StorageBackend>,
    categories: RwLock<Vec<Category>>,
}

impl CategoryManager {
    pub fn load(storage: Arc<dyn StorageBackend>) -> LedgerResult<Self> {
        let categories = storage
            .fetch(Category::TABLE, None)?
            .iter()
            .map(Category::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = categories.len(), "categories loaded");
        Ok(Self {
            storage,
            categories: RwLock::new(categories),
        })
    }

    /// Loads the table and seeds the predefined categories when it is empty.
    pub fn load_seeded(storage: Arc<dyn StorageBackend>) -> LedgerResult<Self> {
        let manager = Self::load(storage)?;
        if manager.is_empty() {
            let seeded = predefined_categories();
            info!(count = seeded.len(), "seeding predefined categories");
            for category in seeded {
                manager.add(category)?;
            }
        }
        Ok(manager)
    }

    pub fn add(&self, mut category: Category) -> LedgerResult<CategoryId> {
        let mut categories = self
            .categories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let id = self
            .storage
            .persist(Category::TABLE, &category.to_record())?;
        category.id = Some(id);
        categories.push(category);
        Ok(id)
    }

    /// All categories, or only those of `kind`.
    pub fn list(&self, kind: Option<TransactionKind>) -> Vec<Category> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|category| kind.map_or(true, |kind| category.kind == kind))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl CategoryLookup for CategoryManager {
    fn get_by_id(&self, id: CategoryId) -> Option<Category> {
        self.categories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|category| category.id == Some(id))
            .cloned()
    }
}
