use std::collections::HashMap;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::schema::vocabulary_items;
use crate::store::DbPool;

/// Display data for one vocabulary item, owned by the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable)]
pub struct VocabularyItem {
    pub item_id: i32,
    pub word: String,
    pub phonetic: String,
    pub definition: String,
}

/// Read-only view of the vocabulary catalog. The scheduler validates item
/// ids against it and decorates due lists with its display fields; it never
/// mutates catalog data.
pub trait VocabularyCatalog: Send + Sync {
    fn item_exists(&self, item_id: i32) -> Result<bool, StoreError>;
    fn get_item(&self, item_id: i32) -> Result<Option<VocabularyItem>, StoreError>;
}

pub struct DieselCatalog {
    pool: DbPool,
}

impl DieselCatalog {
    pub fn new(pool: DbPool) -> Self {
        DieselCatalog { pool }
    }
}

impl VocabularyCatalog for DieselCatalog {
    fn item_exists(&self, item_id: i32) -> Result<bool, StoreError> {
        use diesel::dsl::exists;
        use diesel::select;

        let mut conn = self.pool.get()?;
        let found = select(exists(
            vocabulary_items::table.filter(vocabulary_items::item_id.eq(item_id)),
        ))
        .get_result(&mut conn)?;
        Ok(found)
    }

    fn get_item(&self, item_id: i32) -> Result<Option<VocabularyItem>, StoreError> {
        let mut conn = self.pool.get()?;
        let item = vocabulary_items::table
            .filter(vocabulary_items::item_id.eq(item_id))
            .first::<VocabularyItem>(&mut conn)
            .optional()?;
        Ok(item)
    }
}

/// Fixed in-process catalog for tests and embedders.
#[derive(Default)]
pub struct MemoryCatalog {
    items: HashMap<i32, VocabularyItem>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<VocabularyItem>) -> Self {
        MemoryCatalog {
            items: items.into_iter().map(|item| (item.item_id, item)).collect(),
        }
    }

    pub fn insert(&mut self, item: VocabularyItem) {
        self.items.insert(item.item_id, item);
    }
}

impl VocabularyCatalog for MemoryCatalog {
    fn item_exists(&self, item_id: i32) -> Result<bool, StoreError> {
        Ok(self.items.contains_key(&item_id))
    }

    fn get_item(&self, item_id: i32) -> Result<Option<VocabularyItem>, StoreError> {
        Ok(self.items.get(&item_id).cloned())
    }
}
