// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Owned in-memory record store.
//!
//! Holds the toy dataset every protocol server answers from. A store is an
//! explicit value handed to whoever serves it; there is no global instance.
//! Joined display fields are produced by projection functions at read time,
//! stored records are never rewritten.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{SecondsFormat, Utc};

use crate::error::{ClientError, ClientResult};
use crate::models::{
    Composite, CompositeId, CompositeLine, Entity, EntityId, Item, ItemId, ItemQuery, LineRequest,
};

const SEED_TIMESTAMP: &str = "2024-01-01T10:00:00Z";
const SEED_ORDER_TIMESTAMP: &str = "2024-01-01T11:00:00Z";

#[derive(Debug, Clone)]
struct CompositeRecord {
    id: CompositeId,
    owner_id: EntityId,
    total_amount: f64,
    created_at: String,
}

#[derive(Debug, Clone)]
struct LineRecord {
    composite_id: CompositeId,
    item_id: ItemId,
    quantity: u32,
    price: f64,
}

#[derive(Debug, Default)]
struct Tables {
    entities: Vec<Entity>,
    items: Vec<Item>,
    composites: Vec<CompositeRecord>,
    lines: Vec<LineRecord>,
    next_entity_id: EntityId,
    next_composite_id: CompositeId,
}

impl Tables {
    fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    fn lines_of(&self, composite_id: CompositeId) -> Vec<CompositeLine> {
        self.lines
            .iter()
            .filter(|l| l.composite_id == composite_id)
            .map(|l| project_line(l, self.item(l.item_id)))
            .collect()
    }
}

/// Build the display view of a stored line, joining the item name.
fn project_line(line: &LineRecord, item: Option<&Item>) -> CompositeLine {
    CompositeLine {
        item_id: line.item_id,
        item_name: item.map(|i| i.name.clone()).unwrap_or_default(),
        quantity: line.quantity,
        price: line.price,
    }
}

/// Build the display view of a stored composite from its projected lines.
fn project_composite(record: &CompositeRecord, lines: Vec<CompositeLine>) -> Composite {
    Composite {
        id: record.id,
        owner_id: record.owner_id,
        total_amount: record.total_amount,
        created_at: record.created_at.clone(),
        lines,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Thread-safe record store shared by reference between adapters.
#[derive(Debug, Clone)]
pub struct RecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn empty() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                next_entity_id: 1,
                next_composite_id: 1,
                ..Tables::default()
            })),
        }
    }

    /// Create a store holding the standard seed dataset.
    pub fn seeded() -> Self {
        let entity = |id, name: &str, email: &str| Entity {
            id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: SEED_TIMESTAMP.to_string(),
        };
        let item = |id, name: &str, price, category: &str| Item {
            id,
            name: name.to_string(),
            price,
            category: category.to_string(),
            created_at: SEED_TIMESTAMP.to_string(),
        };
        let composite = |id, owner_id, total_amount| CompositeRecord {
            id,
            owner_id,
            total_amount,
            created_at: SEED_ORDER_TIMESTAMP.to_string(),
        };
        let line = |composite_id, item_id, quantity, price| LineRecord {
            composite_id,
            item_id,
            quantity,
            price,
        };

        let tables = Tables {
            entities: vec![
                entity(1, "John Doe", "john@example.com"),
                entity(2, "Jane Smith", "jane@example.com"),
                entity(3, "Bob Johnson", "bob@example.com"),
                entity(4, "Alice Brown", "alice@example.com"),
                entity(5, "Charlie Wilson", "charlie@example.com"),
            ],
            items: vec![
                item(1, "Laptop", 999.99, "Electronics"),
                item(2, "Smartphone", 599.99, "Electronics"),
                item(3, "Coffee Mug", 12.99, "Kitchen"),
                item(4, "Book: JavaScript Guide", 29.99, "Books"),
                item(5, "Wireless Headphones", 149.99, "Electronics"),
                item(6, "Desk Chair", 199.99, "Furniture"),
                item(7, "Water Bottle", 19.99, "Sports"),
                item(8, "Notebook", 5.99, "Office"),
                item(9, "USB Cable", 9.99, "Electronics"),
                item(10, "Table Lamp", 39.99, "Home"),
            ],
            composites: vec![
                composite(1, 1, 1149.98),
                composite(2, 2, 179.97),
                composite(3, 1, 42.98),
                composite(4, 3, 599.99),
                composite(5, 4, 249.97),
            ],
            lines: vec![
                line(1, 1, 1, 999.99),
                line(1, 5, 1, 149.99),
                line(2, 3, 2, 12.99),
                line(2, 7, 1, 19.99),
                line(2, 8, 25, 5.99),
                line(3, 4, 1, 29.99),
                line(3, 3, 1, 12.99),
                line(4, 2, 1, 599.99),
                line(5, 6, 1, 199.99),
                line(5, 10, 1, 39.99),
                line(5, 9, 1, 9.99),
            ],
            next_entity_id: 6,
            next_composite_id: 6,
        };

        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create_entity(&self, name: &str, email: &str) -> Entity {
        let mut tables = self.write();
        let entity = Entity {
            id: tables.next_entity_id,
            name: name.to_string(),
            email: email.to_string(),
            created_at: now_rfc3339(),
        };
        tables.next_entity_id += 1;
        tables.entities.push(entity.clone());
        entity
    }

    pub fn get_entity(&self, id: EntityId) -> ClientResult<Entity> {
        self.read()
            .entities
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(ClientError::NotFound {
                resource: "entity",
                id,
            })
    }

    pub fn list_items(&self, query: &ItemQuery) -> Vec<Item> {
        self.read()
            .items
            .iter()
            .filter(|i| match &query.category {
                Some(category) => &i.category == category,
                None => true,
            })
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect()
    }

    /// Create a composite. Every referenced item must exist; nothing is
    /// written otherwise.
    pub fn create_composite(
        &self,
        owner_id: EntityId,
        lines: &[LineRequest],
    ) -> ClientResult<Composite> {
        let mut tables = self.write();

        let mut priced = Vec::with_capacity(lines.len());
        for request in lines {
            let item = tables.item(request.item_id).ok_or(ClientError::NotFound {
                resource: "item",
                id: request.item_id,
            })?;
            priced.push((*request, item.price));
        }

        let total_amount = priced
            .iter()
            .map(|(request, price)| price * f64::from(request.quantity))
            .sum();

        let record = CompositeRecord {
            id: tables.next_composite_id,
            owner_id,
            total_amount,
            created_at: now_rfc3339(),
        };
        tables.next_composite_id += 1;

        for (request, price) in priced {
            tables.lines.push(LineRecord {
                composite_id: record.id,
                item_id: request.item_id,
                quantity: request.quantity,
                price,
            });
        }
        tables.composites.push(record.clone());

        let projected = tables.lines_of(record.id);
        Ok(project_composite(&record, projected))
    }

    pub fn list_owner_composites(&self, owner_id: EntityId) -> Vec<Composite> {
        let tables = self.read();
        tables
            .composites
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .map(|c| project_composite(c, tables.lines_of(c.id)))
            .collect()
    }

    pub fn entity_count(&self) -> usize {
        self.read().entities.len()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::seeded()
    }
}
