// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Read models exchanged through the protocol-client contract.
//!
//! Field names on the wire follow the servers under test (`user_id`,
//! `product_id`, `items`); identifiers are accepted as numbers or strings
//! because the graph-style and RPC servers render them as strings.

use serde::{Deserialize, Serialize};

pub type EntityId = u64;
pub type ItemId = u64;
pub type CompositeId = u64;

/// A named owner record (a "user" on the servers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: EntityId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: String,
}

/// A listable catalog record (a "product" on the servers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub created_at: String,
}

/// One line of a composite, projected with the referenced item's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeLine {
    #[serde(rename = "product_id", deserialize_with = "flexible_id::deserialize")]
    pub item_id: ItemId,
    #[serde(rename = "product_name", default)]
    pub item_name: String,
    pub quantity: u32,
    pub price: f64,
}

/// An order referencing one owner and one or more items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composite {
    #[serde(deserialize_with = "flexible_id::deserialize")]
    pub id: CompositeId,
    #[serde(
        rename = "user_id",
        default,
        deserialize_with = "flexible_id::deserialize"
    )]
    pub owner_id: EntityId,
    pub total_amount: f64,
    #[serde(default)]
    pub created_at: String,
    #[serde(rename = "items", default)]
    pub lines: Vec<CompositeLine>,
}

/// A requested composite line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    #[serde(rename = "product_id")]
    pub item_id: ItemId,
    pub quantity: u32,
}

/// Filter and paging for item listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

impl ItemQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            category: None,
            limit,
            offset: 0,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

impl Default for ItemQuery {
    fn default() -> Self {
        Self::new(10)
    }
}

mod flexible_id {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Ok(n),
            RawId::Text(s) => s.trim().parse().map_err(de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_accepts_string_id() {
        let entity: Entity =
            serde_json::from_str(r#"{"id":"42","name":"A","email":"a@x.io"}"#).unwrap();
        assert_eq!(entity.id, 42);
        assert!(entity.created_at.is_empty());
    }

    #[test]
    fn test_composite_wire_names() {
        let json = r#"{
            "id": 7,
            "user_id": "3",
            "total_amount": 25.98,
            "created_at": "2024-01-01T11:00:00Z",
            "items": [{"product_id": 3, "product_name": "Coffee Mug", "quantity": 2, "price": 12.99}]
        }"#;
        let composite: Composite = serde_json::from_str(json).unwrap();
        assert_eq!(composite.owner_id, 3);
        assert_eq!(composite.lines.len(), 1);
        assert_eq!(composite.lines[0].item_name, "Coffee Mug");

        let out = serde_json::to_value(&composite).unwrap();
        assert_eq!(out["user_id"], 3);
        assert_eq!(out["items"][0]["product_id"], 3);
    }

    #[test]
    fn test_composite_without_owner_defaults() {
        // The graph-style listing does not select the owner field
        let composite: Composite =
            serde_json::from_str(r#"{"id":"1","total_amount":1.0,"items":[]}"#).unwrap();
        assert_eq!(composite.owner_id, 0);
    }

    #[test]
    fn test_item_query_builder() {
        let q = ItemQuery::new(5).category("Electronics").offset(2);
        assert_eq!(q.limit, 5);
        assert_eq!(q.offset, 2);
        assert_eq!(q.category.as_deref(), Some("Electronics"));
    }

    #[test]
    fn test_bad_id_rejected() {
        let result: Result<Entity, _> =
            serde_json::from_str(r#"{"id":"abc","name":"A","email":"a@x.io"}"#);
        assert!(result.is_err());
    }
}
