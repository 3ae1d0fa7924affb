use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::CircuitTypeId;

/// Circuit type model - a category label such as "Internet Transit"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CircuitType {
    pub id: CircuitTypeId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CircuitType {
    /// Circuit types have no page of their own; they link to the filtered
    /// circuit list.
    pub fn absolute_url(&self) -> String {
        format!("/circuits/circuits/?type={}", self.slug)
    }
}

impl std::fmt::Display for CircuitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CircuitTypeInput {
    pub name: String,
    pub slug: String,
}

/// Circuit type annotated with how many circuits use it
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CircuitTypeListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub circuit_type: CircuitType,
    pub circuit_count: i64,
}
