//! Reference data owned by other apps (sites, tenants, graphs). The circuits
//! views only read these.

use serde::{Deserialize, Serialize};

use crate::common::{GraphId, SiteId, TenantId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
}

/// What a graph definition draws for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphType {
    Interface,
    Provider,
    Site,
}

impl GraphType {
    pub fn code(&self) -> i16 {
        match self {
            GraphType::Interface => 100,
            GraphType::Provider => 200,
            GraphType::Site => 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Graph {
    pub id: GraphId,
    pub graph_type: i16,
    pub weight: i16,
    pub name: String,
    /// URL template of the rendered graph image
    pub source: String,
}

/// One `<option>` of a select field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl ToString, label: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            label: label.into(),
        }
    }
}
