use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::ProviderId;

/// Provider model - a vendor supplying circuits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub slug: String,

    // Contact and account details
    pub asn: Option<i64>,
    pub account: String,
    pub portal_url: String,
    pub noc_contact: String,
    pub admin_contact: String,
    pub comments: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Provider {
    pub fn absolute_url(&self) -> String {
        format!("/circuits/providers/{}/", self.slug)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Validated provider fields, used for both insert and full update
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderInput {
    pub name: String,
    pub slug: String,
    pub asn: Option<i64>,
    pub account: String,
    pub portal_url: String,
    pub noc_contact: String,
    pub admin_contact: String,
    pub comments: String,
}

/// Shared changes applied by the bulk edit view. `None` leaves a column alone.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProviderBulkUpdate {
    pub asn: Option<i64>,
    pub account: Option<String>,
    pub portal_url: Option<String>,
    pub comments: Option<String>,
}

impl ProviderBulkUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Provider annotated with the number of circuits it supplies
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProviderListRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub provider: Provider,
    pub count_circuits: i64,
}
