use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{CircuitId, CircuitTypeId, ProviderId, SiteId, TenantId};

/// Circuit model - a logical link bought from a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Circuit {
    pub id: CircuitId,
    /// Provider-assigned circuit ID, unique per provider
    pub cid: String,
    pub provider_id: ProviderId,
    pub type_id: CircuitTypeId,
    pub tenant_id: Option<TenantId>,
    pub site_id: Option<SiteId>,
    pub install_date: Option<NaiveDate>,
    /// Committed rate in kbps
    pub commit_rate: Option<i32>,
    pub description: String,
    pub comments: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Circuit {
    pub fn absolute_url(&self) -> String {
        circuit_url(self.id)
    }
}

pub fn circuit_url(id: CircuitId) -> String {
    format!("/circuits/circuits/{}/", id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircuitInput {
    pub cid: String,
    pub provider_id: ProviderId,
    pub type_id: CircuitTypeId,
    pub tenant_id: Option<TenantId>,
    pub site_id: Option<SiteId>,
    pub install_date: Option<NaiveDate>,
    pub commit_rate: Option<i32>,
    pub description: String,
    pub comments: String,
}

/// Shared changes applied by the bulk edit view. `None` leaves a column
/// alone; `tenant_id: Some(None)` clears the tenant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CircuitBulkUpdate {
    pub provider_id: Option<ProviderId>,
    pub type_id: Option<CircuitTypeId>,
    pub tenant_id: Option<Option<TenantId>>,
    pub commit_rate: Option<i32>,
    pub description: Option<String>,
    pub comments: Option<String>,
}

impl CircuitBulkUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Circuit joined with its provider, type, tenant and site, annotated with
/// its termination count
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CircuitRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub circuit: Circuit,
    pub provider_name: String,
    pub provider_slug: String,
    pub type_name: String,
    pub type_slug: String,
    pub tenant_name: Option<String>,
    pub tenant_slug: Option<String>,
    pub site_name: Option<String>,
    pub site_slug: Option<String>,
    pub count_terminations: i64,
}

impl CircuitRow {
    pub fn absolute_url(&self) -> String {
        self.circuit.absolute_url()
    }
}

impl std::fmt::Display for CircuitRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.provider_name, self.circuit.cid)
    }
}
