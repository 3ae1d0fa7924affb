use serde::{Deserialize, Serialize};

use crate::common::{CircuitId, SiteId, TerminationId};

/// Which end of the circuit a termination is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermSide {
    A,
    Z,
}

impl std::fmt::Display for TermSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermSide::A => write!(f, "A"),
            TermSide::Z => write!(f, "Z"),
        }
    }
}

impl std::str::FromStr for TermSide {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "A" | "a" => Ok(TermSide::A),
            "Z" | "z" => Ok(TermSide::Z),
            _ => Err(anyhow::anyhow!("Invalid termination side: {}", s)),
        }
    }
}

/// Termination model - one physical end of a circuit, at a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Termination {
    pub id: TerminationId,
    pub circuit_id: CircuitId,
    /// "A" or "Z", see [`TermSide`]
    pub term_side: String,
    pub site_id: SiteId,
    /// Physical port speed in kbps
    pub port_speed: i32,
    pub upstream_speed: Option<i32>,
    /// Cross-connect ID
    pub xconnect_id: String,
    /// Patch panel / port info
    pub pp_info: String,
}

/// Validated termination fields. The owning circuit is never part of the
/// submitted form; handlers supply it separately.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminationInput {
    pub term_side: TermSide,
    pub site_id: SiteId,
    pub port_speed: i32,
    pub upstream_speed: Option<i32>,
    pub xconnect_id: String,
    pub pp_info: String,
}

/// Termination joined with its site and the display name of its circuit
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TerminationRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub termination: Termination,
    pub site_name: String,
    pub site_slug: String,
    pub provider_name: String,
    pub cid: String,
}

impl TerminationRow {
    /// Display name of the parent circuit
    pub fn circuit_display(&self) -> String {
        format!("{} {}", self.provider_name, self.cid)
    }
}

impl std::fmt::Display for TerminationRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (Side {})",
            self.circuit_display(),
            self.termination.term_side
        )
    }
}
