use indexmap::IndexMap;

use super::{FormError, FormValues, Fields, INVALID_CHOICE, REQUIRED};
use crate::common::{CircuitId, FormData, TerminationId};
use crate::domains::circuits::models::{TermSide, TerminationInput, TerminationRow};
use crate::kernel::store::EntityStore;

pub const TERM_SIDE_CHOICES: [(TermSide, &str); 2] = [(TermSide::A, "A"), (TermSide::Z, "Z")];

const SPEED_MAX: i64 = i32::MAX as i64;

/// Validate a termination form for `circuit_id`.
///
/// The owning circuit always comes from the caller; a `circuit` value in the
/// submitted data is ignored.
pub async fn clean_termination(
    store: &dyn EntityStore,
    data: &FormData,
    circuit_id: CircuitId,
    instance: Option<TerminationId>,
) -> Result<TerminationInput, FormError> {
    let mut fields = Fields::new(data);
    let term_side = match fields.raw("term_side") {
        None => {
            fields.error("term_side", REQUIRED);
            None
        }
        Some(raw) => match raw.parse::<TermSide>() {
            Ok(side) => Some(side),
            Err(_) => {
                fields.error("term_side", INVALID_CHOICE);
                None
            }
        },
    };
    let site_id = fields.required_id("site");
    let port_speed = fields.required_int("port_speed", 0, SPEED_MAX);
    let upstream_speed = fields
        .optional_int("upstream_speed", 0, SPEED_MAX)
        .map(|v| v as i32);
    let xconnect_id = fields.optional_str("xconnect_id", 50);
    let pp_info = fields.optional_str("pp_info", 100);

    if let Some(id) = site_id {
        if store.get_site(id).await?.is_none() {
            fields.error("site", INVALID_CHOICE);
        }
    }

    if let Some(side) = term_side {
        if let Some(existing) = store.find_termination(circuit_id, side).await? {
            if Some(existing.id) != instance {
                fields.error(
                    "term_side",
                    "Termination with this Circuit and Termination side already exists.",
                );
            }
        }
    }

    match (term_side, site_id, port_speed) {
        (Some(term_side), Some(site_id), Some(port_speed)) => Ok(fields.finish(TerminationInput {
            term_side,
            site_id,
            port_speed: port_speed as i32,
            upstream_speed,
            xconnect_id,
            pp_info,
        })?),
        _ => Err(fields.into_errors().into()),
    }
}

pub fn termination_initial(row: &TerminationRow) -> FormValues {
    let termination = &row.termination;
    let mut values = IndexMap::new();
    values.insert("term_side".to_string(), termination.term_side.clone());
    values.insert("site".to_string(), termination.site_id.to_string());
    values.insert("port_speed".to_string(), termination.port_speed.to_string());
    values.insert(
        "upstream_speed".to_string(),
        termination
            .upstream_speed
            .map(|s| s.to_string())
            .unwrap_or_default(),
    );
    values.insert("xconnect_id".to_string(), termination.xconnect_id.clone());
    values.insert("pp_info".to_string(), termination.pp_info.clone());
    values
}
