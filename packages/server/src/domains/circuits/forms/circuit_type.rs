use indexmap::IndexMap;

use super::{FormError, FormValues, Fields};
use crate::common::{CircuitTypeId, FormData};
use crate::domains::circuits::models::{CircuitType, CircuitTypeInput};
use crate::kernel::store::EntityStore;

pub async fn clean_circuit_type(
    store: &dyn EntityStore,
    data: &FormData,
    instance: Option<CircuitTypeId>,
) -> Result<CircuitTypeInput, FormError> {
    let mut fields = Fields::new(data);
    let input = CircuitTypeInput {
        name: fields.required_str("name", 50),
        slug: fields.slug("slug"),
    };

    if !fields.has_error("name") {
        if let Some(existing) = store.find_circuit_type_by_name(&input.name).await? {
            if Some(existing.id) != instance {
                fields.error("name", "Circuit type with this Name already exists.");
            }
        }
    }
    if !fields.has_error("slug") {
        if let Some(existing) = store.get_circuit_type_by_slug(&input.slug).await? {
            if Some(existing.id) != instance {
                fields.error("slug", "Circuit type with this Slug already exists.");
            }
        }
    }

    Ok(fields.finish(input)?)
}

pub fn circuit_type_initial(circuit_type: &CircuitType) -> FormValues {
    let mut values = IndexMap::new();
    values.insert("name".to_string(), circuit_type.name.clone());
    values.insert("slug".to_string(), circuit_type.slug.clone());
    values
}
