use indexmap::IndexMap;

use super::{FormError, FormErrors, FormValues, Fields};
use crate::common::{FormData, ProviderId};
use crate::domains::circuits::models::{Provider, ProviderBulkUpdate, ProviderInput};
use crate::kernel::store::EntityStore;

pub const ASN_MIN: i64 = 1;
pub const ASN_MAX: i64 = 4_294_967_295;

/// Field checks that need no store access
fn provider_fields(data: &FormData) -> (ProviderInput, FormErrors) {
    let mut fields = Fields::new(data);
    let input = ProviderInput {
        name: fields.required_str("name", 50),
        slug: fields.slug("slug"),
        asn: fields.optional_int("asn", ASN_MIN, ASN_MAX),
        account: fields.optional_str("account", 30),
        portal_url: fields.optional_url("portal_url", 200),
        noc_contact: fields.optional_str("noc_contact", 10_000),
        admin_contact: fields.optional_str("admin_contact", 10_000),
        comments: fields.optional_str("comments", 100_000),
    };
    (input, fields.into_errors())
}

/// Validate a provider form; `instance` is the provider being edited.
pub async fn clean_provider(
    store: &dyn EntityStore,
    data: &FormData,
    instance: Option<ProviderId>,
) -> Result<ProviderInput, FormError> {
    let (input, mut errors) = provider_fields(data);

    if !errors.has("name") {
        if let Some(existing) = store.find_provider_by_name(&input.name).await? {
            if Some(existing.id) != instance {
                errors.add("name", "Provider with this Name already exists.");
            }
        }
    }
    if !errors.has("slug") {
        if let Some(existing) = store.get_provider_by_slug(&input.slug).await? {
            if Some(existing.id) != instance {
                errors.add("slug", "Provider with this Slug already exists.");
            }
        }
    }

    Ok(errors.finish(input)?)
}

pub fn provider_initial(provider: &Provider) -> FormValues {
    let mut values = IndexMap::new();
    values.insert("name".to_string(), provider.name.clone());
    values.insert("slug".to_string(), provider.slug.clone());
    values.insert(
        "asn".to_string(),
        provider.asn.map(|asn| asn.to_string()).unwrap_or_default(),
    );
    values.insert("account".to_string(), provider.account.clone());
    values.insert("portal_url".to_string(), provider.portal_url.clone());
    values.insert("noc_contact".to_string(), provider.noc_contact.clone());
    values.insert("admin_contact".to_string(), provider.admin_contact.clone());
    values.insert("comments".to_string(), provider.comments.clone());
    values
}

/// Shared fields of the bulk edit form; blank leaves a column unchanged.
pub fn clean_provider_bulk(data: &FormData) -> Result<ProviderBulkUpdate, FormErrors> {
    let mut fields = Fields::new(data);
    let update = ProviderBulkUpdate {
        asn: fields.optional_int("asn", ASN_MIN, ASN_MAX),
        account: non_blank(fields.optional_str("account", 30)),
        portal_url: non_blank(fields.optional_url("portal_url", 200)),
        comments: non_blank(fields.optional_str("comments", 100_000)),
    };
    fields.finish(update)
}

fn non_blank(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::store::{MemoryStore, ProviderStore};

    fn data(pairs: &[(&str, &str)]) -> FormData {
        FormData::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_valid_provider() {
        let store = MemoryStore::new();
        let input = clean_provider(
            &store,
            &data(&[("name", "Acme"), ("slug", "acme"), ("asn", "65001")]),
            None,
        )
        .await
        .unwrap();
        assert_eq!(input.name, "Acme");
        assert_eq!(input.asn, Some(65001));
        assert_eq!(input.account, "");
    }

    #[tokio::test]
    async fn test_missing_name_is_reported() {
        let store = MemoryStore::new();
        let result = clean_provider(&store, &data(&[("slug", "acme")]), None).await;
        match result {
            Err(FormError::Invalid(errors)) => {
                assert_eq!(errors.get("name"), [super::super::REQUIRED]);
                assert!(!errors.has("slug"));
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slug_uniqueness_ignores_instance() {
        let store = MemoryStore::new();
        let acme = store
            .insert_provider(&ProviderInput {
                name: "Acme".to_string(),
                slug: "acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let form = data(&[("name", "Acme"), ("slug", "acme")]);

        assert!(clean_provider(&store, &form, Some(acme.id)).await.is_ok());
        let result = clean_provider(&store, &form, None).await;
        match result {
            Err(FormError::Invalid(errors)) => {
                assert!(errors.has("name"));
                assert!(errors.has("slug"));
            }
            other => panic!("expected conflict errors, got {:?}", other),
        }
    }

    #[test]
    fn test_bulk_blank_fields_are_untouched() {
        let update = clean_provider_bulk(&data(&[("account", ""), ("asn", "65000")])).unwrap();
        assert_eq!(update.asn, Some(65000));
        assert_eq!(update.account, None);
        assert!(!update.is_empty());
        assert!(clean_provider_bulk(&data(&[])).unwrap().is_empty());
    }
}
