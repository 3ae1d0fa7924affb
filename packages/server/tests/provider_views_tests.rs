//! Provider pages: list, detail, add, edit, delete and CSV import.

mod common;

use axum::http::StatusCode;
use circuits_core::common::Permission;
use circuits_core::kernel::store::ProviderStore;
use common::{create_basics, create_circuit, create_provider, TestHarness};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn add_provider_creates_row_and_redirects_to_detail(ctx: &mut TestHarness) {
    let token = ctx.token(&[Permission::ChangeProvider]);

    let response = ctx
        .post(
            "/circuits/providers/add/",
            &[("name", "Acme"), ("slug", "acme")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/providers/acme/");
    assert_eq!(messages, ["Created provider Acme"]);
    assert_eq!(ctx.store.count_providers().await.unwrap(), 1);
    let provider = ctx.store.get_provider_by_slug("acme").await.unwrap().unwrap();
    assert_eq!(provider.name, "Acme");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn add_provider_with_blank_name_rerenders_form(ctx: &mut TestHarness) {
    let token = ctx.token(&[Permission::ChangeProvider]);

    let response = ctx
        .post(
            "/circuits/providers/add/",
            &[("name", ""), ("slug", "acme")],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This field is required."));
    // Submitted values survive the round trip
    assert!(response.body.contains("acme"));
    assert_eq!(ctx.store.count_providers().await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn add_provider_with_taken_slug_rerenders_form(ctx: &mut TestHarness) {
    create_provider(ctx.store.as_ref(), "Acme", "acme").await;
    let token = ctx.token(&[Permission::ChangeProvider]);

    let response = ctx
        .post(
            "/circuits/providers/add/",
            &[("name", "Acme Two"), ("slug", "acme")],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Provider with this Slug already exists."));
    assert_eq!(ctx.store.count_providers().await.unwrap(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn add_another_redirects_back_to_the_add_form(ctx: &mut TestHarness) {
    let token = ctx.token(&[Permission::ChangeProvider]);

    let response = ctx
        .post(
            "/circuits/providers/add/",
            &[("name", "Acme"), ("slug", "acme"), ("_addanother", "1")],
            Some(&token),
        )
        .await;

    response.assert_redirect("/circuits/providers/add/");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn edit_provider_updates_fields(ctx: &mut TestHarness) {
    let provider = create_provider(ctx.store.as_ref(), "Acme", "acme").await;
    let token = ctx.token(&[Permission::ChangeProvider]);

    let form = ctx.get("/circuits/providers/acme/edit/", Some(&token)).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("Acme"));

    let response = ctx
        .post(
            "/circuits/providers/acme/edit/",
            &[("name", "Acme Networks"), ("slug", "acme-networks"), ("asn", "65001")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/providers/acme-networks/");
    assert_eq!(messages, ["Modified provider Acme Networks"]);
    let updated = ctx.store.get_provider(provider.id).await.unwrap().unwrap();
    assert_eq!(updated.slug, "acme-networks");
    assert_eq!(updated.asn, Some(65001));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn missing_provider_is_not_found(ctx: &mut TestHarness) {
    let token = ctx.superuser_token();

    for path in [
        "/circuits/providers/nope/",
        "/circuits/providers/nope/edit/",
        "/circuits/providers/nope/delete/",
    ] {
        let response = ctx.get(path, Some(&token)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", path);
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn provider_detail_lists_its_circuits(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;

    let response = ctx.get("/circuits/providers/level3/", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Level3"));
    assert!(response.body.contains("CID-100"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn provider_list_filters_by_search_text(ctx: &mut TestHarness) {
    create_provider(ctx.store.as_ref(), "Acme", "acme").await;
    create_provider(ctx.store.as_ref(), "Zayo", "zayo").await;

    let all = ctx.get("/circuits/providers/", None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert!(all.body.contains("Acme"));
    assert!(all.body.contains("Zayo"));
    assert!(!all.body.contains("Clear filters"));

    let filtered = ctx.get("/circuits/providers/?q=zay", None).await;
    assert_eq!(filtered.status, StatusCode::OK);
    assert!(filtered.body.contains("Zayo"));
    assert!(!filtered.body.contains("/circuits/providers/acme/"));
    assert!(filtered.body.contains("Clear filters"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_provider_requires_confirmation(ctx: &mut TestHarness) {
    create_provider(ctx.store.as_ref(), "Acme", "acme").await;
    let token = ctx.token(&[Permission::DeleteProvider]);

    let unconfirmed = ctx
        .post("/circuits/providers/acme/delete/", &[], Some(&token))
        .await;
    assert_eq!(unconfirmed.status, StatusCode::OK);
    assert_eq!(ctx.store.count_providers().await.unwrap(), 1);

    let confirmed = ctx
        .post(
            "/circuits/providers/acme/delete/",
            &[("confirm", "on")],
            Some(&token),
        )
        .await;
    let messages = confirmed.assert_redirect("/circuits/providers/");
    assert_eq!(messages, ["Deleted provider Acme"]);
    assert_eq!(ctx.store.count_providers().await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_provider_in_use_is_refused(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;
    let token = ctx.token(&[Permission::DeleteProvider]);

    let response = ctx
        .post(
            "/circuits/providers/level3/delete/",
            &[("confirm", "on")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/providers/level3/");
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Unable to delete provider Level3"));
    assert_eq!(ctx.store.count_providers().await.unwrap(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn import_providers_from_csv(ctx: &mut TestHarness) {
    let token = ctx.token(&[Permission::AddProvider]);

    let response = ctx
        .post(
            "/circuits/providers/import/",
            &[("csv", "Acme,acme,65001,,\nZayo,zayo,,ACC-1,https://portal.zayo.example\n")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/providers/");
    assert_eq!(messages, ["Imported 2 providers"]);
    assert_eq!(ctx.store.count_providers().await.unwrap(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn import_with_a_bad_row_creates_nothing(ctx: &mut TestHarness) {
    let token = ctx.token(&[Permission::AddProvider]);

    let response = ctx
        .post(
            "/circuits/providers/import/",
            &[("csv", "Acme,acme,,,\n,zayo,,,\n")],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Row 2"));
    assert_eq!(ctx.store.count_providers().await.unwrap(), 0);
}
