//! Circuit and circuit type pages.

mod common;

use axum::http::StatusCode;
use circuits_core::common::Permission;
use circuits_core::domains::circuits::models::TermSide;
use circuits_core::kernel::store::{CircuitStore, CircuitTypeStore};
use common::{
    create_basics, create_circuit, create_circuit_type, create_provider, create_termination,
    TestHarness,
};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn add_circuit_redirects_to_its_detail_page(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let provider_id = basics.provider.id.to_string();
    let type_id = basics.circuit_type.id.to_string();

    let response = ctx
        .post(
            "/circuits/circuits/add/",
            &[
                ("cid", "CID-100"),
                ("provider", &provider_id),
                ("type", &type_id),
                ("commit_rate", "100000"),
            ],
            Some(&token),
        )
        .await;

    let circuit = ctx
        .store
        .find_circuit(basics.provider.id, "CID-100")
        .await
        .unwrap()
        .expect("circuit was created");
    let messages = response.assert_redirect(&format!("/circuits/circuits/{}/", circuit.id));
    assert_eq!(messages, ["Created circuit Level3 CID-100"]);
    assert_eq!(circuit.commit_rate, Some(100_000));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn add_circuit_with_unknown_provider_rerenders_form(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let type_id = basics.circuit_type.id.to_string();
    let bogus = uuid::Uuid::new_v4().to_string();

    let response = ctx
        .post(
            "/circuits/circuits/add/",
            &[("cid", "CID-100"), ("provider", &bogus), ("type", &type_id)],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Select a valid choice."));
    assert_eq!(ctx.store.count_circuits().await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn duplicate_cid_for_the_same_provider_is_rejected(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let provider_id = basics.provider.id.to_string();
    let type_id = basics.circuit_type.id.to_string();

    let response = ctx
        .post(
            "/circuits/circuits/add/",
            &[("cid", "CID-100"), ("provider", &provider_id), ("type", &type_id)],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .body
        .contains("Circuit with this Provider and Circuit ID already exists."));
    assert_eq!(ctx.store.count_circuits().await.unwrap(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn edit_circuit_changes_its_provider(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;
    let zayo = create_provider(ctx.store.as_ref(), "Zayo", "zayo").await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let path = format!("/circuits/circuits/{}/edit/", circuit.circuit.id);
    let zayo_id = zayo.id.to_string();
    let type_id = basics.circuit_type.id.to_string();

    let form = ctx.get(&path, Some(&token)).await;
    assert_eq!(form.status, StatusCode::OK);
    assert!(form.body.contains("CID-100"));

    let response = ctx
        .post(
            &path,
            &[("cid", "CID-100"), ("provider", &zayo_id), ("type", &type_id)],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect(&circuit.absolute_url());
    assert_eq!(messages, ["Modified circuit Zayo CID-100"]);
    let updated = ctx.store.get_circuit(circuit.circuit.id).await.unwrap().unwrap();
    assert_eq!(updated.provider_name, "Zayo");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_or_malformed_circuit_is_not_found(ctx: &mut TestHarness) {
    let token = ctx.superuser_token();
    let missing = uuid::Uuid::new_v4();

    for path in [
        format!("/circuits/circuits/{}/", missing),
        format!("/circuits/circuits/{}/edit/", missing),
        format!("/circuits/circuits/{}/delete/", missing),
        format!("/circuits/circuits/{}/terminations/add/", missing),
        "/circuits/circuits/not-a-uuid/".to_string(),
    ] {
        let response = ctx.get(&path, Some(&token)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", path);
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn circuit_detail_shows_both_terminations(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;
    create_termination(ctx.store.as_ref(), &circuit, TermSide::A, &basics.site).await;
    let token = ctx.token(&[Permission::ChangeCircuit]);

    let response = ctx.get(&circuit.absolute_url(), Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("CID-100"));
    assert!(response.body.contains("DC East"));
    // Z side is still open
    assert!(response.body.contains("terminations/add/?term_side=Z"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn circuit_list_filters_by_provider_slug(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let zayo = create_provider(ctx.store.as_ref(), "Zayo", "zayo").await;
    create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "L3-1").await;
    create_circuit(ctx.store.as_ref(), &zayo, &basics.circuit_type, "ZAYO-1").await;

    let all = ctx.get("/circuits/circuits/", None).await;
    assert_eq!(all.status, StatusCode::OK);
    assert!(all.body.contains("L3-1"));
    assert!(all.body.contains("ZAYO-1"));

    let filtered = ctx.get("/circuits/circuits/?provider=zayo", None).await;
    assert_eq!(filtered.status, StatusCode::OK);
    assert!(filtered.body.contains("ZAYO-1"));
    assert!(!filtered.body.contains("L3-1"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_circuit_redirects_to_list(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;
    create_termination(ctx.store.as_ref(), &circuit, TermSide::A, &basics.site).await;
    let token = ctx.token(&[Permission::DeleteCircuit]);

    let response = ctx
        .post(
            &format!("/circuits/circuits/{}/delete/", circuit.circuit.id),
            &[("confirm", "on")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/circuits/");
    assert_eq!(messages, ["Deleted circuit Level3 CID-100"]);
    assert_eq!(ctx.store.count_circuits().await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn import_circuits_references_rows_by_name(ctx: &mut TestHarness) {
    create_basics(ctx.store.as_ref()).await;
    let token = ctx.token(&[Permission::AddCircuit]);

    let response = ctx
        .post(
            "/circuits/circuits/import/",
            &[(
                "csv",
                "CID-1,Level3,Internet Transit,,2024-01-15,10000,Uplink\n\
                 CID-2,Level3,Internet Transit,,,,\n",
            )],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/circuits/");
    assert_eq!(messages, ["Imported 2 circuits"]);
    assert_eq!(ctx.store.count_circuits().await.unwrap(), 2);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn add_circuit_type_redirects_to_type_list(ctx: &mut TestHarness) {
    let token = ctx.token(&[Permission::ChangeCircuitType]);

    let response = ctx
        .post(
            "/circuits/circuit-types/add/",
            &[("name", "Dark Fiber"), ("slug", "dark-fiber")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect("/circuits/circuit-types/");
    assert_eq!(messages, ["Created circuit type Dark Fiber"]);

    let list = ctx.get("/circuits/circuit-types/", None).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(list.body.contains("Dark Fiber"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn edit_circuit_type_by_slug(ctx: &mut TestHarness) {
    let circuit_type = create_circuit_type(ctx.store.as_ref(), "MPLS", "mpls").await;
    let token = ctx.token(&[Permission::ChangeCircuitType]);

    let response = ctx
        .post(
            "/circuits/circuit-types/mpls/edit/",
            &[("name", "MPLS VPN"), ("slug", "mpls-vpn")],
            Some(&token),
        )
        .await;

    response.assert_redirect("/circuits/circuit-types/");
    let updated = ctx
        .store
        .get_circuit_type(circuit_type.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.slug, "mpls-vpn");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_circuit_type_in_use_is_refused(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-100").await;
    let token = ctx.token(&[Permission::DeleteCircuitType]);

    let response = ctx
        .post(
            "/circuits/circuit-types/internet-transit/delete/",
            &[("confirm", "on")],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert!(response.messages[0]
        .message
        .starts_with("Unable to delete circuit type Internet Transit"));
    assert_eq!(ctx.store.count_circuit_types().await.unwrap(), 1);
}
