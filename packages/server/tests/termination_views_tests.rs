//! Termination pages, all scoped to their circuit.

mod common;

use axum::http::StatusCode;
use circuits_core::common::Permission;
use circuits_core::domains::circuits::models::TermSide;
use circuits_core::kernel::store::TerminationStore;
use common::{create_basics, create_circuit, create_site, create_termination, TestHarness};
use test_context::test_context;

#[test_context(TestHarness)]
#[tokio::test]
async fn add_termination_ignores_a_submitted_circuit(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let target =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-1").await;
    let other =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-2").await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let site_id = basics.site.id.to_string();
    let other_id = other.circuit.id.to_string();

    let response = ctx
        .post(
            &format!("/circuits/circuits/{}/terminations/add/", target.circuit.id),
            &[
                ("circuit", &other_id),
                ("term_side", "A"),
                ("site", &site_id),
                ("port_speed", "10000"),
            ],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect(&target.absolute_url());
    assert_eq!(messages, ["Created termination Level3 CID-1 (Side A)"]);
    let on_target = ctx
        .store
        .terminations_for_circuit(target.circuit.id)
        .await
        .unwrap();
    assert_eq!(on_target.len(), 1);
    assert_eq!(on_target[0].termination.circuit_id, target.circuit.id);
    assert!(ctx
        .store
        .terminations_for_circuit(other.circuit.id)
        .await
        .unwrap()
        .is_empty());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn add_termination_form_prefills_side_from_query(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-1").await;
    let token = ctx.token(&[Permission::ChangeCircuit]);

    let response = ctx
        .get(
            &format!(
                "/circuits/circuits/{}/terminations/add/?term_side=Z",
                circuit.circuit.id
            ),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Level3 CID-1"));
    assert!(response.body.contains(r#"<option value="Z" selected>"#));
    assert!(!response.body.contains(r#"<option value="A" selected>"#));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn second_termination_on_the_same_side_is_rejected(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-1").await;
    create_termination(ctx.store.as_ref(), &circuit, TermSide::A, &basics.site).await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let site_id = basics.site.id.to_string();

    let response = ctx
        .post(
            &format!("/circuits/circuits/{}/terminations/add/", circuit.circuit.id),
            &[("term_side", "A"), ("site", &site_id), ("port_speed", "1000")],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .body
        .contains("Termination with this Circuit and Termination side already exists."));
    assert_eq!(ctx.store.count_terminations().await.unwrap(), 1);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn edit_termination_moves_it_to_another_site(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-1").await;
    let termination =
        create_termination(ctx.store.as_ref(), &circuit, TermSide::Z, &basics.site).await;
    let west = create_site(ctx.store.as_ref(), "DC West", "dc-west").await;
    let token = ctx.token(&[Permission::ChangeCircuit]);
    let west_id = west.id.to_string();
    let path = format!("/circuits/terminations/{}/edit/", termination.termination.id);

    let form = ctx.get(&path, Some(&token)).await;
    assert_eq!(form.status, StatusCode::OK);

    let response = ctx
        .post(
            &path,
            &[("term_side", "Z"), ("site", &west_id), ("port_speed", "1000000")],
            Some(&token),
        )
        .await;

    let messages = response.assert_redirect(&circuit.absolute_url());
    assert_eq!(messages, ["Modified termination Level3 CID-1 (Side Z)"]);
    let updated = ctx
        .store
        .get_termination(termination.termination.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.site_name, "DC West");
    assert_eq!(updated.termination.port_speed, 1_000_000);
    assert_eq!(updated.termination.circuit_id, circuit.circuit.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn delete_termination_names_it_and_its_circuit(ctx: &mut TestHarness) {
    let basics = create_basics(ctx.store.as_ref()).await;
    let circuit =
        create_circuit(ctx.store.as_ref(), &basics.provider, &basics.circuit_type, "CID-1").await;
    let termination =
        create_termination(ctx.store.as_ref(), &circuit, TermSide::A, &basics.site).await;
    let token = ctx.token(&[Permission::DeleteCircuit]);
    let path = format!("/circuits/terminations/{}/delete/", termination.termination.id);

    let confirm_page = ctx.get(&path, Some(&token)).await;
    assert_eq!(confirm_page.status, StatusCode::OK);

    let response = ctx.post(&path, &[("confirm", "on")], Some(&token)).await;

    let messages = response.assert_redirect(&circuit.absolute_url());
    assert_eq!(
        messages,
        ["Termination Level3 CID-1 (Side A) has been deleted from Level3 CID-1"]
    );
    assert_eq!(ctx.store.count_terminations().await.unwrap(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_termination_is_not_found(ctx: &mut TestHarness) {
    let token = ctx.superuser_token();
    let missing = uuid::Uuid::new_v4();

    for path in [
        format!("/circuits/terminations/{}/edit/", missing),
        format!("/circuits/terminations/{}/delete/", missing),
    ] {
        let response = ctx.get(&path, Some(&token)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{}", path);
    }
}
