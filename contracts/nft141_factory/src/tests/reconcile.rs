use pretty_assertions::assert_eq;
use soroban_sdk::testutils::Ledger;

use super::setup::{broken_child_wasm, child_wasm, FactoryTest, PENDING_TIMEOUT_LEDGERS};
use crate::{
    errors::FactoryError,
    storage_types::{DeploymentStatus, FailureReason, StrandedFunds, MAX_PAGE_SIZE},
};

#[test]
fn failed_init_strands_funds_in_the_child_and_frees_the_label() {
    let test = FactoryTest::setup();
    test.factory
        .register_code(&test.owner, &broken_child_wasm(&test.env), &2);
    let payer = test.funded_user(22);

    let ticket = test
        .factory
        .deploy(&payer, &test.label("bob"), &payer, &None, &11);
    assert_eq!(test.advance_all(ticket.id), DeploymentStatus::Failed);

    let state = test.factory.get_ticket(&ticket.id);
    assert_eq!(state.status, DeploymentStatus::Failed);
    assert_eq!(state.failure, Some(FailureReason::InitFailed));
    assert_eq!(
        test.factory.try_get_deployment(&ticket.child_id),
        Err(Ok(FactoryError::NotFound))
    );
    assert_eq!(
        test.factory.try_child_address(&ticket.id),
        Err(Ok(FactoryError::DeploymentFailed))
    );
    assert_eq!(test.factory.deployment_count(), 0);

    let stranded = test.factory.get_stranded_funds();
    assert_eq!(stranded.len(), 1);
    assert_eq!(
        stranded.get(0).unwrap(),
        StrandedFunds {
            ticket: ticket.id,
            child_id: ticket.child_id.clone(),
            holder: ticket.child_address.clone(),
            payer: payer.clone(),
            amount: 10,
            ledger: test.env.ledger().sequence(),
        }
    );
    assert_eq!(test.token.balance(&ticket.child_address), 10);
    assert_eq!(test.token.balance(&payer), 11);

    // the label is free again and maps to a new child
    test.factory
        .register_code(&test.owner, &child_wasm(&test.env), &3);
    let retry = test
        .factory
        .deploy(&payer, &test.label("bob"), &payer, &None, &11);

    assert_eq!(retry.id, ticket.id + 1);
    assert_eq!(retry.child_id, ticket.child_id);
    assert_ne!(retry.child_address, ticket.child_address);
    assert_eq!(test.advance_all(retry.id), DeploymentStatus::Active);
    assert_eq!(test.factory.get_ticket(&ticket.id).status, DeploymentStatus::Failed);
}

#[test]
fn failed_funding_refunds_the_payer() {
    let test = FactoryTest::setup();
    let payer = test.funded_user(11);
    let ticket = test
        .factory
        .deploy(&payer, &test.label("carol"), &payer, &None, &11);
    assert_eq!(test.factory.advance(&ticket.id), DeploymentStatus::Pending);

    test.token_admin
        .set_authorized(&ticket.child_address, &false);

    assert_eq!(test.factory.advance(&ticket.id), DeploymentStatus::Failed);
    assert_eq!(
        test.factory.get_ticket(&ticket.id).failure,
        Some(FailureReason::FundingFailed)
    );
    assert_eq!(test.token.balance(&payer), 10);
    assert_eq!(test.token.balance(&test.factory.address), 1);
    assert_eq!(test.factory.reserved_balance(), 0);
    assert_eq!(test.factory.get_stranded_funds().len(), 0);
    assert_eq!(test.factory.available_balance(), 1);
}

#[test]
fn refund_failure_is_recorded_against_the_factory() {
    let test = FactoryTest::setup();
    let payer = test.funded_user(11);
    let ticket = test
        .factory
        .deploy(&payer, &test.label("dave"), &payer, &None, &11);
    assert_eq!(test.factory.advance(&ticket.id), DeploymentStatus::Pending);

    test.token_admin
        .set_authorized(&test.factory.address, &false);

    assert_eq!(test.factory.advance(&ticket.id), DeploymentStatus::Failed);
    assert_eq!(test.token.balance(&payer), 0);
    assert_eq!(test.factory.reserved_balance(), 0);

    let stranded = test.factory.get_stranded_funds();
    assert_eq!(stranded.len(), 1);
    assert_eq!(stranded.get(0).unwrap().holder, test.factory.address);
    assert_eq!(stranded.get(0).unwrap().amount, 10);
}

#[test]
fn stale_deployments_are_swept_after_the_timeout() {
    let test = FactoryTest::setup();
    test.env.ledger().with_mut(|li| li.sequence_number = 10);
    let payer = test.funded_user(22);

    let stale = test
        .factory
        .deploy(&payer, &test.label("stale"), &payer, &None, &11);
    let done = test
        .factory
        .deploy(&payer, &test.label("done"), &payer, &None, &11);
    assert_eq!(test.advance_all(done.id), DeploymentStatus::Active);

    test.env
        .ledger()
        .with_mut(|li| li.sequence_number = 10 + PENDING_TIMEOUT_LEDGERS);
    assert_eq!(test.factory.sweep_stale(&test.owner, &10), 0);
    assert_eq!(
        test.factory.get_deployment(&stale.child_id).status,
        DeploymentStatus::Pending
    );

    test.env
        .ledger()
        .with_mut(|li| li.sequence_number = 11 + PENDING_TIMEOUT_LEDGERS);
    assert_eq!(test.factory.sweep_stale(&test.owner, &10), 1);

    let state = test.factory.get_ticket(&stale.id);
    assert_eq!(state.status, DeploymentStatus::Failed);
    assert_eq!(state.failure, Some(FailureReason::TimedOut));
    assert_eq!(
        test.factory.try_get_deployment(&stale.child_id),
        Err(Ok(FactoryError::NotFound))
    );
    assert_eq!(test.token.balance(&payer), 10);
    assert_eq!(test.factory.reserved_balance(), 0);

    // the chain can not be resumed once swept
    assert_eq!(test.factory.advance(&stale.id), DeploymentStatus::Failed);
    assert_eq!(test.factory.sweep_stale(&test.owner, &10), 0);
    assert_eq!(
        test.factory.get_deployment(&done.child_id).status,
        DeploymentStatus::Active
    );
}

#[test]
fn sweep_honours_the_limit() {
    let test = FactoryTest::setup();
    let payer = test.funded_user(33);
    for label in ["one", "two", "three"] {
        test.factory
            .deploy(&payer, &test.label(label), &payer, &None, &11);
    }

    test.env
        .ledger()
        .with_mut(|li| li.sequence_number += PENDING_TIMEOUT_LEDGERS + 1);

    assert_eq!(test.factory.sweep_stale(&test.owner, &2), 2);
    assert_eq!(test.factory.deployment_count(), 1);
    assert_eq!(test.factory.sweep_stale(&test.owner, &2), 1);
    assert_eq!(test.factory.deployment_count(), 0);
    assert_eq!(test.token.balance(&payer), 30);
}

#[test]
fn sweep_reaches_stale_records_behind_many_active_ones() {
    let test = FactoryTest::setup();
    let count = MAX_PAGE_SIZE + 5;
    let payer = test.funded_user(11 * (count as i128 + 1));

    for i in 0..count {
        let ticket = test
            .factory
            .deploy(&payer, &test.indexed_label(i), &payer, &None, &11);
        assert_eq!(test.advance_all(ticket.id), DeploymentStatus::Active);
    }
    let stale = test
        .factory
        .deploy(&payer, &test.label("late"), &payer, &None, &11);

    test.env
        .ledger()
        .with_mut(|li| li.sequence_number += PENDING_TIMEOUT_LEDGERS + 1);

    assert_eq!(test.factory.sweep_stale(&test.owner, &1), 1);
    let state = test.factory.get_ticket(&stale.id);
    assert_eq!(state.status, DeploymentStatus::Failed);
    assert_eq!(state.failure, Some(FailureReason::TimedOut));
    assert_eq!(test.factory.deployment_count(), count);
    assert_eq!(test.factory.list_active(&0, &count).len(), MAX_PAGE_SIZE);
}

#[test]
fn removed_records_leave_no_gap_in_the_index() {
    let test = FactoryTest::setup();
    let payer = test.funded_user(44);

    let alpha = test
        .factory
        .deploy(&payer, &test.label("alpha"), &payer, &None, &11);
    test.advance_all(alpha.id);
    let beta = test
        .factory
        .deploy(&payer, &test.label("beta"), &payer, &None, &11);
    let gamma = test
        .factory
        .deploy(&payer, &test.label("gamma"), &payer, &None, &11);
    test.advance_all(gamma.id);

    test.env
        .ledger()
        .with_mut(|li| li.sequence_number += PENDING_TIMEOUT_LEDGERS + 1);
    assert_eq!(test.factory.sweep_stale(&test.owner, &10), 1);
    assert_eq!(test.factory.get_ticket(&beta.id).status, DeploymentStatus::Failed);

    // the last id moved into the freed slot
    assert_eq!(test.factory.deployment_count(), 2);
    assert_eq!(
        test.factory.get_deployment_by_index(&0).child_id,
        alpha.child_id
    );
    assert_eq!(
        test.factory.get_deployment_by_index(&1).child_id,
        gamma.child_id
    );
    assert_eq!(
        test.factory.try_get_deployment_by_index(&2),
        Err(Ok(FactoryError::NotFound))
    );
    assert_eq!(test.factory.list_deployments(&0, &10).len(), 2);

    // the label is free and its new record takes the next slot
    let retry = test
        .factory
        .deploy(&payer, &test.label("beta"), &payer, &None, &11);
    assert_eq!(test.factory.deployment_count(), 3);
    assert_eq!(
        test.factory.get_deployment_by_index(&2).child_id,
        retry.child_id
    );
}
