use soroban_sdk::{log, token, Address, Env};

use crate::{
    errors::FactoryError,
    events::FactoryEvents,
    storage::{
        get_deployment, get_ticket, index_remove, push_stranded_funds, release_reserved,
        remove_deployment, save_deployment, save_ticket,
    },
    storage_types::{
        Config, DeploymentRecord, DeploymentStatus, DeploymentStep, FailureReason, IndexKind,
        StrandedFunds,
    },
};

/// Completion signal of a deployment chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentOutcome {
    Succeeded,
    Failed(FailureReason),
}

/// Applies `outcome` to the pending deployment behind `ticket` and returns the
/// resulting ticket status.
///
/// Signals for a ticket that is already terminal, or whose record is gone or
/// now belongs to a later ticket for the same label, leave state untouched.
pub fn reconcile(
    env: &Env,
    config: &Config,
    ticket: u64,
    outcome: DeploymentOutcome,
) -> Result<DeploymentStatus, FactoryError> {
    let mut state = get_ticket(env, ticket).ok_or(FactoryError::NotFound)?;
    if state.status != DeploymentStatus::Pending {
        log!(env, "Factory: Reconcile: ticket {} already resolved", ticket);
        return Ok(state.status);
    }

    let record = match get_deployment(env, &state.child_id) {
        Some(record) if record.ticket == ticket && record.status == DeploymentStatus::Pending => {
            record
        }
        _ => return Ok(state.status),
    };

    match outcome {
        DeploymentOutcome::Succeeded => {
            let mut record = record;
            record.status = DeploymentStatus::Active;
            record.next_step = DeploymentStep::Complete;
            save_deployment(env, &record);
            index_remove(env, IndexKind::Pending, &record.child_id);

            state.status = DeploymentStatus::Active;
            save_ticket(env, &state);

            FactoryEvents::deployment_active(env, ticket, record.child_id, record.child_address);
        }
        DeploymentOutcome::Failed(reason) => {
            let refunded = settle_failed_funds(env, config, &record);

            remove_deployment(env, &record.child_id);

            state.status = DeploymentStatus::Failed;
            state.failure = Some(reason);
            save_ticket(env, &state);

            FactoryEvents::deployment_failed(env, ticket, record.child_id, reason, refunded);
        }
    }

    Ok(state.status)
}

/// Returns the initial balance of a failed deployment to its payer when the
/// factory still holds it, otherwise records where it was left. The fee is
/// never returned. Yields the refunded amount.
fn settle_failed_funds(env: &Env, config: &Config, record: &DeploymentRecord) -> i128 {
    let amount = record.initial_balance;
    if amount == 0 {
        return 0;
    }

    let factory = env.current_contract_address();
    let holder = match record.next_step {
        DeploymentStep::Deploy | DeploymentStep::Fund => {
            release_reserved(env, amount);

            let refund = token::Client::new(env, &config.payment_token).try_transfer(
                &factory,
                &record.payer,
                &amount,
            );
            if matches!(refund, Ok(Ok(_))) {
                return amount;
            }
            log!(
                env,
                "Factory: Reconcile: refund of ticket {} to payer failed",
                record.ticket
            );
            factory
        }
        DeploymentStep::Initialize | DeploymentStep::Complete => record.child_address.clone(),
    };

    strand(env, record, holder, amount);
    0
}

fn strand(env: &Env, record: &DeploymentRecord, holder: Address, amount: i128) {
    push_stranded_funds(
        env,
        StrandedFunds {
            ticket: record.ticket,
            child_id: record.child_id.clone(),
            holder: holder.clone(),
            payer: record.payer.clone(),
            amount,
            ledger: env.ledger().sequence(),
        },
    );

    FactoryEvents::funds_stranded(env, record.ticket, holder, record.payer.clone(), amount);
}
