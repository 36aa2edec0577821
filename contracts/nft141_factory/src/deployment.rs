use nft141::validate;
use soroban_sdk::{log, token, Address, Env, IntoVal, String, Symbol, Val, Vec};

use crate::{
    code_registry,
    errors::FactoryError,
    events::FactoryEvents,
    reconciler::{reconcile, DeploymentOutcome},
    storage::{
        get_deployment, get_reserved, get_ticket, index_get, index_insert, index_len,
        next_ticket_id, release_reserved, save_deployment, save_reserved, save_ticket,
    },
    storage_types::{
        CodeEntry, Config, DeploymentRecord, DeploymentStatus, DeploymentStep, DeploymentTicket,
        FailureReason, IndexKind, TicketState, CHILD_INIT_FN, MAX_SWEEP_BATCH,
    },
    utils::{child_account_id, child_address, child_salt, validate_label},
};

/// A request that passed every check and may be paid for.
struct DeploymentPlan {
    child_id: String,
    code: CodeEntry,
    fee: i128,
    initial_balance: i128,
}

/// Resolves the code version a deployment uses and checks it may be deployed.
pub fn resolve_code(
    env: &Env,
    config: &Config,
    code_version: Option<u32>,
) -> Result<CodeEntry, FactoryError> {
    let version = code_version.unwrap_or(config.current_code_version);
    let code = code_registry::get(env, version).ok_or_else(|| {
        log!(env, "Factory: Deploy: unknown code version {}", version);
        FactoryError::UnknownCodeVersion
    })?;

    validate!(
        env,
        code_registry::is_deployable(env, config, version),
        FactoryError::CodeVersionDisabled,
        "Factory: Deploy: code version {} is not deployable",
        version
    )?;

    Ok(code)
}

/// Total payment a deployment built from `code` requires.
pub fn quote(config: &Config, code: &CodeEntry) -> Result<i128, FactoryError> {
    config
        .fee_schedule
        .total_due(code.size)
        .ok_or(FactoryError::MathOverflow)
}

fn plan(
    env: &Env,
    config: &Config,
    label: &String,
    code_version: Option<u32>,
    payment: i128,
) -> Result<DeploymentPlan, FactoryError> {
    validate_label(env, label)?;

    let child_id = child_account_id(env, label, &config.account_suffix);
    validate!(
        env,
        get_deployment(env, &child_id).is_none(),
        FactoryError::AlreadyExists,
        "Factory: Deploy: child account already exists"
    )?;

    let code = resolve_code(env, config, code_version)?;
    let total_due = quote(config, &code)?;
    validate!(
        env,
        payment >= total_due,
        FactoryError::InsufficientDeposit,
        "Factory: Deploy: payment {} is below the required {}",
        payment,
        total_due
    )?;

    let fee = config.fee_schedule.deployment_fee;
    Ok(DeploymentPlan {
        child_id,
        code,
        fee,
        initial_balance: payment - fee,
    })
}

/// Validates and pays for a deployment, leaving a `Pending` record whose chain
/// is driven by [`advance`].
pub fn request(
    env: &Env,
    config: &Config,
    payer: &Address,
    label: String,
    child_owner: Address,
    code_version: Option<u32>,
    payment: i128,
) -> Result<DeploymentTicket, FactoryError> {
    let plan = plan(env, config, &label, code_version, payment)?;

    let factory = env.current_contract_address();
    let token = token::Client::new(env, &config.payment_token);

    let reserved = get_reserved(env);
    let new_reserved = reserved
        .checked_add(plan.initial_balance)
        .ok_or(FactoryError::MathOverflow)?;
    let spendable = token
        .balance(&factory)
        .checked_add(payment)
        .and_then(|balance| balance.checked_sub(config.factory_reserve))
        .ok_or(FactoryError::MathOverflow)?;
    validate!(
        env,
        new_reserved <= spendable,
        FactoryError::InsufficientFactoryBalance,
        "Factory: Deploy: factory balance can not cover {} reserved",
        new_reserved
    )?;

    token.transfer(payer, &factory, &payment);

    let ticket = next_ticket_id(env);
    let child_address = child_address(env, child_salt(env, &label, ticket));

    let record = DeploymentRecord {
        child_id: plan.child_id.clone(),
        label,
        child_address: child_address.clone(),
        child_owner,
        payer: payer.clone(),
        code_version: plan.code.version,
        ticket,
        initial_balance: plan.initial_balance,
        fee_paid: plan.fee,
        created_ledger: env.ledger().sequence(),
        created_at: env.ledger().timestamp(),
        status: DeploymentStatus::Pending,
        next_step: DeploymentStep::Deploy,
    };
    save_deployment(env, &record);
    index_insert(env, IndexKind::Deployments, &record.child_id);
    index_insert(env, IndexKind::Pending, &record.child_id);
    save_ticket(
        env,
        &TicketState {
            ticket,
            child_id: plan.child_id.clone(),
            child_address: child_address.clone(),
            status: DeploymentStatus::Pending,
            failure: None,
        },
    );
    save_reserved(env, new_reserved);

    FactoryEvents::deployment_requested(
        env,
        ticket,
        plan.child_id.clone(),
        child_address.clone(),
        payer.clone(),
        plan.initial_balance,
        plan.fee,
    );

    Ok(DeploymentTicket {
        id: ticket,
        child_id: plan.child_id,
        child_address,
    })
}

/// Runs the next step of the chain behind `ticket`. Once the chain resolved,
/// further calls only report the final status.
pub fn advance(env: &Env, config: &Config, ticket: u64) -> Result<DeploymentStatus, FactoryError> {
    let state = get_ticket(env, ticket).ok_or(FactoryError::NotFound)?;
    if state.status != DeploymentStatus::Pending {
        return Ok(state.status);
    }

    let mut record = match get_deployment(env, &state.child_id) {
        Some(record) if record.ticket == ticket => record,
        _ => return Ok(state.status),
    };

    match record.next_step {
        DeploymentStep::Deploy => deploy_child(env, &mut record),
        DeploymentStep::Fund => fund_child(env, config, &mut record),
        DeploymentStep::Initialize => initialize_child(env, config, &record),
        DeploymentStep::Complete => reconcile(env, config, ticket, DeploymentOutcome::Succeeded),
    }
}

fn deploy_child(env: &Env, record: &mut DeploymentRecord) -> Result<DeploymentStatus, FactoryError> {
    let code = code_registry::get(env, record.code_version).ok_or(FactoryError::UnknownCodeVersion)?;

    let deployed = env
        .deployer()
        .with_current_contract(child_salt(env, &record.label, record.ticket))
        .deploy_v2(code.wasm_hash, ());
    validate!(
        env,
        deployed == record.child_address,
        FactoryError::DeploymentFailed,
        "Factory: Advance: child deployed at an unexpected address"
    )?;

    move_to(env, record, DeploymentStep::Fund)
}

fn fund_child(
    env: &Env,
    config: &Config,
    record: &mut DeploymentRecord,
) -> Result<DeploymentStatus, FactoryError> {
    if record.initial_balance > 0 {
        let transfer = token::Client::new(env, &config.payment_token).try_transfer(
            &env.current_contract_address(),
            &record.child_address,
            &record.initial_balance,
        );
        if !matches!(transfer, Ok(Ok(_))) {
            log!(env, "Factory: Advance: funding ticket {} failed", record.ticket);
            return reconcile(
                env,
                config,
                record.ticket,
                DeploymentOutcome::Failed(FailureReason::FundingFailed),
            );
        }
        release_reserved(env, record.initial_balance);
    }

    move_to(env, record, DeploymentStep::Initialize)
}

fn initialize_child(
    env: &Env,
    config: &Config,
    record: &DeploymentRecord,
) -> Result<DeploymentStatus, FactoryError> {
    let init_args: Vec<Val> = (record.child_owner.clone(),).into_val(env);
    let result = env.try_invoke_contract::<Val, FactoryError>(
        &record.child_address,
        &Symbol::new(env, CHILD_INIT_FN),
        init_args,
    );

    let outcome = if matches!(result, Ok(Ok(_))) {
        DeploymentOutcome::Succeeded
    } else {
        log!(env, "Factory: Advance: init of ticket {} failed", record.ticket);
        DeploymentOutcome::Failed(FailureReason::InitFailed)
    };

    reconcile(env, config, record.ticket, outcome)
}

fn move_to(
    env: &Env,
    record: &mut DeploymentRecord,
    next_step: DeploymentStep,
) -> Result<DeploymentStatus, FactoryError> {
    record.next_step = next_step;
    save_deployment(env, record);
    FactoryEvents::deployment_step(env, record.ticket, next_step);

    Ok(record.status)
}

/// Examines at most `limit` pending deployments, capped at `MAX_SWEEP_BATCH`,
/// and fails the ones older than the configured timeout. Returns how many were
/// failed.
pub fn sweep_stale(env: &Env, config: &Config, limit: u32) -> Result<u32, FactoryError> {
    let now = env.ledger().sequence();
    let budget = limit.min(MAX_SWEEP_BATCH);
    let mut len = index_len(env, IndexKind::Pending);
    let mut slot = 0u32;
    let mut examined = 0u32;
    let mut swept = 0u32;

    while slot < len && examined < budget {
        examined += 1;
        let Some(record) = index_get(env, IndexKind::Pending, slot)
            .and_then(|child_id| get_deployment(env, &child_id))
        else {
            slot += 1;
            continue;
        };
        if now.saturating_sub(record.created_ledger) <= config.pending_timeout_ledgers {
            slot += 1;
            continue;
        }

        reconcile(
            env,
            config,
            record.ticket,
            DeploymentOutcome::Failed(FailureReason::TimedOut),
        )?;
        swept += 1;

        // a freed slot now holds the last pending id, examine it next
        let remaining = index_len(env, IndexKind::Pending);
        if remaining == len {
            slot += 1;
        }
        len = remaining;
    }

    Ok(swept)
}
