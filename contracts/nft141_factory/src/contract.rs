use nft141::validate;
use soroban_sdk::{
    contract, contractimpl, contractmeta, log, token, Address, Bytes, BytesN, Env, String,
    Symbol, Val, Vec,
};

use crate::{
    access::require_owner,
    code_registry, deployment,
    errors::FactoryError,
    events::FactoryEvents,
    factory::Nft141FactoryTrait,
    storage::{
        bump_instance, get_config, get_deployment, get_ownership_log, get_reserved,
        get_storage_version, get_stranded_funds, get_ticket, index_get, index_len,
        is_initialized, page_deployments, push_ownership_transfer, save_config, set_initialized,
        set_storage_version,
    },
    storage_types::{
        CodeEntry, Config, DeploymentRecord, DeploymentStatus, DeploymentTicket, FeeSchedule,
        IndexKind, OwnershipTransfer, StrandedFunds, TicketState, STORAGE_VERSION,
    },
    utils::validate_account_suffix,
};

contractmeta!(
    key = "Description",
    val = "Factory deploying and tracking NFT141 child token contracts"
);

#[contract]
pub struct Nft141Factory;

#[contractimpl]
impl Nft141FactoryTrait for Nft141Factory {
    #[allow(clippy::too_many_arguments)]
    fn initialize(
        env: Env,
        owner: Address,
        payment_token: Address,
        account_suffix: String,
        fee_schedule: FeeSchedule,
        factory_reserve: i128,
        pending_timeout_ledgers: u32,
    ) -> Result<(), FactoryError> {
        validate!(
            &env,
            !is_initialized(&env),
            FactoryError::AlreadyInitialized,
            "Factory: Initialize: initializing contract twice is not allowed"
        )?;
        validate_account_suffix(&env, &account_suffix)?;
        validate!(
            &env,
            fee_schedule.is_valid() && factory_reserve >= 0,
            FactoryError::InvalidConfig,
            "Factory: Initialize: fees and reserve must not be negative"
        )?;

        set_initialized(&env);
        set_storage_version(&env, STORAGE_VERSION);
        save_config(
            &env,
            &Config {
                owner: owner.clone(),
                payment_token: payment_token.clone(),
                account_suffix: account_suffix.clone(),
                fee_schedule,
                factory_reserve,
                pending_timeout_ledgers,
                current_code_version: 0,
            },
        );
        bump_instance(&env);

        FactoryEvents::initialize(&env, owner, payment_token, account_suffix);

        Ok(())
    }

    fn deploy(
        env: Env,
        payer: Address,
        label: String,
        child_owner: Address,
        code_version: Option<u32>,
        payment: i128,
    ) -> Result<DeploymentTicket, FactoryError> {
        payer.require_auth();
        bump_instance(&env);

        let config = get_config(&env)?;

        deployment::request(
            &env,
            &config,
            &payer,
            label,
            child_owner,
            code_version,
            payment,
        )
    }

    fn advance(env: Env, ticket: u64) -> Result<DeploymentStatus, FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;

        deployment::advance(&env, &config, ticket)
    }

    fn register_code(
        env: Env,
        caller: Address,
        wasm: Bytes,
        version: u32,
    ) -> Result<CodeEntry, FactoryError> {
        bump_instance(&env);

        let mut config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        let entry = code_registry::register(&env, &mut config, wasm, version)?;
        save_config(&env, &config);

        FactoryEvents::code_registered(&env, entry.version, entry.wasm_hash.clone(), entry.size);

        Ok(entry)
    }

    fn set_code_enabled(
        env: Env,
        caller: Address,
        version: u32,
        enabled: bool,
    ) -> Result<(), FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        code_registry::set_enabled(&env, version, enabled)?;

        FactoryEvents::code_enabled(&env, version, enabled);

        Ok(())
    }

    fn set_fee_schedule(
        env: Env,
        caller: Address,
        fee_schedule: FeeSchedule,
    ) -> Result<(), FactoryError> {
        bump_instance(&env);

        let mut config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        validate!(
            &env,
            fee_schedule.is_valid(),
            FactoryError::InvalidConfig,
            "Factory: Set fee schedule: fees must not be negative"
        )?;

        config.fee_schedule = fee_schedule.clone();
        save_config(&env, &config);

        FactoryEvents::fee_schedule(&env, fee_schedule);

        Ok(())
    }

    fn withdraw(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        validate!(
            &env,
            amount > 0,
            FactoryError::InvalidAmount,
            "Factory: Withdraw: amount must be positive"
        )?;

        let available = withdrawable(&env, &config)?;
        validate!(
            &env,
            amount <= available,
            FactoryError::InsufficientFactoryBalance,
            "Factory: Withdraw: only {} can be withdrawn",
            available
        )?;

        token::Client::new(&env, &config.payment_token).transfer(
            &env.current_contract_address(),
            &to,
            &amount,
        );

        FactoryEvents::withdrawal(&env, to, config.payment_token, amount);

        Ok(())
    }

    fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), FactoryError> {
        bump_instance(&env);

        let mut config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        let previous_owner = config.owner.clone();
        config.owner = new_owner.clone();
        save_config(&env, &config);

        push_ownership_transfer(
            &env,
            OwnershipTransfer {
                previous_owner: previous_owner.clone(),
                new_owner: new_owner.clone(),
                ledger: env.ledger().sequence(),
                timestamp: env.ledger().timestamp(),
            },
        );

        FactoryEvents::ownership_transferred(&env, previous_owner, new_owner);

        Ok(())
    }

    fn sweep_stale(env: Env, caller: Address, limit: u32) -> Result<u32, FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        let swept = deployment::sweep_stale(&env, &config, limit)?;
        log!(&env, "Factory: Sweep stale: {} deployments timed out", swept);

        FactoryEvents::stale_swept(&env, caller, swept);

        Ok(swept)
    }

    fn call_child(
        env: Env,
        caller: Address,
        child_id: String,
        function: Symbol,
        args: Vec<Val>,
    ) -> Result<Val, FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        let record = get_deployment(&env, &child_id).ok_or(FactoryError::NotFound)?;
        validate!(
            &env,
            record.status == DeploymentStatus::Active,
            FactoryError::ChildNotActive,
            "Factory: Call child: child is not active yet"
        )?;

        Ok(env.invoke_contract::<Val>(&record.child_address, &function, args))
    }

    fn upgrade(env: Env, caller: Address, new_wasm_hash: BytesN<32>) -> Result<(), FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;
        require_owner(&env, &config, &caller)?;

        env.deployer()
            .update_current_contract_wasm(new_wasm_hash.clone());

        FactoryEvents::upgrade(&env, new_wasm_hash);

        Ok(())
    }

    // ################################################################
    //                             Queries
    // ################################################################

    fn get_deployment(env: Env, child_id: String) -> Result<DeploymentRecord, FactoryError> {
        bump_instance(&env);
        get_deployment(&env, &child_id).ok_or(FactoryError::NotFound)
    }

    fn list_deployments(env: Env, start: u32, limit: u32) -> Vec<DeploymentRecord> {
        bump_instance(&env);
        page_deployments(&env, start, limit, None)
    }

    fn list_active(env: Env, start: u32, limit: u32) -> Vec<DeploymentRecord> {
        bump_instance(&env);
        page_deployments(&env, start, limit, Some(DeploymentStatus::Active))
    }

    fn deployment_count(env: Env) -> u32 {
        bump_instance(&env);
        index_len(&env, IndexKind::Deployments)
    }

    fn get_deployment_by_index(env: Env, index: u32) -> Result<DeploymentRecord, FactoryError> {
        bump_instance(&env);
        index_get(&env, IndexKind::Deployments, index)
            .and_then(|child_id| get_deployment(&env, &child_id))
            .ok_or(FactoryError::NotFound)
    }

    fn get_ticket(env: Env, ticket: u64) -> Result<TicketState, FactoryError> {
        bump_instance(&env);
        get_ticket(&env, ticket).ok_or(FactoryError::NotFound)
    }

    fn child_address(env: Env, ticket: u64) -> Result<Address, FactoryError> {
        bump_instance(&env);

        let state = get_ticket(&env, ticket).ok_or(FactoryError::NotFound)?;
        match state.status {
            DeploymentStatus::Active => Ok(state.child_address),
            DeploymentStatus::Pending => Err(FactoryError::DeploymentPending),
            DeploymentStatus::Failed => Err(FactoryError::DeploymentFailed),
        }
    }

    fn get_code(env: Env, version: u32) -> Option<CodeEntry> {
        bump_instance(&env);
        code_registry::get(&env, version)
    }

    fn current_version(env: Env) -> Result<u32, FactoryError> {
        bump_instance(&env);
        Ok(get_config(&env)?.current_code_version)
    }

    fn is_code_deployable(env: Env, version: u32) -> Result<bool, FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;

        Ok(code_registry::is_deployable(&env, &config, version))
    }

    fn storage_deposit(env: Env, code_size: u32) -> Result<i128, FactoryError> {
        bump_instance(&env);

        get_config(&env)?
            .fee_schedule
            .storage_deposit(code_size)
            .ok_or(FactoryError::MathOverflow)
    }

    fn quote_deployment(env: Env, code_version: Option<u32>) -> Result<i128, FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;
        let code = deployment::resolve_code(&env, &config, code_version)?;

        deployment::quote(&config, &code)
    }

    fn query_config(env: Env) -> Result<Config, FactoryError> {
        bump_instance(&env);
        get_config(&env)
    }

    fn get_owner(env: Env) -> Result<Address, FactoryError> {
        bump_instance(&env);
        Ok(get_config(&env)?.owner)
    }

    fn reserved_balance(env: Env) -> i128 {
        bump_instance(&env);
        get_reserved(&env)
    }

    fn available_balance(env: Env) -> Result<i128, FactoryError> {
        bump_instance(&env);

        let config = get_config(&env)?;

        withdrawable(&env, &config)
    }

    fn get_stranded_funds(env: Env) -> Vec<StrandedFunds> {
        bump_instance(&env);
        get_stranded_funds(&env)
    }

    fn get_ownership_history(env: Env) -> Vec<OwnershipTransfer> {
        bump_instance(&env);
        get_ownership_log(&env)
    }

    fn storage_version(env: Env) -> u32 {
        bump_instance(&env);
        get_storage_version(&env)
    }
}

/// Factory balance not owed to pending deployments nor kept as its own reserve.
fn withdrawable(env: &Env, config: &Config) -> Result<i128, FactoryError> {
    let balance = token::Client::new(env, &config.payment_token).balance(&env.current_contract_address());

    balance
        .checked_sub(get_reserved(env))
        .and_then(|available| available.checked_sub(config.factory_reserve))
        .map(|available| available.max(0))
        .ok_or(FactoryError::MathOverflow)
}
