use soroban_sdk::{Address, Bytes, BytesN, Env, String, Symbol, Val, Vec};

use crate::{
    errors::FactoryError,
    storage_types::{
        CodeEntry, Config, DeploymentRecord, DeploymentStatus, DeploymentTicket, FeeSchedule,
        OwnershipTransfer, StrandedFunds, TicketState,
    },
};

pub trait Nft141FactoryTrait {
    #[allow(clippy::too_many_arguments)]
    fn initialize(
        env: Env,
        owner: Address,
        payment_token: Address,
        account_suffix: String,
        fee_schedule: FeeSchedule,
        factory_reserve: i128,
        pending_timeout_ledgers: u32,
    ) -> Result<(), FactoryError>;

    /// Pays for a new child `<label>.<account_suffix>` and records it as
    /// pending. The returned ticket is driven to completion with `advance`.
    fn deploy(
        env: Env,
        payer: Address,
        label: String,
        child_owner: Address,
        code_version: Option<u32>,
        payment: i128,
    ) -> Result<DeploymentTicket, FactoryError>;

    /// Runs the next step of a pending deployment. Anyone may call it.
    fn advance(env: Env, ticket: u64) -> Result<DeploymentStatus, FactoryError>;

    fn register_code(
        env: Env,
        caller: Address,
        wasm: Bytes,
        version: u32,
    ) -> Result<CodeEntry, FactoryError>;

    fn set_code_enabled(
        env: Env,
        caller: Address,
        version: u32,
        enabled: bool,
    ) -> Result<(), FactoryError>;

    fn set_fee_schedule(
        env: Env,
        caller: Address,
        fee_schedule: FeeSchedule,
    ) -> Result<(), FactoryError>;

    /// Sends collected fees to `to`. Reserved balances and the factory's own
    /// reserve can not be withdrawn.
    fn withdraw(env: Env, caller: Address, to: Address, amount: i128) -> Result<(), FactoryError>;

    fn transfer_ownership(
        env: Env,
        caller: Address,
        new_owner: Address,
    ) -> Result<(), FactoryError>;

    /// Fails pending deployments past the timeout, at most `limit` of them.
    fn sweep_stale(env: Env, caller: Address, limit: u32) -> Result<u32, FactoryError>;

    /// Forwards a privileged call to an active child.
    fn call_child(
        env: Env,
        caller: Address,
        child_id: String,
        function: Symbol,
        args: Vec<Val>,
    ) -> Result<Val, FactoryError>;

    fn upgrade(env: Env, caller: Address, new_wasm_hash: BytesN<32>) -> Result<(), FactoryError>;

    // ################################################################
    //                             Queries
    // ################################################################

    fn get_deployment(env: Env, child_id: String) -> Result<DeploymentRecord, FactoryError>;

    fn list_deployments(env: Env, start: u32, limit: u32) -> Vec<DeploymentRecord>;

    fn list_active(env: Env, start: u32, limit: u32) -> Vec<DeploymentRecord>;

    fn deployment_count(env: Env) -> u32;

    fn get_deployment_by_index(env: Env, index: u32) -> Result<DeploymentRecord, FactoryError>;

    fn get_ticket(env: Env, ticket: u64) -> Result<TicketState, FactoryError>;

    fn child_address(env: Env, ticket: u64) -> Result<Address, FactoryError>;

    fn get_code(env: Env, version: u32) -> Option<CodeEntry>;

    fn current_version(env: Env) -> Result<u32, FactoryError>;

    fn is_code_deployable(env: Env, version: u32) -> Result<bool, FactoryError>;

    fn storage_deposit(env: Env, code_size: u32) -> Result<i128, FactoryError>;

    fn quote_deployment(env: Env, code_version: Option<u32>) -> Result<i128, FactoryError>;

    fn query_config(env: Env) -> Result<Config, FactoryError>;

    fn get_owner(env: Env) -> Result<Address, FactoryError>;

    fn reserved_balance(env: Env) -> i128;

    fn available_balance(env: Env) -> Result<i128, FactoryError>;

    fn get_stranded_funds(env: Env) -> Vec<StrandedFunds>;

    fn get_ownership_history(env: Env) -> Vec<OwnershipTransfer>;

    fn storage_version(env: Env) -> u32;
}
