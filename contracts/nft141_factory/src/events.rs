use soroban_sdk::{Address, BytesN, Env, String, Symbol};

use crate::storage_types::{DeploymentStep, FailureReason, FeeSchedule};

pub struct FactoryEvents {}

impl FactoryEvents {
    /// Emitted when the factory is initialized
    ///
    /// - topics - `["initialize", owner: Address]`
    /// - data - `[payment_token: Address, account_suffix: String]`
    pub fn initialize(env: &Env, owner: Address, payment_token: Address, account_suffix: String) {
        let topics = (Symbol::new(env, "initialize"), owner);
        env.events().publish(topics, (payment_token, account_suffix));
    }

    /// Emitted when a new child code version is registered
    ///
    /// - topics - `["code_registered", version: u32]`
    /// - data - `[wasm_hash: BytesN<32>, size: u32]`
    pub fn code_registered(env: &Env, version: u32, wasm_hash: BytesN<32>, size: u32) {
        let topics = (Symbol::new(env, "code_registered"), version);
        env.events().publish(topics, (wasm_hash, size));
    }

    /// Emitted when the owner enables or disables a code version
    ///
    /// - topics - `["code_enabled", version: u32]`
    /// - data - `enabled: bool`
    pub fn code_enabled(env: &Env, version: u32, enabled: bool) {
        let topics = (Symbol::new(env, "code_enabled"), version);
        env.events().publish(topics, enabled);
    }

    /// Emitted when a deployment has been paid for and recorded as pending
    ///
    /// - topics - `["deploy_requested", ticket: u64, child_id: String]`
    /// - data - `[child_address: Address, payer: Address, initial_balance: i128, fee: i128]`
    pub fn deployment_requested(
        env: &Env,
        ticket: u64,
        child_id: String,
        child_address: Address,
        payer: Address,
        initial_balance: i128,
        fee: i128,
    ) {
        let topics = (Symbol::new(env, "deploy_requested"), ticket, child_id);
        env.events()
            .publish(topics, (child_address, payer, initial_balance, fee));
    }

    /// Emitted after a step of the deployment chain has been carried out
    ///
    /// - topics - `["deploy_step", ticket: u64]`
    /// - data - `next_step: DeploymentStep`
    pub fn deployment_step(env: &Env, ticket: u64, next_step: DeploymentStep) {
        let topics = (Symbol::new(env, "deploy_step"), ticket);
        env.events().publish(topics, next_step);
    }

    /// Emitted when a child finished initializing
    ///
    /// - topics - `["deploy_active", ticket: u64, child_id: String]`
    /// - data - `child_address: Address`
    pub fn deployment_active(env: &Env, ticket: u64, child_id: String, child_address: Address) {
        let topics = (Symbol::new(env, "deploy_active"), ticket, child_id);
        env.events().publish(topics, child_address);
    }

    /// Emitted when a deployment is abandoned and its record removed
    ///
    /// - topics - `["deploy_failed", ticket: u64, child_id: String]`
    /// - data - `[reason: FailureReason, refunded: i128]`
    pub fn deployment_failed(
        env: &Env,
        ticket: u64,
        child_id: String,
        reason: FailureReason,
        refunded: i128,
    ) {
        let topics = (Symbol::new(env, "deploy_failed"), ticket, child_id);
        env.events().publish(topics, (reason, refunded));
    }

    /// Emitted when the initial balance of a failed deployment could not be returned
    ///
    /// - topics - `["funds_stranded", ticket: u64]`
    /// - data - `[holder: Address, payer: Address, amount: i128]`
    pub fn funds_stranded(env: &Env, ticket: u64, holder: Address, payer: Address, amount: i128) {
        let topics = (Symbol::new(env, "funds_stranded"), ticket);
        env.events().publish(topics, (holder, payer, amount));
    }

    /// Emitted after the owner swept timed out deployments
    ///
    /// - topics - `["stale_swept", caller: Address]`
    /// - data - `swept: u32`
    pub fn stale_swept(env: &Env, caller: Address, swept: u32) {
        let topics = (Symbol::new(env, "stale_swept"), caller);
        env.events().publish(topics, swept);
    }

    /// Emitted when the owner changes the fee schedule
    ///
    /// - topics - `["fee_schedule"]`
    /// - data - `fee_schedule: FeeSchedule`
    pub fn fee_schedule(env: &Env, fee_schedule: FeeSchedule) {
        let topics = (Symbol::new(env, "fee_schedule"),);
        env.events().publish(topics, fee_schedule);
    }

    /// Emitted when the owner withdraws accumulated fees
    ///
    /// - topics - `["withdrawal", to: Address]`
    /// - data - `[token: Address, amount: i128]`
    pub fn withdrawal(env: &Env, to: Address, token: Address, amount: i128) {
        let topics = (Symbol::new(env, "withdrawal"), to);
        env.events().publish(topics, (token, amount));
    }

    /// Emitted when ownership of the factory changes hands
    ///
    /// - topics - `["owner_changed", previous_owner: Address]`
    /// - data - `new_owner: Address`
    pub fn ownership_transferred(env: &Env, previous_owner: Address, new_owner: Address) {
        let topics = (Symbol::new(env, "owner_changed"), previous_owner);
        env.events().publish(topics, new_owner);
    }

    /// Emitted when the factory wasm is replaced
    ///
    /// - topics - `["upgrade"]`
    /// - data - `new_wasm_hash: BytesN<32>`
    pub fn upgrade(env: &Env, new_wasm_hash: BytesN<32>) {
        let topics = (Symbol::new(env, "upgrade"),);
        env.events().publish(topics, new_wasm_hash);
    }
}
