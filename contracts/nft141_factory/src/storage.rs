use nft141::ttl::{
    INSTANCE_BUMP_AMOUNT, INSTANCE_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT,
    PERSISTENT_LIFETIME_THRESHOLD,
};
use soroban_sdk::{log, Env, String, Vec};

use crate::{
    errors::FactoryError,
    storage_types::{
        CodeEntry, Config, DataKey, DeploymentRecord, DeploymentStatus, IndexKind,
        OwnershipTransfer, StrandedFunds, TicketState, MAX_PAGE_SIZE,
    },
};

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

fn bump_if_present(env: &Env, key: &DataKey) {
    if env.storage().persistent().has(key) {
        bump_persistent(env, key);
    }
}

// ################################################################
//                             Config
// ################################################################

pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::Initialized)
        .unwrap_or(false)
}

pub fn set_initialized(env: &Env) {
    env.storage().persistent().set(&DataKey::Initialized, &true);
    bump_persistent(env, &DataKey::Initialized);
}

pub fn save_config(env: &Env, config: &Config) {
    env.storage().persistent().set(&DataKey::Config, config);
    bump_persistent(env, &DataKey::Config);
}

pub fn get_config(env: &Env) -> Result<Config, FactoryError> {
    let config: Config = env
        .storage()
        .persistent()
        .get(&DataKey::Config)
        .ok_or_else(|| {
            log!(env, "Factory: Config not set");
            FactoryError::NotInitialized
        })?;
    bump_persistent(env, &DataKey::Config);

    Ok(config)
}

pub fn set_storage_version(env: &Env, version: u32) {
    env.storage()
        .persistent()
        .set(&DataKey::StorageVersion, &version);
    bump_persistent(env, &DataKey::StorageVersion);
}

pub fn get_storage_version(env: &Env) -> u32 {
    bump_if_present(env, &DataKey::StorageVersion);
    env.storage()
        .persistent()
        .get(&DataKey::StorageVersion)
        .unwrap_or(0)
}

// ################################################################
//                             Code
// ################################################################

pub fn save_code_entry(env: &Env, entry: &CodeEntry) {
    let key = DataKey::Code(entry.version);
    env.storage().persistent().set(&key, entry);
    bump_persistent(env, &key);
}

pub fn get_code_entry(env: &Env, version: u32) -> Option<CodeEntry> {
    let key = DataKey::Code(version);
    bump_if_present(env, &key);
    env.storage().persistent().get(&key)
}

/// Explicit owner decision on a version, `None` when never overridden.
pub fn get_code_enabled(env: &Env, version: u32) -> Option<bool> {
    let key = DataKey::CodeEnabled(version);
    bump_if_present(env, &key);
    env.storage().persistent().get(&key)
}

pub fn save_code_enabled(env: &Env, version: u32, enabled: bool) {
    let key = DataKey::CodeEnabled(version);
    env.storage().persistent().set(&key, &enabled);
    bump_persistent(env, &key);
}

// ################################################################
//                             Ledger
// ################################################################

pub fn get_deployment(env: &Env, child_id: &String) -> Option<DeploymentRecord> {
    let key = DataKey::Deployment(child_id.clone());
    bump_if_present(env, &key);
    env.storage().persistent().get(&key)
}

pub fn save_deployment(env: &Env, record: &DeploymentRecord) {
    let key = DataKey::Deployment(record.child_id.clone());
    env.storage().persistent().set(&key, record);
    bump_persistent(env, &key);
}

/// Drops the record together with its slots in every index.
pub fn remove_deployment(env: &Env, child_id: &String) {
    env.storage()
        .persistent()
        .remove(&DataKey::Deployment(child_id.clone()));

    index_remove(env, IndexKind::Deployments, child_id);
    index_remove(env, IndexKind::Pending, child_id);
}

// ################################################################
//                             Indexes
// ################################################################

pub fn index_len(env: &Env, kind: IndexKind) -> u32 {
    let key = DataKey::IndexLen(kind);
    bump_if_present(env, &key);
    env.storage().persistent().get(&key).unwrap_or(0)
}

fn save_index_len(env: &Env, kind: IndexKind, len: u32) {
    let key = DataKey::IndexLen(kind);
    env.storage().persistent().set(&key, &len);
    bump_persistent(env, &key);
}

pub fn index_get(env: &Env, kind: IndexKind, slot: u32) -> Option<String> {
    let key = DataKey::IndexAt(kind, slot);
    bump_if_present(env, &key);
    env.storage().persistent().get(&key)
}

fn save_index_slot(env: &Env, kind: IndexKind, slot: u32, child_id: &String) {
    let at = DataKey::IndexAt(kind, slot);
    env.storage().persistent().set(&at, child_id);
    bump_persistent(env, &at);

    let slot_key = DataKey::IndexSlot(kind, child_id.clone());
    env.storage().persistent().set(&slot_key, &slot);
    bump_persistent(env, &slot_key);
}

/// Appends `child_id` to the index unless it already holds a slot there.
pub fn index_insert(env: &Env, kind: IndexKind, child_id: &String) {
    if env
        .storage()
        .persistent()
        .has(&DataKey::IndexSlot(kind, child_id.clone()))
    {
        return;
    }

    let len = index_len(env, kind);
    save_index_slot(env, kind, len, child_id);
    save_index_len(env, kind, len + 1);
}

/// Frees the slot of `child_id`, moving the last id of the index into it.
pub fn index_remove(env: &Env, kind: IndexKind, child_id: &String) {
    let slot_key = DataKey::IndexSlot(kind, child_id.clone());
    let Some(slot) = env.storage().persistent().get::<DataKey, u32>(&slot_key) else {
        return;
    };
    let last = index_len(env, kind).saturating_sub(1);

    if slot != last {
        if let Some(moved) = index_get(env, kind, last) {
            save_index_slot(env, kind, slot, &moved);
        }
    }

    env.storage()
        .persistent()
        .remove(&DataKey::IndexAt(kind, last));
    env.storage().persistent().remove(&slot_key);
    save_index_len(env, kind, last);
}

/// Records held in slots `start..start + limit` of the deployment index. With
/// `status` set, records of another status in that window are left out.
pub fn page_deployments(
    env: &Env,
    start: u32,
    limit: u32,
    status: Option<DeploymentStatus>,
) -> Vec<DeploymentRecord> {
    let end = start
        .saturating_add(limit.min(MAX_PAGE_SIZE))
        .min(index_len(env, IndexKind::Deployments));
    let mut page = Vec::new(env);

    for slot in start..end {
        let Some(record) = index_get(env, IndexKind::Deployments, slot)
            .and_then(|child_id| get_deployment(env, &child_id))
        else {
            continue;
        };
        if status.is_some_and(|status| record.status != status) {
            continue;
        }
        page.push_back(record);
    }

    page
}

// ################################################################
//                             Tickets
// ################################################################

pub fn next_ticket_id(env: &Env) -> u64 {
    let id = env
        .storage()
        .persistent()
        .get::<DataKey, u64>(&DataKey::TicketCounter)
        .unwrap_or(0)
        + 1;
    env.storage().persistent().set(&DataKey::TicketCounter, &id);
    bump_persistent(env, &DataKey::TicketCounter);

    id
}

pub fn get_ticket(env: &Env, ticket: u64) -> Option<TicketState> {
    let key = DataKey::Ticket(ticket);
    bump_if_present(env, &key);
    env.storage().persistent().get(&key)
}

pub fn save_ticket(env: &Env, state: &TicketState) {
    let key = DataKey::Ticket(state.ticket);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

// ################################################################
//                             Balances
// ################################################################

/// Initial balances of pending deployments still held by the factory.
pub fn get_reserved(env: &Env) -> i128 {
    bump_if_present(env, &DataKey::Reserved);
    env.storage()
        .persistent()
        .get(&DataKey::Reserved)
        .unwrap_or(0)
}

pub fn save_reserved(env: &Env, reserved: i128) {
    env.storage().persistent().set(&DataKey::Reserved, &reserved);
    bump_persistent(env, &DataKey::Reserved);
}

pub fn release_reserved(env: &Env, amount: i128) {
    let reserved = get_reserved(env).saturating_sub(amount).max(0);
    save_reserved(env, reserved);
}

// ################################################################
//                             Audit
// ################################################################

pub fn get_stranded_funds(env: &Env) -> Vec<StrandedFunds> {
    bump_if_present(env, &DataKey::StrandedFunds);
    env.storage()
        .persistent()
        .get(&DataKey::StrandedFunds)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_stranded_funds(env: &Env, entry: StrandedFunds) {
    let mut entries = get_stranded_funds(env);
    entries.push_back(entry);
    env.storage()
        .persistent()
        .set(&DataKey::StrandedFunds, &entries);
    bump_persistent(env, &DataKey::StrandedFunds);
}

pub fn get_ownership_log(env: &Env) -> Vec<OwnershipTransfer> {
    bump_if_present(env, &DataKey::OwnershipLog);
    env.storage()
        .persistent()
        .get(&DataKey::OwnershipLog)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_ownership_transfer(env: &Env, entry: OwnershipTransfer) {
    let mut entries = get_ownership_log(env);
    entries.push_back(entry);
    env.storage()
        .persistent()
        .set(&DataKey::OwnershipLog, &entries);
    bump_persistent(env, &DataKey::OwnershipLog);
}
