use nft141::validate;
use soroban_sdk::{Bytes, Env};

use crate::{
    errors::FactoryError,
    storage::{get_code_enabled, get_code_entry, save_code_enabled, save_code_entry},
    storage_types::{CodeEntry, Config},
};

/// Uploads `wasm` as child template `version` and makes it the current one.
/// The caller persists the updated config.
pub fn register(
    env: &Env,
    config: &mut Config,
    wasm: Bytes,
    version: u32,
) -> Result<CodeEntry, FactoryError> {
    validate!(
        env,
        !wasm.is_empty(),
        FactoryError::InvalidCode,
        "Factory: Register code: wasm must not be empty"
    )?;
    validate!(
        env,
        version > config.current_code_version,
        FactoryError::InvalidVersion,
        "Factory: Register code: version {} must be greater than {}",
        version,
        config.current_code_version
    )?;

    let size = wasm.len();
    let wasm_hash = env.deployer().upload_contract_wasm(wasm);

    let entry = CodeEntry {
        version,
        wasm_hash,
        size,
        registered_ledger: env.ledger().sequence(),
    };
    save_code_entry(env, &entry);
    config.current_code_version = version;

    Ok(entry)
}

pub fn get(env: &Env, version: u32) -> Option<CodeEntry> {
    if version == 0 {
        return None;
    }
    get_code_entry(env, version)
}

/// The current version is deployable and superseded ones are not, unless the
/// owner decided otherwise for that version.
pub fn is_deployable(env: &Env, config: &Config, version: u32) -> bool {
    if get(env, version).is_none() {
        return false;
    }

    get_code_enabled(env, version).unwrap_or(version == config.current_code_version)
}

pub fn set_enabled(
    env: &Env,
    version: u32,
    enabled: bool,
) -> Result<(), FactoryError> {
    get(env, version).ok_or(FactoryError::UnknownCodeVersion)?;
    save_code_enabled(env, version, enabled);

    Ok(())
}
