use nft141::validate;
use soroban_sdk::{Address, Env};

use crate::{errors::FactoryError, storage_types::Config};

/// Authenticates `caller` and checks it is the configured owner.
pub fn require_owner(env: &Env, config: &Config, caller: &Address) -> Result<(), FactoryError> {
    caller.require_auth();

    validate!(
        env,
        *caller == config.owner,
        FactoryError::Unauthorized,
        "Factory: You are not authorized!"
    )
}
