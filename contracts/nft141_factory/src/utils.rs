use nft141::{
    account_id::{self, MAX_ACCOUNT_ID_LEN, MAX_LABEL_LEN, MAX_SUFFIX_LEN},
    validate,
};
use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, String};

use crate::errors::FactoryError;

pub fn validate_label(env: &Env, label: &String) -> Result<(), FactoryError> {
    let len = label.len() as usize;
    validate!(
        env,
        len <= MAX_LABEL_LEN,
        FactoryError::InvalidLabel,
        "Factory: Deploy: label is longer than {} bytes",
        MAX_LABEL_LEN as u32
    )?;

    let mut buf = [0u8; MAX_LABEL_LEN];
    label.copy_into_slice(&mut buf[..len]);

    validate!(
        env,
        account_id::is_valid_label(&buf[..len]),
        FactoryError::InvalidLabel,
        "Factory: Deploy: label is not a valid account id part"
    )
}

pub fn validate_account_suffix(env: &Env, suffix: &String) -> Result<(), FactoryError> {
    let len = suffix.len() as usize;
    validate!(
        env,
        len <= MAX_SUFFIX_LEN,
        FactoryError::InvalidConfig,
        "Factory: Initialize: account suffix is longer than {} bytes",
        MAX_SUFFIX_LEN as u32
    )?;

    let mut buf = [0u8; MAX_SUFFIX_LEN];
    suffix.copy_into_slice(&mut buf[..len]);

    validate!(
        env,
        account_id::is_valid_suffix(&buf[..len]),
        FactoryError::InvalidConfig,
        "Factory: Initialize: account suffix is not a valid account id"
    )
}

/// Joins an already validated label and suffix into `<label>.<suffix>`.
pub fn child_account_id(env: &Env, label: &String, suffix: &String) -> String {
    let label_len = label.len() as usize;
    let suffix_len = suffix.len() as usize;
    let total = label_len + 1 + suffix_len;

    let mut buf = [0u8; MAX_ACCOUNT_ID_LEN];
    label.copy_into_slice(&mut buf[..label_len]);
    buf[label_len] = b'.';
    suffix.copy_into_slice(&mut buf[label_len + 1..total]);

    String::from_bytes(env, &buf[..total])
}

/// Salt of the child instance. The ticket is mixed in so a label freed by a
/// failed deployment maps to a fresh address.
pub fn child_salt(env: &Env, label: &String, ticket: u64) -> BytesN<32> {
    let mut salt = Bytes::new(env);
    salt.append(&label.clone().to_xdr(env));
    salt.extend_from_array(&ticket.to_be_bytes());

    env.crypto().sha256(&salt).into()
}

pub fn child_address(env: &Env, salt: BytesN<32>) -> Address {
    env.deployer()
        .with_current_contract(salt)
        .deployed_address()
}
