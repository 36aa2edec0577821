#![no_std]

pub mod account_id;
pub mod macros;
pub mod ttl;
