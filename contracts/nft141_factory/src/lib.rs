#![no_std]

mod access;
mod code_registry;
pub mod contract;
mod deployment;
pub mod errors;
mod events;
mod factory;
mod reconciler;
mod storage;
pub mod storage_types;
mod utils;
