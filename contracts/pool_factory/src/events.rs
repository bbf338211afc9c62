#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env};

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FactoryInitializedEvent {
    pub administrators: u32,
    pub pool_wasm_hash: BytesN<32>,
    pub timestamp: u64,
}

/// Fired for every pool the factory creates.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolDeployedEvent {
    pub caller: Address,
    pub pool_id: u64,
    pub pool: Address,
    pub deposit_token: Address,
    pub reward_token: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WasmHashSetEvent {
    pub caller: Address,
    pub pool_wasm_hash: BytesN<32>,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminChangedEvent {
    pub caller: Address,
    pub subject: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, administrators: u32, pool_wasm_hash: BytesN<32>) {
    env.events().publish(
        (symbol_short!("INIT"),),
        FactoryInitializedEvent {
            administrators,
            pool_wasm_hash,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_pool_deployed(
    env: &Env,
    caller: Address,
    pool_id: u64,
    pool: Address,
    deposit_token: Address,
    reward_token: Address,
) {
    env.events().publish(
        (symbol_short!("DEPLOYED"), pool_id),
        PoolDeployedEvent {
            caller,
            pool_id,
            pool,
            deposit_token,
            reward_token,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_wasm_hash_set(env: &Env, caller: Address, pool_wasm_hash: BytesN<32>) {
    env.events().publish(
        (symbol_short!("WASM_SET"), caller.clone()),
        WasmHashSetEvent {
            caller,
            pool_wasm_hash,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_proposed(env: &Env, caller: Address, candidate: Address) {
    publish_admin_change(env, symbol_short!("ADM_PROP"), caller, candidate);
}

pub fn publish_admin_confirmed(env: &Env, admin: Address) {
    publish_admin_change(env, symbol_short!("ADM_CONF"), admin.clone(), admin);
}

pub fn publish_admin_removed(env: &Env, caller: Address, removed: Address) {
    publish_admin_change(env, symbol_short!("ADM_RMV"), caller, removed);
}

fn publish_admin_change(env: &Env, topic: soroban_sdk::Symbol, caller: Address, subject: Address) {
    env.events().publish(
        (topic, subject.clone()),
        AdminChangedEvent {
            caller,
            subject,
            timestamp: env.ledger().timestamp(),
        },
    );
}
