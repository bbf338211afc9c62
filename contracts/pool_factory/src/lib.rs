//! Deploys staking pools from an uploaded pool WASM and keeps a registry of
//! them by sequential id.
//!
//! The unit tests in `src/test.rs` cover the factory guards without a pool
//! binary. Actual deployment is covered by `tests/deploy.rs`, which embeds the
//! compiled pool contract and is only built with the `pool-wasm` feature:
//!
//! ```bash
//! cargo build -p staking_pool --target wasm32v1-none --release
//! cargo test -p pool_factory --features pool-wasm --test deploy
//! ```
//!
//! A plain `cargo test` skips that target, so run both commands whenever the
//! pool contract or the deploy path changes.

#![no_std]

pub mod events;
pub mod pool;

use common::governance::{self, AdminState, GovernanceError};
use common::PoolConfig;
use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, BytesN, Env, Symbol, Vec};

use pool::PoolClient;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const POOL_WASM: Symbol = symbol_short!("POOL_WASM");
const POOL_COUNTER: Symbol = symbol_short!("POOL_CNT");
const POOL: Symbol = symbol_short!("POOL");

const TTL_THRESHOLD: u32 = 17_280; // ~1 day
const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum FactoryError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotFound = 3,
    Unauthorized = 4,
    NotPending = 5,
    InvalidConfig = 6,
}

impl From<GovernanceError> for FactoryError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::Unauthorized => FactoryError::Unauthorized,
            GovernanceError::NotPending => FactoryError::NotPending,
        }
    }
}

fn pool_key(id: u64) -> (Symbol, u64) {
    (POOL, id)
}

/// Deterministic deployment salt for pool `id`.
fn pool_salt(env: &Env, id: u64) -> BytesN<32> {
    let mut salt = [0u8; 32];
    salt[24..].copy_from_slice(&id.to_be_bytes());
    BytesN::from_array(env, &salt)
}

#[contract]
pub struct PoolFactory;

#[contractimpl]
impl PoolFactory {
    /// One-time setup: seed the factory's administrators and record the
    /// code hash new pools are deployed from.
    pub fn initialize(
        env: Env,
        administrators: Vec<Address>,
        pool_wasm_hash: BytesN<32>,
    ) -> Result<(), FactoryError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(FactoryError::AlreadyInitialized);
        }
        if !governance::is_valid_seed(&administrators) {
            return Err(FactoryError::InvalidConfig);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&POOL_WASM, &pool_wasm_hash);
        env.storage().instance().set(&POOL_COUNTER, &0u64);
        governance::seed(&env, &administrators);
        Self::extend_instance(&env);

        events::publish_initialized(&env, administrators.len(), pool_wasm_hash);
        Ok(())
    }

    /// Deploy and initialise a new pool. Only confirmed administrators may
    /// deploy. Returns the pool id and its address.
    pub fn deploy_pool(
        env: Env,
        caller: Address,
        config: PoolConfig,
    ) -> Result<(u64, Address), FactoryError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        governance::require_confirmed(&env, &caller)?;

        if !config.is_valid() {
            return Err(FactoryError::InvalidConfig);
        }

        let id = Self::pool_counter(&env);
        env.storage()
            .instance()
            .set(&POOL_COUNTER, &id.saturating_add(1));

        let wasm_hash = Self::wasm_hash(&env)?;
        let address = env
            .deployer()
            .with_current_contract(pool_salt(&env, id))
            .deploy_v2(wasm_hash, ());

        match PoolClient::new(&env, &address).try_initialize(&config) {
            Ok(Ok(())) => {}
            _ => return Err(FactoryError::InvalidConfig),
        }

        let key = pool_key(id);
        env.storage().persistent().set(&key, &address);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

        log!(&env, "pool deployed: {} at {}", id, address);
        events::publish_pool_deployed(
            &env,
            caller,
            id,
            address.clone(),
            config.deposit_token.address,
            config.reward_token,
        );

        Ok((id, address))
    }

    /// Address of pool `id`.
    pub fn lookup(env: Env, id: u64) -> Result<Address, FactoryError> {
        let key = pool_key(id);
        let address: Address = env
            .storage()
            .persistent()
            .get(&key)
            .ok_or(FactoryError::NotFound)?;
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        Ok(address)
    }

    /// Number of pools deployed so far, which is also the next pool id.
    pub fn get_pool_counter(env: Env) -> u64 {
        Self::pool_counter(&env)
    }

    pub fn get_pool_wasm_hash(env: Env) -> Result<BytesN<32>, FactoryError> {
        Self::wasm_hash(&env)
    }

    /// Switch the code later pools are deployed from. Existing pools are
    /// unaffected.
    pub fn set_pool_wasm_hash(
        env: Env,
        caller: Address,
        pool_wasm_hash: BytesN<32>,
    ) -> Result<(), FactoryError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        governance::require_confirmed(&env, &caller)?;

        env.storage().instance().set(&POOL_WASM, &pool_wasm_hash);

        events::publish_wasm_hash_set(&env, caller, pool_wasm_hash);
        Ok(())
    }

    // ── Governance ──────────────────────────────────────────────────────────

    pub fn propose_administrator(
        env: Env,
        caller: Address,
        candidate: Address,
    ) -> Result<(), FactoryError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        governance::propose(&env, &caller, &candidate)?;
        events::publish_admin_proposed(&env, caller, candidate);
        Ok(())
    }

    pub fn confirm_administrator(env: Env, caller: Address) -> Result<(), FactoryError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        governance::confirm(&env, &caller)?;
        events::publish_admin_confirmed(&env, caller);
        Ok(())
    }

    pub fn remove_administrator(
        env: Env,
        caller: Address,
        target: Address,
    ) -> Result<(), FactoryError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        let previous = governance::remove(&env, &caller, &target)?;
        if previous != AdminState::Absent {
            events::publish_admin_removed(&env, caller, target);
        }
        Ok(())
    }

    pub fn get_administrator_state(env: Env, who: Address) -> AdminState {
        governance::state_of(&env, &who)
    }

    pub fn get_administrators(env: Env) -> Vec<Address> {
        governance::list(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), FactoryError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(FactoryError::NotInitialized);
        }
        Self::extend_instance(env);
        Ok(())
    }

    fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn pool_counter(env: &Env) -> u64 {
        env.storage().instance().get(&POOL_COUNTER).unwrap_or(0)
    }

    fn wasm_hash(env: &Env) -> Result<BytesN<32>, FactoryError> {
        env.storage()
            .instance()
            .get(&POOL_WASM)
            .ok_or(FactoryError::NotInitialized)
    }
}
