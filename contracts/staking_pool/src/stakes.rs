//! Stake records and the owner → stake-id index.
//!
//! Stakes live in persistent storage under `(STAKE, id)`. The owner index
//! under `(OWN_IDX, owner)` is derived data: it is only written here, in
//! lock-step with stake creation and deletion, and lists ids in creation
//! order.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::rewards;

const STAKE: Symbol = symbol_short!("STAKE");
const OWNER_INDEX: Symbol = symbol_short!("OWN_IDX");
const LAST_STAKE_ID: Symbol = symbol_short!("LAST_ID");

const TTL_THRESHOLD: u32 = 17_280; // ~1 day
const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

/// One principal position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stake {
    pub id: u64,
    pub owner: Address,
    /// Locked deposit-token amount; always > 0 while the stake exists.
    pub principal: i128,
    /// Global ratio at the last settlement.
    pub settled_ratio: i128,
    pub opened_at: u64,
}

impl Stake {
    /// Settles accrued reward against `global_ratio` and returns it.
    ///
    /// The caller is responsible for paying the amount out.
    pub fn settle(&mut self, global_ratio: i128) -> Option<i128> {
        let due = rewards::reward_due(self.principal, global_ratio, self.settled_ratio)?;
        if global_ratio > self.settled_ratio {
            self.settled_ratio = global_ratio;
        }
        Some(due)
    }
}

fn stake_key(id: u64) -> (Symbol, u64) {
    (STAKE, id)
}

fn index_key(owner: &Address) -> (Symbol, Address) {
    (OWNER_INDEX, owner.clone())
}

/// Issues the next stake id. Ids start at 1 and are never reused; 0 is the
/// "open a new stake" sentinel of `deposit`.
pub fn next_id(env: &Env) -> u64 {
    let next = last_id(env).saturating_add(1);
    env.storage().instance().set(&LAST_STAKE_ID, &next);
    next
}

pub fn last_id(env: &Env) -> u64 {
    env.storage().instance().get(&LAST_STAKE_ID).unwrap_or(0)
}

pub fn load(env: &Env, id: u64) -> Option<Stake> {
    let key = stake_key(id);
    let stake: Option<Stake> = env.storage().persistent().get(&key);
    if stake.is_some() {
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
    stake
}

/// Writes a stake, adding it to its owner's index the first time it is seen.
pub fn store(env: &Env, stake: &Stake) {
    let key = stake_key(stake.id);
    let is_new = !env.storage().persistent().has(&key);
    env.storage().persistent().set(&key, stake);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    if is_new {
        index_add(env, &stake.owner, stake.id);
    }
}

/// Deletes a stake and its index entry. The id stays retired.
pub fn delete(env: &Env, stake: &Stake) {
    env.storage().persistent().remove(&stake_key(stake.id));
    index_remove(env, &stake.owner, stake.id);
}

/// Stake ids held by `owner`, oldest first.
pub fn owner_stakes(env: &Env, owner: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&index_key(owner))
        .unwrap_or(Vec::new(env))
}

fn index_add(env: &Env, owner: &Address, id: u64) {
    let key = index_key(owner);
    let mut ids = owner_stakes(env, owner);
    ids.push_back(id);
    env.storage().persistent().set(&key, &ids);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn index_remove(env: &Env, owner: &Address, id: u64) {
    let key = index_key(owner);
    let mut ids = owner_stakes(env, owner);
    if let Some(position) = ids.first_index_of(id) {
        ids.remove(position);
    }
    if ids.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &ids);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
