#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::rewards::{Observation, RewardState};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the pool is initialised.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub deposit_token: Address,
    pub reward_token: Address,
    pub max_release_period: u64,
    pub administrators: u32,
    pub timestamp: u64,
}

/// Fired on every deposit, new stake or top-up.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub owner: Address,
    pub stake_id: u64,
    pub amount: i128,
    pub principal: i128,
    /// Reward settled and paid out by a top-up; 0 for a new stake.
    pub reward_paid: i128,
    pub total_principal: i128,
    pub timestamp: u64,
}

/// Fired when a stake is closed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub owner: Address,
    pub stake_id: u64,
    pub principal: i128,
    pub reward: i128,
    pub total_principal: i128,
    pub timestamp: u64,
}

/// Fired when a stake's reward is claimed without touching principal.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedEvent {
    pub owner: Address,
    pub stake_id: u64,
    pub reward: i128,
    pub timestamp: u64,
}

/// Fired when an observation moves reward through the release schedule.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatioAdvancedEvent {
    pub previous_ratio: i128,
    pub global_ratio: i128,
    pub income: i128,
    pub vested: i128,
    pub credited: i128,
    pub forfeited: i128,
    pub held_reward: i128,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReleasePeriodSetEvent {
    pub caller: Address,
    pub previous_period: u64,
    pub new_period: u64,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminProposedEvent {
    pub proposer: Address,
    pub candidate: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminConfirmedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminRemovedEvent {
    pub caller: Address,
    pub removed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    deposit_token: Address,
    reward_token: Address,
    max_release_period: u64,
    administrators: u32,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            deposit_token,
            reward_token,
            max_release_period,
            administrators,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_deposited(
    env: &Env,
    owner: Address,
    stake_id: u64,
    amount: i128,
    principal: i128,
    reward_paid: i128,
    total_principal: i128,
) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), owner.clone()),
        DepositedEvent {
            owner,
            stake_id,
            amount,
            principal,
            reward_paid,
            total_principal,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_withdrawn(
    env: &Env,
    owner: Address,
    stake_id: u64,
    principal: i128,
    reward: i128,
    total_principal: i128,
) {
    env.events().publish(
        (symbol_short!("WITHDRAW"), owner.clone()),
        WithdrawnEvent {
            owner,
            stake_id,
            principal,
            reward,
            total_principal,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_claimed(env: &Env, owner: Address, stake_id: u64, reward: i128) {
    env.events().publish(
        (symbol_short!("CLAIM"), owner.clone()),
        ClaimedEvent {
            owner,
            stake_id,
            reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ratio_advanced(
    env: &Env,
    previous_ratio: i128,
    state: &RewardState,
    observation: &Observation,
) {
    env.events().publish(
        (symbol_short!("RATIO"),),
        RatioAdvancedEvent {
            previous_ratio,
            global_ratio: state.global_ratio,
            income: observation.income,
            vested: observation.vested,
            credited: observation.credited,
            forfeited: observation.forfeited,
            held_reward: state.held_reward,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_release_period_set(
    env: &Env,
    caller: Address,
    previous_period: u64,
    new_period: u64,
) {
    env.events().publish(
        (symbol_short!("PERIOD"), caller.clone()),
        ReleasePeriodSetEvent {
            caller,
            previous_period,
            new_period,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_proposed(env: &Env, proposer: Address, candidate: Address) {
    env.events().publish(
        (symbol_short!("ADM_PROP"), candidate.clone()),
        AdminProposedEvent {
            proposer,
            candidate,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_confirmed(env: &Env, admin: Address) {
    env.events().publish(
        (symbol_short!("ADM_CONF"), admin.clone()),
        AdminConfirmedEvent {
            admin,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_admin_removed(env: &Env, caller: Address, removed: Address) {
    env.events().publish(
        (symbol_short!("ADM_RMV"), removed.clone()),
        AdminRemovedEvent {
            caller,
            removed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
