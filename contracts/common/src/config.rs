use soroban_sdk::{contracttype, Address, Vec};

use crate::governance;

// ── Token descriptors ────────────────────────────────────────────────────────

/// How the pool pulls deposit tokens out of a depositor's balance.
///
/// - `Direct`    – the depositor authorises a plain `transfer` into the pool
///                 as part of the deposit call.
/// - `Allowance` – the depositor approves the pool as spender beforehand and
///                 the pool sweeps the amount with `transfer_from`.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TransferMode {
    Direct = 0,
    Allowance = 1,
}

/// The deposit token of a pool together with the way it is debited.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenConfig {
    pub address: Address,
    pub mode: TransferMode,
}

// ── Pool configuration ──────────────────────────────────────────────────────

/// Everything a pool needs at creation time.
///
/// Token addresses are immutable once the pool is initialised; the release
/// period can later be changed by a confirmed administrator.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    pub deposit_token: TokenConfig,
    pub reward_token: Address,
    /// Seconds over which newly observed reward income is vested.
    pub max_release_period: u64,
    /// Identities seeded as confirmed administrators.
    pub administrators: Vec<Address>,
}

impl PoolConfig {
    /// Returns `true` when the configuration can back a working pool.
    ///
    /// Rejects a zero release period, a deposit token that is also the reward
    /// token (principal would be read as income), and an empty or duplicated
    /// administrator set.
    pub fn is_valid(&self) -> bool {
        if self.max_release_period == 0 {
            return false;
        }
        if self.deposit_token.address == self.reward_token {
            return false;
        }
        governance::is_valid_seed(&self.administrators)
    }
}
