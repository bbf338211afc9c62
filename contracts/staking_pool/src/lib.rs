#![no_std]

pub mod events;
pub mod ledger;
pub mod rewards;
pub mod stakes;

use common::governance::{self, AdminState, GovernanceError};
use common::{PoolConfig, TokenConfig};
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, Address, Env, Symbol, Vec,
};

use ledger::TokenLedger;
use rewards::RewardState;
use stakes::Stake;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const SETTINGS: Symbol = symbol_short!("SETTINGS");
const TOTAL_PRINCIPAL: Symbol = symbol_short!("TOT_PRIN");
const REWARD_STATE: Symbol = symbol_short!("RWD_ST");

const TTL_THRESHOLD: u32 = 17_280; // ~1 day
const TTL_EXTEND_TO: u32 = 518_400; // ~30 days

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotFound = 3,
    NotOwner = 4,
    Unauthorized = 5,
    NotPending = 6,
    InvalidConfig = 7,
    InvalidAmount = 8,
    InsufficientBalance = 9,
    TransferFailed = 10,
    ArithmeticOverflow = 11,
    NotAuthorizedOperator = 12,
}

impl From<GovernanceError> for ContractError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::Unauthorized => ContractError::Unauthorized,
            GovernanceError::NotPending => ContractError::NotPending,
        }
    }
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Token wiring and release period of an initialised pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSettings {
    pub deposit_token: TokenConfig,
    pub reward_token: Address,
    pub max_release_period: u64,
}

/// What a withdrawal paid out.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Withdrawal {
    pub stake_id: u64,
    pub principal: i128,
    pub reward: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingPool;

#[contractimpl]
impl StakingPool {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool. Token addresses are fixed from here on; the
    /// listed administrators start out confirmed.
    pub fn initialize(env: Env, config: PoolConfig) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        let pool = env.current_contract_address();
        if !config.is_valid()
            || config.deposit_token.address == pool
            || config.reward_token == pool
        {
            return Err(ContractError::InvalidConfig);
        }

        let settings = PoolSettings {
            deposit_token: config.deposit_token.clone(),
            reward_token: config.reward_token.clone(),
            max_release_period: config.max_release_period,
        };

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&SETTINGS, &settings);
        env.storage().instance().set(&TOTAL_PRINCIPAL, &0i128);
        env.storage()
            .instance()
            .set(&REWARD_STATE, &RewardState::new(env.ledger().timestamp()));
        governance::seed(&env, &config.administrators);
        Self::extend_instance(&env);

        events::publish_initialized(
            &env,
            config.deposit_token.address,
            config.reward_token,
            config.max_release_period,
            config.administrators.len(),
        );

        Ok(())
    }

    // ── Reward intake ───────────────────────────────────────────────────────

    /// Observe the pool's reward balance now. Anyone may call this after
    /// sending reward tokens to the pool so the release schedule starts
    /// from the moment of delivery. Returns the global ratio.
    pub fn notify_reward(env: Env) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        let settings = Self::settings(&env)?;
        let state = Self::observe(&env, &settings)?;
        Ok(state.global_ratio)
    }

    // ── Stake lifecycle ─────────────────────────────────────────────────────

    /// Deposit `amount` into a new stake (`stake_id == 0`) or top up an
    /// existing one.
    ///
    /// A top-up first settles the stake and pays the accrued reward out, so
    /// reward is never folded into principal. Returns the stake id.
    pub fn deposit(
        env: Env,
        owner: Address,
        amount: i128,
        stake_id: u64,
    ) -> Result<u64, ContractError> {
        Self::require_initialized(&env)?;
        owner.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let settings = Self::settings(&env)?;
        let mut state = Self::observe(&env, &settings)?;

        let (stake, reward) = if stake_id == 0 {
            let stake = Stake {
                id: stakes::next_id(&env),
                owner: owner.clone(),
                principal: amount,
                settled_ratio: state.global_ratio,
                opened_at: env.ledger().timestamp(),
            };
            (stake, 0)
        } else {
            let mut stake = Self::owned_stake(&env, &owner, stake_id)?;
            let reward = stake
                .settle(state.global_ratio)
                .ok_or(ContractError::ArithmeticOverflow)?;
            stake.principal = stake
                .principal
                .checked_add(amount)
                .ok_or(ContractError::ArithmeticOverflow)?;
            (stake, reward)
        };

        let total = Self::total_principal(&env)
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        stakes::store(&env, &stake);
        env.storage().instance().set(&TOTAL_PRINCIPAL, &total);
        if reward > 0 {
            state
                .record_payout(reward)
                .ok_or(ContractError::ArithmeticOverflow)?;
            env.storage().instance().set(&REWARD_STATE, &state);
        }

        let ledger = TokenLedger::new(&env);
        ledger.debit(&settings.deposit_token, &owner, amount)?;
        ledger.credit(&settings.reward_token, &owner, reward)?;

        events::publish_deposited(
            &env,
            owner,
            stake.id,
            amount,
            stake.principal,
            reward,
            total,
        );

        Ok(stake.id)
    }

    /// Pay out the reward accrued by a stake; principal stays locked.
    /// Returns the amount paid, which may be zero.
    pub fn claim(env: Env, owner: Address, stake_id: u64) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        owner.require_auth();

        let settings = Self::settings(&env)?;
        let mut state = Self::observe(&env, &settings)?;

        let mut stake = Self::owned_stake(&env, &owner, stake_id)?;
        let reward = stake
            .settle(state.global_ratio)
            .ok_or(ContractError::ArithmeticOverflow)?;

        stakes::store(&env, &stake);
        if reward > 0 {
            state
                .record_payout(reward)
                .ok_or(ContractError::ArithmeticOverflow)?;
            env.storage().instance().set(&REWARD_STATE, &state);
        }

        TokenLedger::new(&env).credit(&settings.reward_token, &owner, reward)?;

        events::publish_claimed(&env, owner, stake_id, reward);

        Ok(reward)
    }

    /// Close a stake: pay out its principal and accrued reward and retire
    /// the id. A second withdrawal of the same id fails with `NotFound`.
    pub fn withdraw(env: Env, owner: Address, stake_id: u64) -> Result<Withdrawal, ContractError> {
        Self::require_initialized(&env)?;
        owner.require_auth();

        let settings = Self::settings(&env)?;
        let mut state = Self::observe(&env, &settings)?;

        let mut stake = Self::owned_stake(&env, &owner, stake_id)?;
        let reward = stake
            .settle(state.global_ratio)
            .ok_or(ContractError::ArithmeticOverflow)?;
        let total = Self::total_principal(&env)
            .checked_sub(stake.principal)
            .ok_or(ContractError::ArithmeticOverflow)?;

        stakes::delete(&env, &stake);
        env.storage().instance().set(&TOTAL_PRINCIPAL, &total);
        if reward > 0 {
            state
                .record_payout(reward)
                .ok_or(ContractError::ArithmeticOverflow)?;
            env.storage().instance().set(&REWARD_STATE, &state);
        }

        let ledger = TokenLedger::new(&env);
        ledger.credit(&settings.deposit_token.address, &owner, stake.principal)?;
        ledger.credit(&settings.reward_token, &owner, reward)?;

        events::publish_withdrawn(&env, owner, stake_id, stake.principal, reward, total);

        Ok(Withdrawal {
            stake_id,
            principal: stake.principal,
            reward,
        })
    }

    // ── Governance ──────────────────────────────────────────────────────────

    /// A confirmed administrator proposes `candidate`, who must then confirm.
    pub fn propose_administrator(
        env: Env,
        caller: Address,
        candidate: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        governance::propose(&env, &caller, &candidate)?;

        events::publish_admin_proposed(&env, caller, candidate);
        Ok(())
    }

    /// The pending candidate accepts its proposal.
    pub fn confirm_administrator(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        governance::confirm(&env, &caller)?;

        events::publish_admin_confirmed(&env, caller);
        Ok(())
    }

    /// Remove `target` from the registry. Anyone may remove themselves;
    /// removing someone else takes a confirmed administrator.
    pub fn remove_administrator(
        env: Env,
        caller: Address,
        target: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();

        let previous = governance::remove(&env, &caller, &target)?;

        if previous != AdminState::Absent {
            events::publish_admin_removed(&env, caller, target);
        }
        Ok(())
    }

    /// Change the linear release period.
    ///
    /// Reward that vested under the old period is observed first, so the
    /// change only affects income still pending.
    pub fn update_max_release_period(
        env: Env,
        caller: Address,
        new_period: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        governance::require_confirmed(&env, &caller)?;

        if new_period == 0 {
            return Err(ContractError::InvalidConfig);
        }

        let mut settings = Self::settings(&env)?;
        Self::observe(&env, &settings)?;

        let previous = settings.max_release_period;
        settings.max_release_period = new_period;
        env.storage().instance().set(&SETTINGS, &settings);

        events::publish_release_period_set(&env, caller, previous, new_period);
        Ok(())
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_stake(env: Env, stake_id: u64) -> Result<Stake, ContractError> {
        stakes::load(&env, stake_id).ok_or(ContractError::NotFound)
    }

    /// Stake ids held by `owner`, oldest first.
    pub fn get_owner_stakes(env: Env, owner: Address) -> Vec<u64> {
        stakes::owner_stakes(&env, &owner)
    }

    /// Seconds since the stake was opened.
    pub fn get_stake_age(env: Env, stake_id: u64) -> Result<u64, ContractError> {
        let stake = stakes::load(&env, stake_id).ok_or(ContractError::NotFound)?;
        Ok(env.ledger().timestamp().saturating_sub(stake.opened_at))
    }

    /// Reward a claim on `stake_id` would pay right now, without writing
    /// any state.
    pub fn get_claimable(env: Env, stake_id: u64) -> Result<i128, ContractError> {
        let settings = Self::settings(&env)?;
        let stake = stakes::load(&env, stake_id).ok_or(ContractError::NotFound)?;
        let mut state = Self::reward_state(&env)?;
        let balance = TokenLedger::new(&env)
            .balance_of(&settings.reward_token, &env.current_contract_address());
        state
            .observe(
                balance,
                env.ledger().timestamp(),
                Self::total_principal(&env),
                settings.max_release_period,
            )
            .ok_or(ContractError::ArithmeticOverflow)?;
        rewards::reward_due(stake.principal, state.global_ratio, stake.settled_ratio)
            .ok_or(ContractError::ArithmeticOverflow)
    }

    pub fn get_global_ratio(env: Env) -> i128 {
        env.storage()
            .instance()
            .get::<_, RewardState>(&REWARD_STATE)
            .map(|state| state.global_ratio)
            .unwrap_or(0)
    }

    pub fn get_total_principal(env: Env) -> i128 {
        Self::total_principal(&env)
    }

    pub fn get_last_stake_id(env: Env) -> u64 {
        stakes::last_id(&env)
    }

    pub fn get_max_release_period(env: Env) -> Result<u64, ContractError> {
        Ok(Self::settings(&env)?.max_release_period)
    }

    pub fn get_reward_state(env: Env) -> Result<RewardState, ContractError> {
        Self::reward_state(&env)
    }

    pub fn get_config(env: Env) -> Result<PoolSettings, ContractError> {
        Self::settings(&env)
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

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Self::extend_instance(env);
        Ok(())
    }

    fn extend_instance(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn settings(env: &Env) -> Result<PoolSettings, ContractError> {
        env.storage()
            .instance()
            .get(&SETTINGS)
            .ok_or(ContractError::NotInitialized)
    }

    fn reward_state(env: &Env) -> Result<RewardState, ContractError> {
        env.storage()
            .instance()
            .get(&REWARD_STATE)
            .ok_or(ContractError::NotInitialized)
    }

    fn total_principal(env: &Env) -> i128 {
        env.storage().instance().get(&TOTAL_PRINCIPAL).unwrap_or(0)
    }

    /// Loads `stake_id` and checks that `owner` controls it.
    fn owned_stake(env: &Env, owner: &Address, stake_id: u64) -> Result<Stake, ContractError> {
        let stake = stakes::load(env, stake_id).ok_or(ContractError::NotFound)?;
        if stake.owner != *owner {
            return Err(ContractError::NotOwner);
        }
        Ok(stake)
    }

    /// Fold the pool's current reward balance into the accumulator and
    /// persist the result. Runs at the top of every operation that settles a
    /// stake, so settlement always sees the freshest ratio.
    fn observe(env: &Env, settings: &PoolSettings) -> Result<RewardState, ContractError> {
        let mut state = Self::reward_state(env)?;
        let total = Self::total_principal(env);
        let balance = TokenLedger::new(env)
            .balance_of(&settings.reward_token, &env.current_contract_address());
        let previous_ratio = state.global_ratio;

        let observation = state
            .observe(
                balance,
                env.ledger().timestamp(),
                total,
                settings.max_release_period,
            )
            .ok_or(ContractError::ArithmeticOverflow)?;
        env.storage().instance().set(&REWARD_STATE, &state);

        if observation.income > 0
            || observation.vested > 0
            || observation.credited > 0
            || observation.forfeited > 0
        {
            events::publish_ratio_advanced(env, previous_ratio, &state, &observation);
        }
        if observation.forfeited > 0 {
            log!(env, "reward balance fell, wrote off: {}", observation.forfeited);
        }
        if total == 0 && state.held_reward > 0 {
            log!(env, "no principal staked, holding vested reward: {}", state.held_reward);
        }

        Ok(state)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_governance;
