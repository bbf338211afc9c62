//! Reward accumulator arithmetic.
//!
//! The pool keeps a single scaled ratio: cumulative reward earned per unit of
//! principal since inception. A stake remembers the ratio at its last
//! settlement, so its accrued reward is
//! `principal * (global_ratio - settled_ratio) / PRECISION` no matter how many
//! other stakes came and went in between.
//!
//! Newly observed reward income is not credited at once. It enters
//! `pending_reward` and vests linearly over the release period; vested reward
//! that cannot be credited yet (no principal in the pool) waits in
//! `held_reward`.
//!
//! Everything here is pure and returns `None` on arithmetic overflow; the
//! contract layer maps that to `ContractError::ArithmeticOverflow`.

use soroban_sdk::contracttype;

/// Fixed-point scale of the global ratio.
pub const PRECISION: i128 = 1_000_000_000_000;

/// Accumulator bookkeeping, stored as a single instance entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardState {
    /// Scaled cumulative reward per unit of principal. Never decreases.
    pub global_ratio: i128,
    /// Observed income that has not vested yet.
    pub pending_reward: i128,
    /// Vested income not yet credited to the ratio.
    pub held_reward: i128,
    /// Reward-token balance of the pool as of the last observation, net of
    /// the pool's own payouts since.
    pub last_observed_balance: i128,
    /// Ledger timestamp of the last observation.
    pub last_release_at: u64,
}

/// What a single call to [`RewardState::observe`] did.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Observation {
    /// Income newly seen since the previous observation.
    pub income: i128,
    /// Amount moved from pending to held by the release schedule.
    pub vested: i128,
    /// Amount credited to stakes through the ratio.
    pub credited: i128,
    /// Increase of the global ratio.
    pub ratio_increment: i128,
    /// Uncredited reward written off because the balance fell without a
    /// payout by the pool.
    pub forfeited: i128,
}

impl RewardState {
    pub fn new(now: u64) -> Self {
        RewardState {
            global_ratio: 0,
            pending_reward: 0,
            held_reward: 0,
            last_observed_balance: 0,
            last_release_at: now,
        }
    }

    /// Folds the pool's current reward balance into the accumulator.
    ///
    /// A balance above the last observed one is new income and joins the
    /// pending pool. A balance below it, which the pool did not pay out, is
    /// written off against pending and then held reward, so reward already
    /// credited to stakes stays backed and tokens that come back later are
    /// counted once. The pending pool then vests for the time elapsed since
    /// the previous observation; an idle stretch of at least
    /// `release_period` vests all of it. Held reward is credited to the ratio
    /// as soon as there is principal to credit it to.
    ///
    /// The ratio increment is floored and the amount booked as credited is
    /// rounded up, so the rounding remainder stays held and the sum paid out
    /// to stakes can never exceed the income observed.
    pub fn observe(
        &mut self,
        current_balance: i128,
        now: u64,
        total_principal: i128,
        release_period: u64,
    ) -> Option<Observation> {
        let mut observation = Observation::default();

        if current_balance > self.last_observed_balance {
            observation.income = current_balance.checked_sub(self.last_observed_balance)?;
            self.pending_reward = self.pending_reward.checked_add(observation.income)?;
        } else if current_balance < self.last_observed_balance {
            let lost = self.last_observed_balance.checked_sub(current_balance)?;
            observation.forfeited = self.forfeit(lost)?;
        }
        self.last_observed_balance = current_balance;

        let elapsed = now.saturating_sub(self.last_release_at);
        observation.vested = vested_amount(self.pending_reward, elapsed, release_period)?;
        self.pending_reward = self.pending_reward.checked_sub(observation.vested)?;
        self.held_reward = self.held_reward.checked_add(observation.vested)?;
        self.last_release_at = self.last_release_at.max(now);

        if total_principal > 0 && self.held_reward > 0 {
            let increment = self.held_reward.checked_mul(PRECISION)? / total_principal;
            if increment > 0 {
                let credited = ceil_div(increment.checked_mul(total_principal)?, PRECISION)?;
                self.global_ratio = self.global_ratio.checked_add(increment)?;
                self.held_reward = self.held_reward.checked_sub(credited)?;
                observation.credited = credited;
                observation.ratio_increment = increment;
            }
        }

        Some(observation)
    }

    /// Removes up to `lost` from the uncredited pools, pending first.
    /// Returns the amount removed.
    fn forfeit(&mut self, lost: i128) -> Option<i128> {
        let from_pending = lost.min(self.pending_reward);
        self.pending_reward = self.pending_reward.checked_sub(from_pending)?;
        let from_held = lost.checked_sub(from_pending)?.min(self.held_reward);
        self.held_reward = self.held_reward.checked_sub(from_held)?;
        from_pending.checked_add(from_held)
    }

    /// Accounts for reward tokens the pool itself sent out, so the drop in
    /// balance is not mistaken for a change in income.
    pub fn record_payout(&mut self, amount: i128) -> Option<()> {
        self.last_observed_balance = self.last_observed_balance.checked_sub(amount)?;
        Some(())
    }
}

/// Portion of `pending` released after `elapsed` seconds of a linear
/// schedule lasting `period` seconds.
pub fn vested_amount(pending: i128, elapsed: u64, period: u64) -> Option<i128> {
    if pending <= 0 {
        return Some(0);
    }
    if period == 0 || elapsed >= period {
        return Some(pending);
    }
    pending
        .checked_mul(i128::from(elapsed))?
        .checked_div(i128::from(period))
}

/// Reward accrued by `principal` while the ratio moved from `settled_ratio`
/// to `global_ratio`.
pub fn reward_due(principal: i128, global_ratio: i128, settled_ratio: i128) -> Option<i128> {
    if global_ratio <= settled_ratio || principal <= 0 {
        return Some(0);
    }
    principal
        .checked_mul(global_ratio.checked_sub(settled_ratio)?)?
        .checked_div(PRECISION)
}

fn ceil_div(numerator: i128, denominator: i128) -> Option<i128> {
    numerator
        .checked_add(denominator.checked_sub(1)?)?
        .checked_div(denominator)
}
