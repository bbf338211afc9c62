#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the pool contract under random operation
//! sequences.
//!
//! Invariants tested:
//! - `total_principal` equals the sum of live stakes after every operation
//! - The global ratio never decreases
//! - The owner index lists exactly the live stakes, in creation order
//! - A withdrawn stake id cannot be withdrawn again
//! - Reward paid out plus reward still in the pool equals reward delivered
//! - A stake's settlement depends only on the ratio at open and at close

use common::{PoolConfig, TokenConfig, TransferMode};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{vec, Address, Env};
use staking_pool::rewards::PRECISION;
use staking_pool::{ContractError, StakingPool, StakingPoolClient};

const STAKERS: usize = 3;
const FUNDING: i128 = 1_000_000;

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Open {
        staker: u8,
        #[proptest(strategy = "1i128..=10_000")]
        amount: i128,
    },
    TopUp {
        pick: u8,
        #[proptest(strategy = "1i128..=10_000")]
        amount: i128,
    },
    Withdraw {
        pick: u8,
    },
    Claim {
        pick: u8,
    },
    Reward {
        #[proptest(strategy = "1i128..=100_000")]
        amount: i128,
        notify: bool,
    },
    Wait {
        #[proptest(strategy = "1u64..=20")]
        seconds: u64,
    },
}

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    env: Env,
    client: StakingPoolClient<'static>,
    deposit_token: Address,
    reward_token: Address,
    stakers: std::vec::Vec<Address>,
    /// Live stakes as (id, staker index), in creation order.
    live: std::vec::Vec<(u64, usize)>,
    delivered: i128,
    paid: i128,
}

impl Harness {
    fn new(release_period: u64) -> Self {
        let env = Env::default();
        env.mock_all_auths();

        let deposit_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();
        let reward_token = env
            .register_stellar_asset_contract_v2(Address::generate(&env))
            .address();

        let client = StakingPoolClient::new(&env, &env.register(StakingPool, ()));
        client.initialize(&PoolConfig {
            deposit_token: TokenConfig {
                address: deposit_token.clone(),
                mode: TransferMode::Direct,
            },
            reward_token: reward_token.clone(),
            max_release_period: release_period,
            administrators: vec![&env, Address::generate(&env)],
        });

        let stakers = (0..STAKERS)
            .map(|_| {
                let who = Address::generate(&env);
                StellarAssetClient::new(&env, &deposit_token).mint(&who, &FUNDING);
                who
            })
            .collect();

        Harness {
            env,
            client,
            deposit_token,
            reward_token,
            stakers,
            live: std::vec::Vec::new(),
            delivered: 0,
            paid: 0,
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Open { staker, amount } => {
                let index = staker as usize % STAKERS;
                let id = self.client.deposit(&self.stakers[index], &amount, &0);
                self.live.push((id, index));
            }
            Op::TopUp { pick, amount } => {
                if let Some((id, index)) = self.pick(pick) {
                    let before = self.reward_balance(index);
                    self.client.deposit(&self.stakers[index], &amount, &id);
                    self.paid += self.reward_balance(index) - before;
                }
            }
            Op::Withdraw { pick } => {
                if let Some((id, index)) = self.pick(pick) {
                    let receipt = self.client.withdraw(&self.stakers[index], &id);
                    self.paid += receipt.reward;
                    self.live.retain(|(live_id, _)| *live_id != id);

                    match self.client.try_withdraw(&self.stakers[index], &id) {
                        Err(Ok(e)) => assert_eq!(e, ContractError::NotFound),
                        _ => unreachable!("Expected NotFound on second withdrawal"),
                    }
                }
            }
            Op::Claim { pick } => {
                if let Some((id, index)) = self.pick(pick) {
                    self.paid += self.client.claim(&self.stakers[index], &id);
                }
            }
            Op::Reward { amount, notify } => {
                StellarAssetClient::new(&self.env, &self.reward_token)
                    .mint(&self.client.address, &amount);
                self.delivered += amount;
                if notify {
                    self.client.notify_reward();
                }
            }
            Op::Wait { seconds } => {
                let now = self.env.ledger().timestamp();
                self.env.ledger().set_timestamp(now + seconds);
            }
        }
    }

    fn pick(&self, pick: u8) -> Option<(u64, usize)> {
        if self.live.is_empty() {
            return None;
        }
        Some(self.live[pick as usize % self.live.len()])
    }

    fn reward_balance(&self, index: usize) -> i128 {
        TokenClient::new(&self.env, &self.reward_token).balance(&self.stakers[index])
    }

    fn check_invariants(&self) {
        let live_principal: i128 = self
            .live
            .iter()
            .map(|(id, _)| self.client.get_stake(id).principal)
            .sum();
        assert_eq!(self.client.get_total_principal(), live_principal);
        assert_eq!(
            TokenClient::new(&self.env, &self.deposit_token).balance(&self.client.address),
            live_principal
        );

        for (index, who) in self.stakers.iter().enumerate() {
            let expected: std::vec::Vec<u64> = self
                .live
                .iter()
                .filter(|(_, owner)| *owner == index)
                .map(|(id, _)| *id)
                .collect();
            let indexed: std::vec::Vec<u64> = self.client.get_owner_stakes(who).iter().collect();
            assert_eq!(indexed, expected);
        }

        let in_pool =
            TokenClient::new(&self.env, &self.reward_token).balance(&self.client.address);
        assert!(self.paid <= self.delivered);
        assert_eq!(self.paid + in_pool, self.delivered);
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Ledger-wide invariants hold after every operation of any sequence.
    #[test]
    fn prop_invariants_hold_after_every_operation(
        period in 1u64..=30u64,
        ops in prop::collection::vec(any::<Op>(), 1..30),
    ) {
        let mut harness = Harness::new(period);
        let mut ratio = harness.client.get_global_ratio();

        for op in &ops {
            harness.apply(op);
            harness.check_invariants();

            let next = harness.client.get_global_ratio();
            prop_assert!(next >= ratio);
            ratio = next;
        }
    }

    /// A stake untouched between open and close is paid exactly
    /// `principal * (R1 - R0) / PRECISION`, whatever other stakes did.
    #[test]
    fn prop_settlement_is_independent_of_other_stakes(
        principal in 1i128..=10_000i128,
        period in 1u64..=30u64,
        ops in prop::collection::vec(any::<Op>(), 1..30),
    ) {
        let mut harness = Harness::new(period);
        let anchor = Address::generate(&harness.env);
        StellarAssetClient::new(&harness.env, &harness.deposit_token).mint(&anchor, &principal);

        let id = harness.client.deposit(&anchor, &principal, &0);
        let opened_ratio = harness.client.get_stake(&id).settled_ratio;

        for op in &ops {
            harness.apply(op);
        }

        let receipt = harness.client.withdraw(&anchor, &id);
        let closed_ratio = harness.client.get_global_ratio();
        prop_assert_eq!(receipt.principal, principal);
        prop_assert_eq!(
            receipt.reward,
            principal * (closed_ratio - opened_ratio) / PRECISION
        );
    }
}
