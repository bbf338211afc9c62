#![no_main]

use arbitrary::Arbitrary;
use common::{PoolConfig, TokenConfig, TransferMode};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{vec, Address, Env};
use staking_pool::{StakingPool, StakingPoolClient};

const USERS: usize = 4;

#[derive(Arbitrary, Debug)]
pub struct FuzzInput {
    allowance_mode: bool,
    release_period: u16,
    actions: Vec<FuzzAction>,
}

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    /// `stake == 0` opens a new stake, anything else tops up stake `stake`.
    Deposit { user: u8, amount: u32, stake: u8 },
    Withdraw { user: u8, stake: u8 },
    Claim { user: u8, stake: u8 },
    Reward { amount: u32 },
    Notify,
    Wait { seconds: u16 },
}

fuzz_target!(|input: FuzzInput| {
    let env = Env::default();
    env.mock_all_auths();

    let deposit_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let mode = if input.allowance_mode {
        TransferMode::Allowance
    } else {
        TransferMode::Direct
    };

    let client = StakingPoolClient::new(&env, &env.register(StakingPool, ()));
    client.initialize(&PoolConfig {
        deposit_token: TokenConfig {
            address: deposit_token.clone(),
            mode,
        },
        reward_token: reward_token.clone(),
        max_release_period: u64::from(input.release_period.max(1)),
        administrators: vec![&env, Address::generate(&env)],
    });

    let users: Vec<Address> = (0..USERS)
        .map(|_| {
            let who = Address::generate(&env);
            StellarAssetClient::new(&env, &deposit_token).mint(&who, &i128::from(u32::MAX));
            who
        })
        .collect();
    let deposit = TokenClient::new(&env, &deposit_token);
    let reward = TokenClient::new(&env, &reward_token);

    let mut delivered = 0i128;
    let mut ratio = 0i128;

    for action in input.actions.into_iter().take(64) {
        match action {
            FuzzAction::Deposit { user, amount, stake } => {
                let who = &users[user as usize % USERS];
                let amount = i128::from(amount);
                if input.allowance_mode {
                    let expiration = env.ledger().sequence() + 100;
                    deposit.approve(who, &client.address, &amount, &expiration);
                }
                let _ = client.try_deposit(who, &amount, &u64::from(stake));
            }
            FuzzAction::Withdraw { user, stake } => {
                let who = &users[user as usize % USERS];
                let _ = client.try_withdraw(who, &u64::from(stake));
            }
            FuzzAction::Claim { user, stake } => {
                let who = &users[user as usize % USERS];
                let _ = client.try_claim(who, &u64::from(stake));
            }
            FuzzAction::Reward { amount } => {
                StellarAssetClient::new(&env, &reward_token)
                    .mint(&client.address, &i128::from(amount));
                delivered += i128::from(amount);
            }
            FuzzAction::Notify => {
                let _ = client.try_notify_reward();
            }
            FuzzAction::Wait { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + u64::from(seconds));
            }
        }

        // Principal is conserved and fully backed.
        let live: i128 = users
            .iter()
            .flat_map(|who| client.get_owner_stakes(who).iter().collect::<Vec<u64>>())
            .map(|id| client.get_stake(&id).principal)
            .sum();
        assert_eq!(client.get_total_principal(), live);
        assert_eq!(deposit.balance(&client.address), live);

        // Reward is never created out of thin air.
        let paid: i128 = users.iter().map(|who| reward.balance(who)).sum();
        assert_eq!(paid + reward.balance(&client.address), delivered);

        let next = client.get_global_ratio();
        assert!(next >= ratio);
        ratio = next;
    }
});
