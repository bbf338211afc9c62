extern crate std;

use common::{AdminState, PoolConfig, TokenConfig, TransferMode};
use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events as _, Ledger as _},
    token::StellarAssetClient,
    vec,
    xdr::{ContractEventBody, ScVal, ScVec},
    Address, Env, IntoVal, TryFromVal, Val, Vec,
};

use crate::rewards::PRECISION;
use crate::{ContractError, StakingPool, StakingPoolClient};

fn setup() -> (Env, StakingPoolClient<'static>, Address, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let deposit_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let client = StakingPoolClient::new(&env, &env.register(StakingPool, ()));
    let admin = Address::generate(&env);
    client.initialize(&PoolConfig {
        deposit_token: TokenConfig {
            address: deposit_token.clone(),
            mode: TransferMode::Direct,
        },
        reward_token: reward_token.clone(),
        max_release_period: 10,
        administrators: vec![&env, admin.clone()],
    });

    (env, client, admin, deposit_token, reward_token)
}

fn expect_err<T: core::fmt::Debug, C: core::fmt::Debug>(
    result: Result<T, Result<ContractError, C>>,
    expected: ContractError,
) {
    match result {
        Err(Ok(e)) => assert_eq!(e, expected),
        other => unreachable!("Expected {:?}, got {:?}", expected, other),
    }
}

/// Counts published events whose topics equal `topics`.
fn count_events(env: &Env, topics: Vec<Val>) -> usize {
    let expected = ScVal::try_from_val(env, &topics.to_val()).unwrap();
    env.events()
        .all()
        .events()
        .iter()
        .filter(|event| {
            let ContractEventBody::V0(body) = &event.body;
            ScVal::Vec(Some(ScVec(body.topics.clone()))) == expected
        })
        .count()
}

// ── Two-step administrator flow ───────────────────────────────────────────────

#[test]
fn test_propose_then_confirm() {
    let (env, client, admin, _, _) = setup();
    let candidate = Address::generate(&env);

    client.propose_administrator(&admin, &candidate);
    assert_eq!(client.get_administrator_state(&candidate), AdminState::Pending);

    client.confirm_administrator(&candidate);
    assert_eq!(client.get_administrator_state(&candidate), AdminState::Confirmed);
    assert_eq!(client.get_administrators(), vec![&env, admin, candidate]);
}

#[test]
fn test_only_confirmed_admin_can_propose() {
    let (env, client, admin, _, _) = setup();
    let candidate = Address::generate(&env);
    let stranger = Address::generate(&env);

    expect_err(
        client.try_propose_administrator(&stranger, &candidate),
        ContractError::Unauthorized,
    );

    // A pending candidate has no privileges yet.
    client.propose_administrator(&admin, &candidate);
    expect_err(
        client.try_propose_administrator(&candidate, &stranger),
        ContractError::Unauthorized,
    );
    assert_eq!(client.get_administrator_state(&stranger), AdminState::Absent);
}

#[test]
fn test_confirm_requires_pending_state() {
    let (env, client, admin, _, _) = setup();

    expect_err(
        client.try_confirm_administrator(&Address::generate(&env)),
        ContractError::NotPending,
    );
    expect_err(
        client.try_confirm_administrator(&admin),
        ContractError::NotPending,
    );
}

#[test]
fn test_proposing_confirmed_admin_is_noop() {
    let (env, client, admin, _, _) = setup();

    client.propose_administrator(&admin, &admin);
    assert_eq!(client.get_administrator_state(&admin), AdminState::Confirmed);
    assert_eq!(client.get_administrators(), vec![&env, admin]);
}

#[test]
fn test_self_removal_always_allowed() {
    let (env, client, admin, _, _) = setup();
    let candidate = Address::generate(&env);
    let stranger = Address::generate(&env);

    client.remove_administrator(&stranger, &stranger);

    client.propose_administrator(&admin, &candidate);
    client.remove_administrator(&candidate, &candidate);
    assert_eq!(client.get_administrator_state(&candidate), AdminState::Absent);

    client.remove_administrator(&admin, &admin);
    assert_eq!(client.get_administrator_state(&admin), AdminState::Absent);
    assert!(client.get_administrators().is_empty());
}

#[test]
fn test_removing_others_requires_confirmed_admin() {
    let (env, client, admin, _, _) = setup();
    let candidate = Address::generate(&env);
    let stranger = Address::generate(&env);

    client.propose_administrator(&admin, &candidate);
    expect_err(
        client.try_remove_administrator(&stranger, &candidate),
        ContractError::Unauthorized,
    );
    expect_err(
        client.try_remove_administrator(&candidate, &admin),
        ContractError::Unauthorized,
    );

    client.remove_administrator(&admin, &candidate);
    assert_eq!(client.get_administrator_state(&candidate), AdminState::Absent);

    // Once removed, a former candidate cannot confirm.
    expect_err(
        client.try_confirm_administrator(&candidate),
        ContractError::NotPending,
    );
}

#[test]
fn test_removal_event_only_when_state_changes() {
    let (env, client, admin, _, _) = setup();
    let stranger = Address::generate(&env);

    client.remove_administrator(&admin, &stranger);
    assert_eq!(
        count_events(&env, (symbol_short!("ADM_RMV"), stranger.clone()).into_val(&env)),
        0
    );

    client.remove_administrator(&admin, &admin);
    assert_eq!(
        count_events(&env, (symbol_short!("ADM_RMV"), admin.clone()).into_val(&env)),
        1
    );
}

// ── Release period ────────────────────────────────────────────────────────────

#[test]
fn test_update_release_period() {
    let (env, client, admin, _, _) = setup();
    let candidate = Address::generate(&env);

    client.update_max_release_period(&admin, &100);
    assert_eq!(client.get_max_release_period(), 100);

    expect_err(
        client.try_update_max_release_period(&admin, &0),
        ContractError::InvalidConfig,
    );

    client.propose_administrator(&admin, &candidate);
    expect_err(
        client.try_update_max_release_period(&candidate, &50),
        ContractError::Unauthorized,
    );

    client.confirm_administrator(&candidate);
    client.update_max_release_period(&candidate, &50);
    assert_eq!(client.get_max_release_period(), 50);

    client.remove_administrator(&candidate, &admin);
    expect_err(
        client.try_update_max_release_period(&admin, &20),
        ContractError::Unauthorized,
    );
}

#[test]
fn test_period_change_keeps_already_vested_reward() {
    let (env, client, admin, deposit_token, reward_token) = setup();
    let alice = Address::generate(&env);
    StellarAssetClient::new(&env, &deposit_token).mint(&alice, &1_000);
    client.deposit(&alice, &1_000, &0);

    StellarAssetClient::new(&env, &reward_token).mint(&client.address, &1_000);
    client.notify_reward();

    // Half of the reward vested under the old 10s period.
    env.ledger().set_timestamp(5);
    client.update_max_release_period(&admin, &100);
    assert_eq!(client.get_global_ratio(), PRECISION / 2);

    // The remaining 500 now vests over 100s.
    env.ledger().set_timestamp(55);
    client.notify_reward();
    assert_eq!(client.get_global_ratio(), PRECISION / 2 + PRECISION / 4);
}
