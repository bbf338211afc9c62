use common::PoolConfig;
use soroban_sdk::{contractclient, Env};

/// The part of the pool interface the factory calls after deployment.
#[contractclient(name = "PoolClient")]
pub trait PoolInterface {
    fn initialize(env: Env, config: PoolConfig);
}
