//! Shared types and storage helpers for the staking pool contracts.
//!
//! This crate provides:
//! - [`PoolConfig`] and friends: the creation-time configuration a pool is
//!   initialised with, shared by the pool and by the factory that deploys it.
//! - [`governance`]: the two-step propose / confirm / remove administrator
//!   registry, stored in the calling contract's own storage.

#![no_std]

pub mod config;
pub mod governance;

pub use config::*;
pub use governance::{AdminState, GovernanceError};
