//! Integration-test support for the supply-chain tracker.
//!
//! `harness` provides in-process stand-ins for the wallet provider and the
//! on-chain contract, faithful to the contract's transition rules, so the
//! full connect → load → mutate → refresh loop runs without a node.

pub mod harness;
