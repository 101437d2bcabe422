use std::collections::BTreeSet;

use dioxus::prelude::*;

use provenance_common::address::Address;
use provenance_common::product::Product;

/// Chain-sourced state shared across all components.
///
/// Updated by the chain coroutine after every gateway call; components only
/// read from this.
#[derive(Clone, Debug, Default)]
pub struct SharedState {
    /// Active wallet account, if connected.
    pub account: Option<Address>,
    pub connected: bool,
    /// Address of the loaded supply-chain contract.
    pub contract_address: Option<String>,
    /// Last full product snapshot, ordered by id.
    pub products: Vec<Product>,
    /// True while a full product fetch is running.
    pub loading: bool,
    /// Product ids with a state transition currently awaiting inclusion.
    pub busy: BTreeSet<u64>,
    pub last_error: Option<String>,
    pub last_success: Option<String>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contract_loaded(&self) -> bool {
        self.contract_address.is_some()
    }
}

pub fn use_shared_state() -> Signal<SharedState> {
    use_context::<Signal<SharedState>>()
}
