//! Client-side state-transition policy.
//!
//! Maps a product's current state to the single legal next action. The
//! contract remains the arbiter of legality; this only decides what the
//! client may offer.

use serde::{Deserialize, Serialize};

use crate::product::ProductState;

/// Contract method that advances a product one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxMethod {
    PackProduct,
    ShipProduct,
    DeliverProduct,
}

impl TxMethod {
    /// Method name as exported by the contract ABI.
    pub fn abi_name(self) -> &'static str {
        match self {
            TxMethod::PackProduct => "packProduct",
            TxMethod::ShipProduct => "shipProduct",
            TxMethod::DeliverProduct => "deliverProduct",
        }
    }

    /// Canonical signature used for selector derivation.
    pub fn signature(self) -> &'static str {
        match self {
            TxMethod::PackProduct => "packProduct(uint256)",
            TxMethod::ShipProduct => "shipProduct(uint256)",
            TxMethod::DeliverProduct => "deliverProduct(uint256)",
        }
    }
}

/// The single legal next step for a non-terminal product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateAction {
    /// Button label, e.g. "Pack".
    pub label: &'static str,
    pub method: TxMethod,
    pub resulting_state: ProductState,
}

/// The one legal transition from `state`, or None once delivered.
pub fn next_action(state: ProductState) -> Option<StateAction> {
    match state {
        ProductState::Created => Some(StateAction {
            label: "Pack",
            method: TxMethod::PackProduct,
            resulting_state: ProductState::Packed,
        }),
        ProductState::Packed => Some(StateAction {
            label: "Ship",
            method: TxMethod::ShipProduct,
            resulting_state: ProductState::Shipped,
        }),
        ProductState::Shipped => Some(StateAction {
            label: "Deliver",
            method: TxMethod::DeliverProduct,
            resulting_state: ProductState::Delivered,
        }),
        ProductState::Delivered => None,
    }
}
