use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// Lifecycle of a tracked product. Strictly ordered, forward-only, one step
/// at a time; `Delivered` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ProductState {
    Created,
    Packed,
    Shipped,
    Delivered,
}

impl ProductState {
    /// Wire ordinal as stored by the contract.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse the wire ordinal. Anything outside 0..=3 is invalid.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ProductState::Created),
            1 => Some(ProductState::Packed),
            2 => Some(ProductState::Shipped),
            3 => Some(ProductState::Delivered),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProductState::Created => "Created",
            ProductState::Packed => "Packed",
            ProductState::Shipped => "Shipped",
            ProductState::Delivered => "Delivered",
        }
    }

    /// All states in lifecycle order (used for the progress rail).
    pub fn all() -> &'static [ProductState] {
        &[
            ProductState::Created,
            ProductState::Packed,
            ProductState::Shipped,
            ProductState::Delivered,
        ]
    }
}

impl fmt::Display for ProductState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A tracked product as recorded by the supply-chain contract.
///
/// Invariant (contract-enforced): the participants up to and including the
/// current state are populated; all later ones carry the zero sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique, monotonically assigned by the contract.
    pub id: u64,
    pub name: String,
    pub state: ProductState,
    pub manufacturer: Address,
    pub packer: Address,
    pub shipper: Address,
    pub retailer: Address,
    /// Last-update instant, seconds since epoch, contract-assigned.
    pub timestamp: u64,
}

impl Product {
    /// The participant responsible for reaching `state`.
    pub fn participant(&self, state: ProductState) -> &Address {
        match state {
            ProductState::Created => &self.manufacturer,
            ProductState::Packed => &self.packer,
            ProductState::Shipped => &self.shipper,
            ProductState::Delivered => &self.retailer,
        }
    }

    /// Last-update instant as a UTC datetime. None only for timestamps
    /// beyond chrono's representable range.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp as i64, 0)
    }

    /// Check the participant/state consistency invariant: a participant is
    /// assigned iff its state has been reached.
    pub fn participants_consistent(&self) -> bool {
        ProductState::all()
            .iter()
            .all(|&s| !self.participant(s).is_zero() == (s <= self.state))
    }
}
