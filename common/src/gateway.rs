//! Typed boundary to the external supply-chain contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::policy::TxMethod;
use crate::product::Product;

/// Canonical signature of the read method.
pub const GET_ALL_PRODUCTS: &str = "getAllProducts()";
/// Canonical signature of the registration method.
pub const ADD_PRODUCT: &str = "addProduct(string)";

/// Errors surfaced by gateway operations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GatewayError {
    /// The wallet or contract rejected the call (user denial included).
    /// The provider's own message is passed through verbatim.
    Rejected(String),
    /// The transaction was included but reverted.
    TransactionFailed(String),
    /// The read payload did not decode into the expected product shape.
    Decode(String),
    /// Transport-level provider failure.
    Provider(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Rejected(msg) => write!(f, "call rejected: {msg}"),
            GatewayError::TransactionFailed(msg) => write!(f, "transaction failed: {msg}"),
            GatewayError::Decode(msg) => write!(f, "malformed contract response: {msg}"),
            GatewayError::Provider(msg) => write!(f, "provider error: {msg}"),
        }
    }
}

/// The five-method boundary to the ledger-resident supply-chain program.
///
/// Writes are submitted from the active account and awaited to inclusion
/// before returning. The gateway performs no retries and enforces no
/// transition rules; the contract is the arbiter of legality, and its
/// failures pass through unchanged.
#[allow(async_fn_in_trait)]
pub trait SupplyChainContract {
    /// Full current product list. No state change.
    async fn get_all_products(&self) -> Result<Vec<Product>, GatewayError>;

    /// Register a new product. The contract assigns id, timestamp, and
    /// manufacturer.
    async fn add_product(&mut self, name: &str) -> Result<(), GatewayError>;

    async fn pack_product(&mut self, id: u64) -> Result<(), GatewayError>;

    async fn ship_product(&mut self, id: u64) -> Result<(), GatewayError>;

    async fn deliver_product(&mut self, id: u64) -> Result<(), GatewayError>;
}

/// Dispatch a transition by its typed method selector.
pub async fn submit_transition<C: SupplyChainContract>(
    contract: &mut C,
    method: TxMethod,
    id: u64,
) -> Result<(), GatewayError> {
    tracing::debug!(method = method.abi_name(), id, "submitting transition");
    match method {
        TxMethod::PackProduct => contract.pack_product(id).await,
        TxMethod::ShipProduct => contract.ship_product(id).await,
        TxMethod::DeliverProduct => contract.deliver_product(id).await,
    }
}
