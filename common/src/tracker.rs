//! The dApp's session object.
//!
//! Bundles the wallet session, the product snapshot, and client-side
//! validation into one explicitly-owned value, so nothing lives in
//! component-local globals. Mutating operations carry a per-product
//! in-flight guard instead of relying on disabled buttons for mutual
//! exclusion.

use std::collections::BTreeSet;
use std::fmt;

use crate::address::Address;
use crate::gateway::{submit_transition, GatewayError, SupplyChainContract};
use crate::policy::{next_action, StateAction};
use crate::product::Product;
use crate::session::{Session, SessionError, WalletProvider};
use crate::store::ProductStore;

/// Client-side checks performed before any network call is issued.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    EmptyAddress,
    UnknownProduct(u64),
    AlreadyDelivered(u64),
    /// A transition for this product is already awaiting inclusion.
    InFlight(u64),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "please enter a product name"),
            ValidationError::EmptyAddress => write!(f, "please enter a contract address"),
            ValidationError::UnknownProduct(id) => write!(f, "no product with id {id}"),
            ValidationError::AlreadyDelivered(id) => {
                write!(f, "product {id} is already delivered")
            }
            ValidationError::InFlight(id) => {
                write!(f, "an update for product {id} is already pending")
            }
        }
    }
}

/// Any failure surfaced to the UI. Caught at the triggering action and
/// rendered as a message; never retried automatically, never fatal.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerError {
    Session(SessionError),
    Gateway(GatewayError),
    Validation(ValidationError),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Session(e) => e.fmt(f),
            TrackerError::Gateway(e) => e.fmt(f),
            TrackerError::Validation(e) => e.fmt(f),
        }
    }
}

impl From<SessionError> for TrackerError {
    fn from(e: SessionError) -> Self {
        TrackerError::Session(e)
    }
}

impl From<GatewayError> for TrackerError {
    fn from(e: GatewayError) -> Self {
        TrackerError::Gateway(e)
    }
}

impl From<ValidationError> for TrackerError {
    fn from(e: ValidationError) -> Self {
        TrackerError::Validation(e)
    }
}

pub struct Tracker<P: WalletProvider> {
    session: Session<P>,
    store: ProductStore,
    in_flight: BTreeSet<u64>,
}

impl<P: WalletProvider> Tracker<P> {
    /// `provider: None` models an environment without a wallet extension.
    pub fn new(provider: Option<P>) -> Self {
        Tracker {
            session: Session::new(provider),
            store: ProductStore::new(),
            in_flight: BTreeSet::new(),
        }
    }

    pub fn account(&self) -> Option<&Address> {
        self.session.account()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.session.contract_address()
    }

    pub fn has_contract(&self) -> bool {
        self.session.contract().is_some()
    }

    /// Current snapshot, ordered by id.
    pub fn products(&self) -> &[Product] {
        self.store.all()
    }

    pub fn is_in_flight(&self, id: u64) -> bool {
        self.in_flight.contains(&id)
    }

    pub async fn connect_wallet(&mut self) -> Result<Address, TrackerError> {
        Ok(self.session.connect_wallet().await?)
    }

    /// Silent startup restore; true if an authorized session was adopted.
    pub async fn restore(&mut self) -> Result<bool, TrackerError> {
        Ok(self.session.restore().await?)
    }

    /// Provider subscription callback: empty list tears the session down.
    pub fn accounts_changed(&mut self, accounts: Vec<Address>) {
        self.session.accounts_changed(accounts);
    }

    /// Bind the contract and perform the initial full read.
    pub async fn load_contract(&mut self, address: &str) -> Result<(), TrackerError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ValidationError::EmptyAddress.into());
        }
        self.session.load_contract(address)?;
        self.refresh().await
    }

    /// Replace the snapshot with a fresh full read of the product list.
    ///
    /// Fetch failures surface like any other error; swallowing them would
    /// make a dead contract indistinguishable from an empty product list.
    pub async fn refresh(&mut self) -> Result<(), TrackerError> {
        let contract = self.session.contract().ok_or(SessionError::NotInitialized)?;
        let products = contract.get_all_products().await?;
        tracing::debug!(count = products.len(), "product snapshot refreshed");
        self.store.replace(products);
        Ok(())
    }

    /// Register a new product, then refresh.
    pub async fn add_product(&mut self, name: &str) -> Result<(), TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let contract = self
            .session
            .contract_mut()
            .ok_or(SessionError::NotInitialized)?;
        contract.add_product(name).await?;
        self.refresh().await
    }

    /// Advance a product one step along the chain, then refresh. Returns
    /// the action that was submitted.
    pub async fn advance(&mut self, id: u64) -> Result<StateAction, TrackerError> {
        let product = self
            .store
            .get(id)
            .ok_or(ValidationError::UnknownProduct(id))?;
        let action =
            next_action(product.state).ok_or(ValidationError::AlreadyDelivered(id))?;
        if !self.in_flight.insert(id) {
            return Err(ValidationError::InFlight(id).into());
        }
        let result = match self.session.contract_mut() {
            Some(contract) => submit_transition(contract, action.method, id)
                .await
                .map_err(TrackerError::from),
            None => Err(SessionError::NotInitialized.into()),
        };
        // Cleared on success and on error alike; the UI stays interactive.
        self.in_flight.remove(&id);
        result?;
        self.refresh().await?;
        Ok(action)
    }
}
