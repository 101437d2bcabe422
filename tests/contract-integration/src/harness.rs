//! In-process wallet and contract stand-ins.
//!
//! `MockChain` plays the external smart contract: it owns the product
//! records, assigns ids and timestamps, stamps participants, and rejects
//! illegal transitions exactly as the on-chain program would. `MockWallet`
//! plays the browser extension. The client under test sees only the
//! `WalletProvider` / `SupplyChainContract` traits.

use std::sync::{Arc, Mutex};

use provenance_common::address::Address;
use provenance_common::gateway::{GatewayError, SupplyChainContract};
use provenance_common::product::{Product, ProductState};
use provenance_common::session::{SessionError, WalletProvider};

/// Where the mock contract is "deployed".
pub const CHAIN_ADDRESS: &str = "0x5eed0000000000000000000000000000000000c7";

struct ChainState {
    products: Vec<Product>,
    next_id: u64,
    now: u64,
    reads: u64,
    writes: u64,
}

/// Shared handle to the simulated chain. Clones observe the same state,
/// like independent browser tabs against one contract.
#[derive(Clone)]
pub struct MockChain {
    inner: Arc<Mutex<ChainState>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        MockChain {
            inner: Arc::new(Mutex::new(ChainState {
                products: Vec::new(),
                next_id: 1,
                now: 1_700_000_000,
                reads: 0,
                writes: 0,
            })),
        }
    }

    /// Total no-state-changing calls served.
    pub fn read_count(&self) -> u64 {
        self.inner.lock().unwrap().reads
    }

    /// Total transactions accepted or reverted.
    pub fn write_count(&self) -> u64 {
        self.inner.lock().unwrap().writes
    }

    /// Mutate a record behind the client's back, for stale-snapshot tests.
    pub fn rename_product(&self, id: u64, name: &str) {
        let mut state = self.inner.lock().unwrap();
        if let Some(p) = state.products.iter_mut().find(|p| p.id == id) {
            p.name = name.to_string();
        }
    }

    fn get_all(&self) -> Vec<Product> {
        let mut state = self.inner.lock().unwrap();
        state.reads += 1;
        state.products.clone()
    }

    fn add(&self, name: &str, from: &Address) {
        let mut state = self.inner.lock().unwrap();
        state.writes += 1;
        state.now += 1;
        let product = Product {
            id: state.next_id,
            name: name.to_string(),
            state: ProductState::Created,
            manufacturer: from.clone(),
            packer: Address::zero(),
            shipper: Address::zero(),
            retailer: Address::zero(),
            timestamp: state.now,
        };
        state.next_id += 1;
        tracing::debug!(id = product.id, name, "mock chain registered product");
        state.products.push(product);
    }

    /// Apply one transition, enforcing the contract's rules: the product
    /// must exist and must currently sit exactly one step before `target`.
    fn transition(
        &self,
        id: u64,
        target: ProductState,
        from: &Address,
    ) -> Result<(), GatewayError> {
        let mut state = self.inner.lock().unwrap();
        state.writes += 1;
        state.now += 1;
        let now = state.now;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| {
                GatewayError::TransactionFailed(format!(
                    "execution reverted: unknown product {id}"
                ))
            })?;
        let expected = ProductState::from_u8(target.as_u8() - 1).unwrap();
        if product.state != expected {
            return Err(GatewayError::TransactionFailed(format!(
                "execution reverted: product {id} is {}, not {expected}",
                product.state
            )));
        }
        product.state = target;
        product.timestamp = now;
        tracing::debug!(id, state = %target, "mock chain applied transition");
        match target {
            ProductState::Packed => product.packer = from.clone(),
            ProductState::Shipped => product.shipper = from.clone(),
            ProductState::Delivered => product.retailer = from.clone(),
            ProductState::Created => unreachable!("Created is never a transition target"),
        }
        Ok(())
    }
}

/// Contract binding handed out by `MockWallet::bind_contract`.
pub struct MockContract {
    chain: MockChain,
    address: String,
    from: Address,
}

impl MockContract {
    /// An address other than `CHAIN_ADDRESS` has no contract behind it;
    /// every call fails the way a provider reports a dead address.
    fn check_deployed(&self) -> Result<(), GatewayError> {
        if self.address == CHAIN_ADDRESS {
            Ok(())
        } else {
            Err(GatewayError::Provider(format!(
                "no contract deployed at {}",
                self.address
            )))
        }
    }
}

impl SupplyChainContract for MockContract {
    async fn get_all_products(&self) -> Result<Vec<Product>, GatewayError> {
        self.check_deployed()?;
        Ok(self.chain.get_all())
    }

    async fn add_product(&mut self, name: &str) -> Result<(), GatewayError> {
        self.check_deployed()?;
        self.chain.add(name, &self.from);
        Ok(())
    }

    async fn pack_product(&mut self, id: u64) -> Result<(), GatewayError> {
        self.check_deployed()?;
        self.chain.transition(id, ProductState::Packed, &self.from)
    }

    async fn ship_product(&mut self, id: u64) -> Result<(), GatewayError> {
        self.check_deployed()?;
        self.chain.transition(id, ProductState::Shipped, &self.from)
    }

    async fn deliver_product(&mut self, id: u64) -> Result<(), GatewayError> {
        self.check_deployed()?;
        self.chain
            .transition(id, ProductState::Delivered, &self.from)
    }
}

/// Simulated browser wallet for one user.
pub struct MockWallet {
    chain: MockChain,
    account: Address,
    /// Whether access was already granted in a "previous visit".
    authorized: bool,
    /// Deny the next access prompt, like a user clicking "cancel".
    deny: bool,
}

impl MockWallet {
    pub fn new(chain: &MockChain, account: &str) -> Self {
        MockWallet {
            chain: chain.clone(),
            account: Address(account.to_string()),
            authorized: false,
            deny: false,
        }
    }

    /// Wallet that already granted access on a previous visit.
    pub fn pre_authorized(chain: &MockChain, account: &str) -> Self {
        MockWallet {
            authorized: true,
            ..Self::new(chain, account)
        }
    }

    /// Wallet whose user will reject the access prompt.
    pub fn denying(chain: &MockChain, account: &str) -> Self {
        MockWallet {
            deny: true,
            ..Self::new(chain, account)
        }
    }
}

impl WalletProvider for MockWallet {
    type Contract = MockContract;

    async fn request_accounts(&mut self) -> Result<Vec<Address>, SessionError> {
        if self.deny {
            return Err(SessionError::Provider(
                "user rejected the request".to_string(),
            ));
        }
        self.authorized = true;
        Ok(vec![self.account.clone()])
    }

    async fn accounts(&self) -> Result<Vec<Address>, SessionError> {
        if self.authorized {
            Ok(vec![self.account.clone()])
        } else {
            Ok(Vec::new())
        }
    }

    fn bind_contract(&self, address: &str) -> Result<MockContract, SessionError> {
        // No format validation, mirroring the real binding: a bad address
        // fails on its first call, not here.
        Ok(MockContract {
            chain: self.chain.clone(),
            address: address.to_string(),
            from: self.account.clone(),
        })
    }
}
