//! Wallet-connection and contract-binding lifecycle.

use std::fmt;

use crate::address::Address;
use crate::gateway::SupplyChainContract;

/// Errors from session lifecycle operations.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionError {
    /// No wallet extension is present in this environment.
    ProviderUnavailable,
    /// A contract action was attempted before a provider session existed.
    NotInitialized,
    /// The provider failed or the user rejected the request; the provider's
    /// message is passed through verbatim.
    Provider(String),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::ProviderUnavailable => write!(f, "no wallet extension detected"),
            SessionError::NotInitialized => write!(f, "wallet session not initialized"),
            SessionError::Provider(msg) => write!(f, "{msg}"),
        }
    }
}

/// Browser-injected wallet agent: account access plus contract binding.
///
/// Account-change notifications don't fit an async-return shape; platform
/// adapters deliver them by calling `Session::accounts_changed` from their
/// subscription callback.
#[allow(async_fn_in_trait)]
pub trait WalletProvider {
    type Contract: SupplyChainContract;

    /// Prompt the user for account access; returns the authorized accounts.
    async fn request_accounts(&mut self) -> Result<Vec<Address>, SessionError>;

    /// Currently authorized accounts, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, SessionError>;

    /// Construct a contract binding for the fixed ABI at `address`. No
    /// format validation beyond non-empty; a malformed address surfaces as
    /// a provider error on the binding's first call.
    fn bind_contract(&self, address: &str) -> Result<Self::Contract, SessionError>;
}

/// Owns the wallet-connection and contract-instance lifecycle.
pub struct Session<P: WalletProvider> {
    provider: Option<P>,
    contract: Option<P::Contract>,
    account: Option<Address>,
    contract_address: Option<String>,
    /// True once a provider session exists (explicit connect or silent
    /// restore); gate for contract loading.
    initialized: bool,
}

impl<P: WalletProvider> Session<P> {
    /// `provider: None` models an environment without a wallet extension.
    pub fn new(provider: Option<P>) -> Self {
        Session {
            provider,
            contract: None,
            account: None,
            contract_address: None,
            initialized: false,
        }
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn contract(&self) -> Option<&P::Contract> {
        self.contract.as_ref()
    }

    pub fn contract_mut(&mut self) -> Option<&mut P::Contract> {
        self.contract.as_mut()
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.contract_address.as_deref()
    }

    /// Request account access and adopt the first authorized account.
    pub async fn connect_wallet(&mut self) -> Result<Address, SessionError> {
        let provider = self
            .provider
            .as_mut()
            .ok_or(SessionError::ProviderUnavailable)?;
        let accounts = provider.request_accounts().await?;
        let first = accounts
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::Provider("wallet returned no accounts".into()))?;
        tracing::info!(account = %first, "wallet connected");
        self.account = Some(first.clone());
        self.initialized = true;
        Ok(first)
    }

    /// Silent startup restore: if the provider already reports an authorized
    /// account, adopt it without prompting. Returns whether a session was
    /// restored.
    pub async fn restore(&mut self) -> Result<bool, SessionError> {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(false);
        };
        match provider.accounts().await?.into_iter().next() {
            Some(first) => {
                tracing::info!(account = %first, "restored existing wallet session");
                self.account = Some(first);
                self.initialized = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Account-change notification from the provider subscription. An empty
    /// list means the wallet revoked access: the account and the contract
    /// binding are torn down.
    pub fn accounts_changed(&mut self, accounts: Vec<Address>) {
        match accounts.into_iter().next() {
            Some(first) => {
                tracing::info!(account = %first, "active account changed");
                self.account = Some(first);
            }
            None => {
                tracing::info!("wallet disconnected, tearing down session");
                self.account = None;
                self.contract = None;
                self.contract_address = None;
            }
        }
    }

    /// Bind the supply-chain contract at `address`.
    pub fn load_contract(&mut self, address: &str) -> Result<(), SessionError> {
        if !self.initialized {
            return Err(SessionError::NotInitialized);
        }
        let provider = self
            .provider
            .as_ref()
            .ok_or(SessionError::ProviderUnavailable)?;
        self.contract = Some(provider.bind_contract(address)?);
        self.contract_address = Some(address.to_string());
        tracing::info!(%address, "contract loaded");
        Ok(())
    }
}
