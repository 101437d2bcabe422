//! `window.ethereum` (EIP-1193) bindings.
//!
//! Everything JS-typed lives in this module; the rest of the app only sees
//! the `WalletProvider` / `SupplyChainContract` traits from
//! provenance-common.

use futures::channel::mpsc::UnboundedSender;
use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use provenance_common::abi;
use provenance_common::address::Address;
use provenance_common::gateway::{
    GatewayError, SupplyChainContract, ADD_PRODUCT, GET_ALL_PRODUCTS,
};
use provenance_common::policy::TxMethod;
use provenance_common::product::Product;
use provenance_common::session::{SessionError, WalletProvider};

/// Poll interval while waiting for a transaction receipt.
const RECEIPT_POLL_MS: u32 = 1_000;

/// Handle to the injected EIP-1193 provider object.
#[derive(Clone)]
pub struct EthereumProvider {
    inner: JsValue,
}

/// Locate `window.ethereum` and subscribe to account changes.
///
/// Returns None when no wallet extension is injected. The subscription
/// pushes account lists into `accounts_tx` for the page lifetime; the
/// closure is leaked deliberately since it must outlive every caller.
pub fn detect_provider(accounts_tx: UnboundedSender<Vec<Address>>) -> Option<EthereumProvider> {
    let window = web_sys::window()?;
    let ethereum = Reflect::get(window.as_ref(), &JsValue::from_str("ethereum")).ok()?;
    if ethereum.is_undefined() || ethereum.is_null() {
        return None;
    }

    let on_accounts = Closure::<dyn FnMut(JsValue)>::new(move |accounts: JsValue| {
        let _ = accounts_tx.unbounded_send(js_accounts(&accounts));
    });
    if let Ok(on) = Reflect::get(&ethereum, &JsValue::from_str("on")) {
        if let Some(on) = on.dyn_ref::<Function>() {
            let _ = on.call2(
                &ethereum,
                &JsValue::from_str("accountsChanged"),
                on_accounts.as_ref().unchecked_ref(),
            );
        }
    }
    on_accounts.forget();

    Some(EthereumProvider { inner: ethereum })
}

/// Coerce a JS array of account strings.
fn js_accounts(value: &JsValue) -> Vec<Address> {
    Array::from(value)
        .iter()
        .filter_map(|v| v.as_string())
        .map(Address)
        .collect()
}

/// Render a JS error: providers reject with `{ code, message }` objects.
fn js_error(value: JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    Reflect::get(&value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

impl EthereumProvider {
    /// Issue a JSON-RPC request through the provider and await the promise.
    async fn request(&self, method: &str, params: &Array) -> Result<JsValue, String> {
        let args = Object::new();
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method))
            .map_err(js_error)?;
        Reflect::set(&args, &JsValue::from_str("params"), params).map_err(js_error)?;

        let request = Reflect::get(&self.inner, &JsValue::from_str("request")).map_err(js_error)?;
        let request: &Function = request
            .dyn_ref()
            .ok_or_else(|| "provider has no request()".to_string())?;
        let promise: Promise = request
            .call1(&self.inner, &args)
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| format!("{method} did not return a promise"))?;
        JsFuture::from(promise).await.map_err(js_error)
    }
}

impl WalletProvider for EthereumProvider {
    type Contract = EthContract;

    async fn request_accounts(&mut self) -> Result<Vec<Address>, SessionError> {
        let result = self
            .request("eth_requestAccounts", &Array::new())
            .await
            .map_err(SessionError::Provider)?;
        Ok(js_accounts(&result))
    }

    async fn accounts(&self) -> Result<Vec<Address>, SessionError> {
        let result = self
            .request("eth_accounts", &Array::new())
            .await
            .map_err(SessionError::Provider)?;
        Ok(js_accounts(&result))
    }

    fn bind_contract(&self, address: &str) -> Result<EthContract, SessionError> {
        Ok(EthContract {
            provider: self.clone(),
            address: address.to_string(),
        })
    }
}

/// Binding to the supply-chain contract: encodes calldata for the fixed
/// ABI and routes it through the provider.
pub struct EthContract {
    provider: EthereumProvider,
    address: String,
}

impl EthContract {
    /// `eth_call`: read without a state change.
    async fn call(&self, data: Vec<u8>) -> Result<Vec<u8>, GatewayError> {
        let tx = Object::new();
        let set = |key: &str, value: &str| {
            Reflect::set(&tx, &JsValue::from_str(key), &JsValue::from_str(value))
                .map_err(|e| GatewayError::Provider(js_error(e)))
        };
        set("to", &self.address)?;
        set("data", &abi::to_hex(&data))?;

        let params = Array::of2(&tx, &JsValue::from_str("latest"));
        let result = self
            .provider
            .request("eth_call", &params)
            .await
            .map_err(GatewayError::Provider)?;
        let payload = result
            .as_string()
            .ok_or_else(|| GatewayError::Decode("eth_call returned a non-string".into()))?;
        abi::from_hex(&payload).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    /// `eth_sendTransaction` from the active account, awaited to inclusion.
    async fn send(&mut self, data: Vec<u8>) -> Result<(), GatewayError> {
        let from = self
            .provider
            .accounts()
            .await
            .map_err(|e| GatewayError::Provider(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::Rejected("no active account".into()))?;

        let tx = Object::new();
        let set = |key: &str, value: &str| {
            Reflect::set(&tx, &JsValue::from_str(key), &JsValue::from_str(value))
                .map_err(|e| GatewayError::Provider(js_error(e)))
        };
        set("from", &from.0)?;
        set("to", &self.address)?;
        set("data", &abi::to_hex(&data))?;

        let params = Array::of1(&tx);
        let tx_hash = self
            .provider
            .request("eth_sendTransaction", &params)
            .await
            .map_err(GatewayError::Rejected)?;
        let tx_hash = tx_hash
            .as_string()
            .ok_or_else(|| GatewayError::Decode("transaction hash missing".into()))?;
        self.await_receipt(&tx_hash).await
    }

    /// Poll until the transaction is mined. No timeout: a hung wallet
    /// prompt or slow network keeps the triggering interaction suspended,
    /// matching the page lifecycle.
    async fn await_receipt(&self, tx_hash: &str) -> Result<(), GatewayError> {
        loop {
            let params = Array::of1(&JsValue::from_str(tx_hash));
            let receipt = self
                .provider
                .request("eth_getTransactionReceipt", &params)
                .await
                .map_err(GatewayError::Provider)?;
            if !receipt.is_null() && !receipt.is_undefined() {
                let status = Reflect::get(&receipt, &JsValue::from_str("status"))
                    .ok()
                    .and_then(|s| s.as_string());
                return match status.as_deref() {
                    Some("0x0") => Err(GatewayError::TransactionFailed(format!(
                        "transaction {tx_hash} reverted"
                    ))),
                    _ => Ok(()),
                };
            }
            gloo_timers::future::TimeoutFuture::new(RECEIPT_POLL_MS).await;
        }
    }
}

impl SupplyChainContract for EthContract {
    async fn get_all_products(&self) -> Result<Vec<Product>, GatewayError> {
        let raw = self.call(abi::encode_nullary_call(GET_ALL_PRODUCTS)).await?;
        abi::decode_product_array(&raw).map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn add_product(&mut self, name: &str) -> Result<(), GatewayError> {
        self.send(abi::encode_string_call(ADD_PRODUCT, name)).await
    }

    async fn pack_product(&mut self, id: u64) -> Result<(), GatewayError> {
        self.send(abi::encode_uint_call(TxMethod::PackProduct.signature(), id))
            .await
    }

    async fn ship_product(&mut self, id: u64) -> Result<(), GatewayError> {
        self.send(abi::encode_uint_call(TxMethod::ShipProduct.signature(), id))
            .await
    }

    async fn deliver_product(&mut self, id: u64) -> Result<(), GatewayError> {
        self.send(abi::encode_uint_call(
            TxMethod::DeliverProduct.signature(),
            id,
        ))
        .await
    }
}
