use dioxus::prelude::*;

/// Actions the UI sends to the chain coroutine.
#[derive(Debug, Clone)]
pub enum ChainAction {
    /// Prompt the wallet for account access.
    Connect,
    /// Bind the supply-chain contract at the given address and fetch
    /// the product list.
    LoadContract { address: String },
    /// Re-read the full product list.
    Refresh,
    /// Register a new product.
    AddProduct { name: String },
    /// Advance a product one step along the chain.
    Advance { id: u64 },
}

/// Get a handle to send actions to the chain coroutine.
pub fn use_chain_action() -> Coroutine<ChainAction> {
    use_coroutine_handle::<ChainAction>()
}

/// Default contract address: baked in at compile time, overridable at
/// runtime with a `?contract=0x…` query parameter.
pub fn default_contract_address() -> Option<String> {
    let compile_time = option_env!("PROVENANCE_CONTRACT_ADDRESS");

    #[cfg(target_family = "wasm")]
    {
        let query = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .and_then(|qs| web_sys::UrlSearchParams::new_with_str(&qs).ok()?.get("contract"));
        if query.is_some() {
            return query;
        }
    }

    compile_time.map(str::to_string)
}

/// Start the chain communication coroutine.
///
/// In the browser this owns the wallet session and the contract binding.
/// On other targets it is a no-op sink so the crate still builds in a
/// desktop dev shell.
pub fn use_chain_coroutine() {
    #[cfg(not(target_family = "wasm"))]
    {
        use_coroutine(|mut rx: UnboundedReceiver<ChainAction>| async move {
            use futures::StreamExt;
            while let Some(action) = rx.next().await {
                tracing::debug!("chain action (offline mode): {:?}", action);
            }
        });
    }

    #[cfg(target_family = "wasm")]
    {
        use_coroutine(|rx: UnboundedReceiver<ChainAction>| wasm_impl::chain_comms(rx));
    }
}

// ─── WASM implementation ────────────────────────────────────────────────────

#[cfg(target_family = "wasm")]
mod wasm_impl {
    use dioxus::prelude::*;
    use futures::channel::mpsc;
    use futures::StreamExt;

    use provenance_common::tracker::Tracker;

    use super::{default_contract_address, ChainAction};
    use crate::components::eth::{detect_provider, EthereumProvider};
    use crate::components::shared_state::{use_shared_state, SharedState};

    /// Main chain communication loop. Owns the tracker for the page
    /// lifetime; components talk to it through `ChainAction` messages.
    pub async fn chain_comms(mut rx: UnboundedReceiver<ChainAction>) {
        let mut shared = use_shared_state();

        // Account-change notifications arrive through this channel from the
        // provider's JS subscription.
        let (accounts_tx, mut accounts_rx) = mpsc::unbounded();

        let provider = detect_provider(accounts_tx);
        if provider.is_none() {
            tracing::warn!("no wallet extension detected");
        }
        let mut tracker: Tracker<EthereumProvider> = Tracker::new(provider);

        // Silent restore: adopt a previously-authorized session, then
        // auto-load the configured contract if one is set.
        match tracker.restore().await {
            Ok(true) => {
                sync(&mut shared, &tracker);
                if let Some(address) = default_contract_address() {
                    shared.write().loading = true;
                    let result = tracker.load_contract(&address).await;
                    shared.write().loading = false;
                    sync(&mut shared, &tracker);
                    if let Err(e) = result {
                        // Auto-load is best-effort; the user can still load
                        // an address by hand.
                        tracing::error!("auto-load of {address} failed: {e}");
                    }
                }
            }
            Ok(false) => {}
            Err(e) => tracing::error!("session restore failed: {e}"),
        }

        loop {
            futures::select! {
                action = rx.next() => {
                    let Some(action) = action else { break };
                    handle_action(action, &mut tracker, &mut shared).await;
                }
                accounts = accounts_rx.next() => {
                    if let Some(accounts) = accounts {
                        tracker.accounts_changed(accounts);
                        sync(&mut shared, &tracker);
                    }
                }
            }
        }
    }

    async fn handle_action(
        action: ChainAction,
        tracker: &mut Tracker<EthereumProvider>,
        shared: &mut Signal<SharedState>,
    ) {
        {
            let mut s = shared.write();
            s.last_error = None;
            s.last_success = None;
        }

        let result = match action {
            ChainAction::Connect => tracker
                .connect_wallet()
                .await
                .map(|account| Some(format!("Connected as {}", account.short()))),
            ChainAction::LoadContract { address } => {
                shared.write().loading = true;
                tracker
                    .load_contract(&address)
                    .await
                    .map(|()| Some("Contract loaded".to_string()))
            }
            ChainAction::Refresh => {
                shared.write().loading = true;
                tracker.refresh().await.map(|()| None)
            }
            ChainAction::AddProduct { name } => {
                let label = name.trim().to_string();
                tracker
                    .add_product(&name)
                    .await
                    .map(|()| Some(format!("Product \"{label}\" added")))
            }
            ChainAction::Advance { id } => {
                shared.write().busy.insert(id);
                let result = tracker.advance(id).await.map(|action| {
                    Some(format!("Product #{id} is now {}", action.resulting_state))
                });
                shared.write().busy.remove(&id);
                result
            }
        };

        shared.write().loading = false;
        sync(shared, tracker);
        match result {
            Ok(message) => shared.write().last_success = message,
            Err(e) => {
                tracing::error!("chain action failed: {e}");
                shared.write().last_error = Some(e.to_string());
            }
        }
    }

    /// Mirror the tracker's view of the world into the shared signal.
    fn sync(shared: &mut Signal<SharedState>, tracker: &Tracker<EthereumProvider>) {
        let mut s = shared.write();
        s.account = tracker.account().cloned();
        s.connected = tracker.is_connected();
        s.contract_address = tracker.contract_address().map(str::to_string);
        s.products = tracker.products().to_vec();
    }
}
