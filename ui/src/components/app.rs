use dioxus::prelude::*;

use super::add_product::AddProduct;
use super::chain_api::{
    default_contract_address, use_chain_action, use_chain_coroutine, ChainAction,
};
use super::product_list::ProductList;
use super::shared_state::{use_shared_state, SharedState};
use super::update_product::UpdateProduct;

#[component]
pub fn App() -> Element {
    use_context_provider(|| Signal::new(SharedState::new()));
    use_chain_coroutine();

    rsx! { Shell {} }
}

#[component]
fn Shell() -> Element {
    let shared = use_shared_state();
    let chain = use_chain_action();
    let mut address_input = use_signal(|| default_contract_address().unwrap_or_default());

    let state = shared.read();
    let connected = state.connected;
    let account_short = state.account.as_ref().map(|a| a.short());
    let contract_loaded = state.contract_loaded();
    let loading = state.loading;
    let last_error = state.last_error.clone();
    let last_success = state.last_success.clone();
    drop(state);

    rsx! {
        div { class: "provenance-app",
            header { class: "app-header",
                div { class: "header-top",
                    h1 { "PROVENANCE" }
                    if let Some(account) = account_short {
                        div { class: "wallet-info",
                            span { class: "wallet-label", "Connected" }
                            span { class: "wallet-account", "{account}" }
                        }
                    } else {
                        button {
                            onclick: move |_| { chain.send(ChainAction::Connect); },
                            "Connect Wallet"
                        }
                    }
                }
                p { "On-chain supply-chain tracking" }
            }

            if let Some(err) = last_error {
                div { class: "banner banner-error", "{err}" }
            }
            if let Some(msg) = last_success {
                div { class: "banner banner-success", "{msg}" }
            }

            if connected && !contract_loaded {
                div { class: "panel load-contract",
                    h2 { "Load Smart Contract" }
                    div { class: "form-group",
                        input {
                            r#type: "text",
                            placeholder: "Enter contract address (0x…)",
                            value: "{address_input}",
                            oninput: move |evt| address_input.set(evt.value()),
                        }
                        button {
                            disabled: loading,
                            onclick: move |_| {
                                chain.send(ChainAction::LoadContract {
                                    address: address_input.read().clone(),
                                });
                            },
                            "Load Contract"
                        }
                    }
                }
            }

            if contract_loaded {
                main {
                    div { class: "panel-grid",
                        AddProduct {}
                        UpdateProduct {}
                    }
                    ProductList {}
                }
            }

            if !connected {
                div { class: "welcome",
                    h2 { "Welcome to Provenance" }
                    p { "Connect your wallet to start tracking products on the blockchain." }
                    button {
                        onclick: move |_| { chain.send(ChainAction::Connect); },
                        "Connect Wallet"
                    }
                }
            }
        }
    }
}
