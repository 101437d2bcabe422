use dioxus::prelude::*;

use provenance_common::policy::next_action;

use super::chain_api::{use_chain_action, ChainAction};
use super::shared_state::use_shared_state;

#[component]
pub fn UpdateProduct() -> Element {
    let shared = use_shared_state();
    let chain = use_chain_action();
    let mut selected = use_signal(|| None::<u64>);

    let state = shared.read();
    let products = state.products.clone();
    let busy = state.busy.clone();
    let loading = state.loading;
    drop(state);

    let selected_id: Option<u64> = *selected.read();
    let selected_product = selected_id.and_then(|id| products.iter().find(|p| p.id == id));
    let action = selected_product.and_then(|p| next_action(p.state));
    let in_flight = selected_id.map(|id| busy.contains(&id)).unwrap_or(false);

    let state_label = selected_product.map(|p| p.state.label());
    let action_hint =
        action.map(|a| format!("Next action: {} → {}", a.label, a.resulting_state.label()));
    let button_label = action
        .map(|a| format!("{} Product", a.label))
        .unwrap_or_else(|| "Select Product".to_string());

    rsx! {
        div { class: "panel update-product",
            h2 { "Update Product State" }
            div { class: "form-group",
                label { "Select product:" }
                select {
                    disabled: loading,
                    onchange: move |evt| selected.set(evt.value().parse().ok()),
                    option { value: "", "Choose a product…" }
                    {products.iter().map(|p| {
                        let summary = format!("#{} - {} ({})", p.id, p.name, p.state.label());
                        rsx! {
                            option { key: "{p.id}", value: "{p.id}", "{summary}" }
                        }
                    })}
                }
            }

            if let Some(state_label) = state_label {
                div { class: "status-card",
                    h3 { "Current Status" }
                    p { "State: " strong { "{state_label}" } }
                    if let Some(hint) = action_hint {
                        p { class: "next-action", "{hint}" }
                    } else {
                        p { class: "terminal-note", "This product has been delivered." }
                    }
                }
            }

            button {
                disabled: loading || in_flight || action.is_none(),
                onclick: move |_| {
                    if let Some(id) = *selected.read() {
                        chain.send(ChainAction::Advance { id });
                    }
                },
                if in_flight { "Updating…" } else { "{button_label}" }
            }
        }
    }
}
