use dioxus::prelude::*;

use provenance_common::product::{Product, ProductState};

use super::chain_api::{use_chain_action, ChainAction};
use super::shared_state::use_shared_state;

fn format_timestamp(product: &Product) -> String {
    match product.updated_at() {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "-".to_string(),
    }
}

#[component]
pub fn ProductList() -> Element {
    let shared = use_shared_state();
    let chain = use_chain_action();

    let state = shared.read();
    let products = state.products.clone();
    let loading = state.loading;
    drop(state);

    rsx! {
        div { class: "panel product-list",
            div { class: "list-header",
                h2 { "Product Tracking" }
                button {
                    disabled: loading,
                    onclick: move |_| { chain.send(ChainAction::Refresh); },
                    "Refresh"
                }
            }

            if loading {
                p { class: "loading", "Loading products…" }
            } else if products.is_empty() {
                p { class: "empty-state",
                    "No products found. Add your first product to get started!"
                }
            } else {
                div { class: "product-cards",
                    {products.iter().map(|product| {
                        rsx! { ProductCard { product: product.clone() } }
                    })}
                }
            }
        }
    }
}

#[component]
fn ProductCard(product: Product) -> Element {
    let updated = format_timestamp(&product);
    let state_label = product.state.label();
    let state_class = format!("state-badge state-{}", state_label.to_lowercase());

    // Participants appear in chain order, only once assigned
    let participants: Vec<(&'static str, String)> = ProductState::all()
        .iter()
        .filter_map(|&s| {
            let who = product.participant(s);
            if who.is_zero() {
                None
            } else {
                let role = match s {
                    ProductState::Created => "Manufacturer",
                    ProductState::Packed => "Packer",
                    ProductState::Shipped => "Shipper",
                    ProductState::Delivered => "Retailer",
                };
                Some((role, who.short()))
            }
        })
        .collect();

    rsx! {
        div { class: "product-card",
            key: "{product.id}",
            div { class: "card-header",
                h3 { span { class: "product-id", "#{product.id} " } "{product.name}" }
                span { class: "{state_class}", "{state_label}" }
            }
            p { class: "card-updated", "Last updated: {updated}" }

            div { class: "participants",
                {participants.iter().map(|(role, who)| {
                    rsx! {
                        span { class: "participant", key: "{role}",
                            span { class: "participant-role", "{role}: " }
                            span { class: "participant-addr", "{who}" }
                        }
                    }
                })}
            }

            div { class: "progress-rail",
                {ProductState::all().iter().map(|&step| {
                    let reached = if step <= product.state { "step reached" } else { "step" };
                    let label = step.label();
                    rsx! {
                        div { class: "{reached}", key: "{label}", "{label}" }
                    }
                })}
            }
        }
    }
}
