use dioxus::prelude::*;

use super::chain_api::{use_chain_action, ChainAction};
use super::shared_state::use_shared_state;

#[component]
pub fn AddProduct() -> Element {
    let shared = use_shared_state();
    let chain = use_chain_action();
    let mut name_input = use_signal(String::new);

    let loading = shared.read().loading;

    rsx! {
        div { class: "panel add-product",
            h2 { "Add New Product" }
            div { class: "form-group",
                label { "Product name:" }
                input {
                    r#type: "text",
                    placeholder: "Enter product name",
                    value: "{name_input}",
                    disabled: loading,
                    oninput: move |evt| name_input.set(evt.value()),
                }
            }
            button {
                disabled: loading,
                onclick: move |_| {
                    // Empty names are rejected client-side before any call;
                    // the tracker surfaces the message.
                    chain.send(ChainAction::AddProduct {
                        name: name_input.read().clone(),
                    });
                    name_input.set(String::new());
                },
                if loading { "Adding Product…" } else { "Add Product" }
            }
        }
    }
}
