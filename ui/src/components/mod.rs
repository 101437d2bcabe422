pub mod add_product;
pub mod app;
pub mod chain_api;
#[cfg(target_family = "wasm")]
pub mod eth;
pub mod product_list;
pub mod shared_state;
pub mod update_product;
