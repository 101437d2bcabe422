//! Last-fetched snapshot of the contract's product list.

use crate::product::Product;

/// Holds the last full snapshot, ordered by id.
///
/// Replaced wholesale on every refresh; never incrementally patched. The
/// contract stays the single source of truth at the cost of a full re-read
/// after each mutation.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    products: Vec<Product>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with a fresh full read.
    pub fn replace(&mut self, mut products: Vec<Product>) {
        products.sort_by_key(|p| p.id);
        self.products = products;
    }

    pub fn get(&self, id: u64) -> Option<&Product> {
        self.products
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &self.products[i])
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
