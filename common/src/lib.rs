pub mod abi;
pub mod address;
pub mod gateway;
pub mod policy;
pub mod product;
pub mod session;
pub mod store;
pub mod tracker;
