pub mod filter;
pub mod provider;
