pub mod listing;
pub mod message;
pub mod run_result;
