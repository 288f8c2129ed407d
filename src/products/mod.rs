pub mod repo_types;
pub mod seed;

pub use repo_types::TransactionRecord;
