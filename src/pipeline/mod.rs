pub mod classifier;
pub mod pii;
pub mod policy;
pub mod prompt;
pub mod safety;
