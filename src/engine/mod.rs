//! Terminal front end for the reconciliation engine
//!
//! 1. Login - Authenticate against the admin API
//! 2. Listing - Fetch every proxy host
//! 3. Reconciling - Evaluate, diff, confirm and apply per host

pub mod differ;
pub mod executor;
pub mod prompt;

pub use executor::{ExecuteOptions, execute};
