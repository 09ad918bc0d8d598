pub mod kv;
pub mod store;

pub use kv::KvCredentialStore;
pub use store::{CredentialError, CredentialStore, CredentialWrite};
