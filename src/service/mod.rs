pub mod credential_manager;
pub mod password;

pub use credential_manager::{AuthSession, CredentialManager, CredentialPolicy, Credentials};
