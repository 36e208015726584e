mod error;
mod file_store;
mod memory_store;

pub use error::{Result as StoreResult, StoreError};
pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the role name issued with the token.
pub const ROLE_KEY: &str = "role";

/// Local key-value storage for the persisted session.
///
/// Multi-key writes and removals are applied as one unit so a reader never
/// observes a token without its role. Concurrent writers are not
/// reconciled: the last write wins.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set_all(&self, entries: &[(&str, &str)]) -> StoreResult<()>;

    /// Missing keys are ignored.
    fn remove_all(&self, keys: &[&str]) -> StoreResult<()>;
}
