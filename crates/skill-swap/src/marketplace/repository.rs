use super::domain::{SwapRequest, SwapRequestId, SwapStatus, User, UserId};

/// Storage abstraction for the `User` collection.
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the id or e-mail is already taken.
    fn insert(&self, user: User) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    /// Every profile in signup order.
    fn list(&self) -> Result<Vec<User>, RepositoryError>;
    fn remove(&self, id: &UserId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for the `SwapRequest` collection.
pub trait SwapRepository: Send + Sync {
    fn insert(&self, request: SwapRequest) -> Result<SwapRequest, RepositoryError>;
    fn fetch(&self, id: &SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError>;
    /// Atomically replace the status if it still equals `expected`.
    ///
    /// Returns `Conflict` when another writer moved the record first.
    fn transition(
        &self,
        id: &SwapRequestId,
        expected: SwapStatus,
        next: SwapStatus,
    ) -> Result<SwapRequest, RepositoryError>;
    /// Requests where `user` is the sender or the recipient.
    fn for_user(&self, user: &UserId) -> Result<Vec<SwapRequest>, RepositoryError>;
    fn all(&self) -> Result<Vec<SwapRequest>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists or was modified concurrently")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
