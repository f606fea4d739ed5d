//! Mutex-guarded in-memory collections used by the default server and the demo.

use std::sync::{Arc, Mutex, MutexGuard};

use super::domain::{SwapRequest, SwapRequestId, SwapStatus, User, UserId};
use super::repository::{RepositoryError, SwapRepository, UserRepository};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("collection lock poisoned".to_string()))
}

#[derive(Default, Clone)]
pub struct InMemoryUserRepository {
    records: Arc<Mutex<Vec<User>>>,
}

impl UserRepository for InMemoryUserRepository {
    fn insert(&self, user: User) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard
            .iter()
            .any(|existing| existing.id == user.id || existing.email == user.email)
        {
            return Err(RepositoryError::Conflict);
        }
        guard.push(user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        match guard.iter_mut().find(|existing| existing.id == user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|user| &user.id == id).cloned())
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }

    fn remove(&self, id: &UserId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        let before = guard.len();
        guard.retain(|user| &user.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemorySwapRepository {
    records: Arc<Mutex<Vec<SwapRequest>>>,
}

impl SwapRepository for InMemorySwapRepository {
    fn insert(&self, request: SwapRequest) -> Result<SwapRequest, RepositoryError> {
        let mut guard = lock(&self.records)?;
        if guard.iter().any(|existing| existing.id == request.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(request.clone());
        Ok(request)
    }

    fn fetch(&self, id: &SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.iter().find(|request| &request.id == id).cloned())
    }

    fn transition(
        &self,
        id: &SwapRequestId,
        expected: SwapStatus,
        next: SwapStatus,
    ) -> Result<SwapRequest, RepositoryError> {
        let mut guard = lock(&self.records)?;
        let record = guard
            .iter_mut()
            .find(|request| &request.id == id)
            .ok_or(RepositoryError::NotFound)?;
        if record.status != expected {
            return Err(RepositoryError::Conflict);
        }
        record.status = next;
        Ok(record.clone())
    }

    /// Newest insertion first.
    fn for_user(&self, user: &UserId) -> Result<Vec<SwapRequest>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard
            .iter()
            .rev()
            .filter(|request| request.involves(user))
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<SwapRequest>, RepositoryError> {
        Ok(lock(&self.records)?.clone())
    }
}
