use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::directory::{find_skill_matches, list_public_users};
use super::domain::{
    ProfileUpdate, SignupRequest, SkillId, SwapDirection, SwapPartition, SwapRequest,
    SwapRequestId, SwapStatus, SwapSubmission, User, UserId,
};
use super::guard::{
    non_blank, required, skills_from_inputs, SwapRequestGuard, SwapValidationError,
};
use super::lifecycle::{authorize, TransitionError};
use super::repository::{RepositoryError, SwapRepository, UserRepository};

/// Service composing the request guard, both collections, and the lifecycle rules.
pub struct SkillSwapService<U, S> {
    guard: Arc<SwapRequestGuard>,
    users: Arc<U>,
    swaps: Arc<S>,
    clock: Arc<dyn Clock>,
}

static USER_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SKILL_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static SWAP_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_user_id() -> UserId {
    let id = USER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    UserId(format!("user-{id:06}"))
}

fn next_skill_id() -> SkillId {
    let id = SKILL_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SkillId(format!("skill-{id:06}"))
}

fn next_swap_id() -> SwapRequestId {
    let id = SWAP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SwapRequestId(format!("swap-{id:06}"))
}

impl<U, S> SkillSwapService<U, S>
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    pub fn new(users: Arc<U>, swaps: Arc<S>, guard: SwapRequestGuard) -> Self {
        Self::with_clock(users, swaps, guard, Arc::new(SystemClock))
    }

    pub fn with_clock(
        users: Arc<U>,
        swaps: Arc<S>,
        guard: SwapRequestGuard,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            guard: Arc::new(guard),
            users,
            swaps,
            clock,
        }
    }

    pub fn guard(&self) -> &SwapRequestGuard {
        &self.guard
    }

    /// Register a new profile.
    pub fn signup(&self, signup: SignupRequest) -> Result<User, MarketplaceError> {
        let mut skill_ids = next_skill_id;
        let user = self
            .guard
            .user_from_signup(next_user_id(), signup, &mut skill_ids)?;

        match self.users.insert(user) {
            Ok(stored) => {
                info!(user_id = %stored.id, "user signed up");
                Ok(stored)
            }
            Err(RepositoryError::Conflict) => Err(MarketplaceError::Conflict(
                "email is already registered".to_string(),
            )),
            Err(other) => Err(other.into()),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>, MarketplaceError> {
        Ok(self.users.list()?)
    }

    pub fn get_user(&self, id: &UserId) -> Result<User, MarketplaceError> {
        self.users
            .fetch(id)?
            .ok_or_else(|| MarketplaceError::not_found("user", &id.0))
    }

    /// Apply a profile edit on behalf of its owner.
    pub fn update_profile(
        &self,
        actor: &UserId,
        id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, MarketplaceError> {
        ensure_owner(actor, id, "edit this profile")?;
        let mut user = self.get_user(id)?;
        let mut skill_ids = next_skill_id;

        if let Some(name) = update.name {
            user.name = required("name", name)?;
        }
        if let Some(location) = update.location {
            user.location = non_blank(Some(location));
        }
        if let Some(avatar_url) = update.avatar_url {
            user.avatar_url = non_blank(Some(avatar_url));
        }
        if let Some(availability) = update.availability {
            user.availability = availability.trim().to_string();
        }
        if let Some(profile_public) = update.profile_public {
            user.profile_public = profile_public;
        }
        if let Some(offered) = update.skills_offered {
            user.skills_offered = skills_from_inputs(offered, &mut skill_ids)?;
        }
        if let Some(requested) = update.skills_requested {
            user.skills_requested = skills_from_inputs(requested, &mut skill_ids)?;
        }

        self.users.update(user.clone())?;
        debug!(user_id = %user.id, public = user.profile_public, "profile updated");
        Ok(user)
    }

    /// Remove a profile. Refused while the user still has pending swaps.
    pub fn delete_user(&self, actor: &UserId, id: &UserId) -> Result<(), MarketplaceError> {
        ensure_owner(actor, id, "delete this profile")?;
        self.get_user(id)?;

        let pending = self
            .swaps
            .for_user(id)?
            .iter()
            .filter(|request| request.status == SwapStatus::Pending)
            .count();
        if pending > 0 {
            return Err(MarketplaceError::Conflict(format!(
                "user has {pending} pending swap request(s); resolve them before deleting"
            )));
        }

        self.users.remove(id)?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    /// Public profiles other than `excluding`.
    pub fn list_public_users(
        &self,
        excluding: Option<&UserId>,
    ) -> Result<Vec<User>, MarketplaceError> {
        let users = self.users.list()?;
        Ok(list_public_users(&users, excluding)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Public profiles offering a skill matching `query`.
    pub fn browse(
        &self,
        query: Option<&str>,
        excluding: Option<&UserId>,
    ) -> Result<Vec<User>, MarketplaceError> {
        let users = self.users.list()?;
        let candidates = list_public_users(&users, excluding);
        let matches = find_skill_matches(query.unwrap_or_default(), candidates);
        Ok(matches.into_iter().cloned().collect())
    }

    /// Store a new pending swap request.
    ///
    /// When `actor` is known it must be the sender.
    pub fn create_swap(
        &self,
        submission: SwapSubmission,
        actor: Option<&UserId>,
    ) -> Result<SwapRequest, MarketplaceError> {
        if let Some(actor) = actor {
            ensure_owner(actor, &submission.from_user_id, "send swaps for another user")?;
        }
        self.guard.check_submission(&submission)?;

        let source = self.get_user(&submission.from_user_id)?;
        let target = self.get_user(&submission.to_user_id)?;
        self.ensure_skill_listed(&submission.offered_skill_id)?;
        self.ensure_skill_listed(&submission.requested_skill_id)?;

        let request = self.guard.request_from_submission(
            next_swap_id(),
            submission,
            &source,
            &target,
            self.clock.now(),
        )?;
        let stored = self.swaps.insert(request)?;

        info!(
            swap_id = %stored.id,
            from = %stored.from_user.id,
            to = %stored.to_user.id,
            "swap request created"
        );
        Ok(stored)
    }

    // Ownership is checked by the guard; this only separates unknown ids.
    fn ensure_skill_listed(&self, id: &SkillId) -> Result<(), MarketplaceError> {
        let users = self.users.list()?;
        if users.iter().any(|user| user.lists_skill(id)) {
            Ok(())
        } else {
            Err(MarketplaceError::not_found("skill", &id.0))
        }
    }

    pub fn get_swap(&self, id: &SwapRequestId) -> Result<SwapRequest, MarketplaceError> {
        self.swaps
            .fetch(id)?
            .ok_or_else(|| MarketplaceError::not_found("swap request", &id.0))
    }

    /// Move a pending request to `next` on behalf of `actor`.
    pub fn update_status(
        &self,
        id: &SwapRequestId,
        actor: &UserId,
        next: SwapStatus,
    ) -> Result<SwapRequest, MarketplaceError> {
        let current = self.get_swap(id)?;
        let role = authorize(&current, actor, next)?;

        match self.swaps.transition(id, current.status, next) {
            Ok(updated) => {
                info!(
                    swap_id = %id,
                    actor = %actor,
                    ?role,
                    status = %next,
                    "swap status changed"
                );
                Ok(updated)
            }
            Err(RepositoryError::Conflict) => {
                warn!(swap_id = %id, actor = %actor, status = %next, "lost status race");
                Err(MarketplaceError::Conflict(format!(
                    "swap request {id} changed while applying {next}"
                )))
            }
            Err(RepositoryError::NotFound) => {
                Err(MarketplaceError::not_found("swap request", &id.0))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Every request the user sent or received, split into pending / active / history.
    pub fn list_for_user(
        &self,
        user: &UserId,
        filter: Option<SwapPartition>,
    ) -> Result<SwapListing, MarketplaceError> {
        self.get_user(user)?;

        let mut requests = self.swaps.for_user(user)?;
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut listing = SwapListing {
            user_id: user.clone(),
            pending: Vec::new(),
            active: Vec::new(),
            history: Vec::new(),
        };

        for request in requests {
            let partition = request.status.partition();
            if filter.is_some_and(|wanted| wanted != partition) {
                continue;
            }
            let Some(direction) = request.direction_for(user) else {
                continue;
            };
            let entry = SwapEntry { direction, request };
            match partition {
                SwapPartition::Pending => listing.pending.push(entry),
                SwapPartition::Active => listing.active.push(entry),
                SwapPartition::History => listing.history.push(entry),
            }
        }

        Ok(listing)
    }

    /// Aggregate counts for the admin dashboard.
    pub fn overview(&self) -> Result<MarketplaceOverview, MarketplaceError> {
        let users = self.users.list()?;
        let swaps = self.swaps.all()?;

        let mut counts = SwapStatusCounts::default();
        for request in &swaps {
            counts.record(request.status);
        }

        Ok(MarketplaceOverview {
            total_users: users.len(),
            public_users: users.iter().filter(|user| user.profile_public).count(),
            total_swaps: swaps.len(),
            swaps: counts,
        })
    }
}

fn ensure_owner(
    actor: &UserId,
    owner: &UserId,
    action: &'static str,
) -> Result<(), MarketplaceError> {
    if actor == owner {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden {
            actor: actor.clone(),
            action,
        })
    }
}

/// A swap request tagged with its direction for the listing user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapEntry {
    pub direction: SwapDirection,
    #[serde(flatten)]
    pub request: SwapRequest,
}

/// Result of `list_for_user`, each bucket newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapListing {
    pub user_id: UserId,
    pub pending: Vec<SwapEntry>,
    pub active: Vec<SwapEntry>,
    pub history: Vec<SwapEntry>,
}

impl SwapListing {
    pub fn total(&self) -> usize {
        self.pending.len() + self.active.len() + self.history.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SwapStatusCounts {
    pub pending: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub cancelled: usize,
}

impl SwapStatusCounts {
    fn record(&mut self, status: SwapStatus) {
        match status {
            SwapStatus::Pending => self.pending += 1,
            SwapStatus::Accepted => self.accepted += 1,
            SwapStatus::Rejected => self.rejected += 1,
            SwapStatus::Cancelled => self.cancelled += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceOverview {
    pub total_users: usize,
    pub public_users: usize,
    pub total_swaps: usize,
    pub swaps: SwapStatusCounts,
}

/// Error raised by the marketplace service.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error(transparent)]
    Validation(#[from] SwapValidationError),
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("user {actor} may not {action}")]
    Forbidden { actor: UserId, action: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MarketplaceError {
    fn not_found(entity: &'static str, id: &str) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
