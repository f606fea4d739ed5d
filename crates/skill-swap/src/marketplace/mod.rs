//! Skill swap marketplace: profile directory, swap request validation, the
//! request lifecycle state machine, and the HTTP router exposing them.

pub mod clock;
pub mod directory;
pub mod domain;
pub(crate) mod guard;
pub mod lifecycle;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use directory::{find_skill_matches, list_public_users};
pub use domain::{
    ProfileUpdate, SignupRequest, Skill, SkillId, SkillInput, SwapDirection, SwapPartition,
    SwapRequest, SwapRequestId, SwapStatus, SwapSubmission, User, UserId, UserSummary,
};
pub use guard::{SwapRequestGuard, SwapValidationError, DEFAULT_MIN_MESSAGE_CHARS};
pub use lifecycle::{authorize, SwapRole, TransitionError};
pub use memory::{InMemorySwapRepository, InMemoryUserRepository};
pub use repository::{RepositoryError, SwapRepository, UserRepository};
pub use router::{marketplace_router, ACTOR_HEADER};
pub use service::{
    MarketplaceError, MarketplaceOverview, SkillSwapService, SwapEntry, SwapListing,
    SwapStatusCounts,
};
