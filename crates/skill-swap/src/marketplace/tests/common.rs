use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::marketplace::clock::ManualClock;
use crate::marketplace::domain::{
    SignupRequest, SkillInput, SwapRequest, SwapRequestId, SwapStatus, SwapSubmission, User,
    UserId,
};
use crate::marketplace::guard::SwapRequestGuard;
use crate::marketplace::memory::{InMemorySwapRepository, InMemoryUserRepository};
use crate::marketplace::repository::{RepositoryError, SwapRepository, UserRepository};
use crate::marketplace::{marketplace_router, SkillSwapService};

pub(super) type MemoryService = SkillSwapService<InMemoryUserRepository, InMemorySwapRepository>;

pub(super) struct Fixture {
    pub(super) service: MemoryService,
    pub(super) swaps: Arc<InMemorySwapRepository>,
    pub(super) clock: Arc<ManualClock>,
}

impl Fixture {
    /// Step the clock so consecutive requests get distinct timestamps.
    pub(super) fn tick(&self) {
        self.clock.advance(Duration::minutes(5));
    }
}

pub(super) fn build_fixture() -> Fixture {
    let users = Arc::new(InMemoryUserRepository::default());
    let swaps = Arc::new(InMemorySwapRepository::default());
    let clock = Arc::new(ManualClock::starting_at(
        Utc.with_ymd_and_hms(2025, 7, 12, 9, 0, 0).unwrap(),
    ));
    let service = SkillSwapService::with_clock(
        users,
        swaps.clone(),
        SwapRequestGuard::default(),
        clock.clone(),
    );
    Fixture {
        service,
        swaps,
        clock,
    }
}

fn skill(name: &str) -> SkillInput {
    SkillInput {
        id: None,
        name: name.to_string(),
        description: format!("{name} sessions"),
    }
}

pub(super) fn signup(name: &str, offered: &[&str], public: bool) -> SignupRequest {
    SignupRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        location: Some("Pune".to_string()),
        avatar_url: None,
        skills_offered: offered.iter().map(|name| skill(name)).collect(),
        skills_requested: vec![skill("Spanish")],
        availability: "Weekends".to_string(),
        profile_public: public,
    }
}

pub(super) fn register(service: &MemoryService, name: &str, offered: &[&str]) -> User {
    service
        .signup(signup(name, offered, true))
        .expect("signup succeeds")
}

pub(super) fn submission(from: &User, to: &User, message: &str) -> SwapSubmission {
    SwapSubmission {
        from_user_id: from.id.clone(),
        to_user_id: to.id.clone(),
        offered_skill_id: from.skills_offered[0].id.clone(),
        requested_skill_id: to.skills_offered[0].id.clone(),
        message: message.to_string(),
    }
}

pub(super) fn send_swap(service: &MemoryService, from: &User, to: &User) -> SwapRequest {
    service
        .create_swap(submission(from, to, "Let's swap lessons!"), None)
        .expect("swap created")
}

pub(super) fn read_only_users() -> Arc<ReadOnlyUsers> {
    Arc::new(ReadOnlyUsers)
}

/// Directory that refuses every write.
pub(super) struct ReadOnlyUsers;

impl UserRepository for ReadOnlyUsers {
    fn insert(&self, _user: User) -> Result<User, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn update(&self, _user: User) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(Vec::new())
    }

    fn remove(&self, _id: &UserId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}

/// Swap store whose compare-and-swap always loses, as if another writer got there first.
#[derive(Default)]
pub(super) struct RacingSwaps {
    pub(super) inner: InMemorySwapRepository,
}

impl SwapRepository for RacingSwaps {
    fn insert(&self, request: SwapRequest) -> Result<SwapRequest, RepositoryError> {
        self.inner.insert(request)
    }

    fn fetch(&self, id: &SwapRequestId) -> Result<Option<SwapRequest>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn transition(
        &self,
        _id: &SwapRequestId,
        _expected: SwapStatus,
        _next: SwapStatus,
    ) -> Result<SwapRequest, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn for_user(&self, user: &UserId) -> Result<Vec<SwapRequest>, RepositoryError> {
        self.inner.for_user(user)
    }

    fn all(&self) -> Result<Vec<SwapRequest>, RepositoryError> {
        self.inner.all()
    }
}

pub(super) fn router_for(service: MemoryService) -> axum::Router {
    marketplace_router(Arc::new(service))
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
