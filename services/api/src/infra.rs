use metrics_exporter_prometheus::PrometheusHandle;
use skill_swap::error::AppError;
use skill_swap::marketplace::{
    MarketplaceError, SignupRequest, SkillSwapService, SwapRepository, User, UserRepository,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Read a JSON array of signup payloads.
pub(crate) fn read_seed(path: &Path) -> Result<Vec<SignupRequest>, AppError> {
    let raw = std::fs::read_to_string(path)?;
    parse_seed(&raw)
}

pub(crate) fn parse_seed(raw: &str) -> Result<Vec<SignupRequest>, AppError> {
    Ok(serde_json::from_str(raw)?)
}

/// Register every seeded member, stopping at the first rejected profile.
pub(crate) fn apply_seed<U, S>(
    service: &SkillSwapService<U, S>,
    members: Vec<SignupRequest>,
) -> Result<Vec<User>, MarketplaceError>
where
    U: UserRepository + 'static,
    S: SwapRepository + 'static,
{
    let users = members
        .into_iter()
        .map(|member| service.signup(member))
        .collect::<Result<Vec<_>, _>>()?;
    info!(count = users.len(), "seeded member directory");
    Ok(users)
}
