use serde::Serialize;

use super::domain::{SwapRequest, SwapStatus, UserId};

/// Relationship of the acting user to a swap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapRole {
    Source,
    Target,
}

impl SwapRole {
    pub fn of(request: &SwapRequest, actor: &UserId) -> Option<Self> {
        if &request.from_user.id == actor {
            Some(Self::Source)
        } else if &request.to_user.id == actor {
            Some(Self::Target)
        } else {
            None
        }
    }

    /// Statuses this role may move a pending request into.
    pub const fn allowed_targets(self) -> &'static [SwapStatus] {
        match self {
            SwapRole::Source => &[SwapStatus::Cancelled],
            SwapRole::Target => &[SwapStatus::Accepted, SwapStatus::Rejected],
        }
    }
}

/// Rejected status change. The record is never touched when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("user {actor} is not a party to swap request {request}")]
    NotAParty { request: String, actor: UserId },
    #[error("swap request is already {current}; {current} is terminal")]
    Terminal { current: SwapStatus },
    #[error("the {role:?} of a swap request cannot set status {requested}")]
    NotPermitted { role: SwapRole, requested: SwapStatus },
    #[error("'{value}' is not a swap status")]
    UnknownStatus { value: String },
}

/// Decide whether `actor` may move `request` into `next`.
pub fn authorize(
    request: &SwapRequest,
    actor: &UserId,
    next: SwapStatus,
) -> Result<SwapRole, TransitionError> {
    let role = SwapRole::of(request, actor).ok_or_else(|| TransitionError::NotAParty {
        request: request.id.0.clone(),
        actor: actor.clone(),
    })?;

    if request.status.is_terminal() {
        return Err(TransitionError::Terminal {
            current: request.status,
        });
    }

    if !role.allowed_targets().contains(&next) {
        return Err(TransitionError::NotPermitted {
            role,
            requested: next,
        });
    }

    Ok(role)
}
