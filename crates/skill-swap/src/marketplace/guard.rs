use chrono::{DateTime, Utc};

use super::domain::{
    SignupRequest, Skill, SkillId, SkillInput, SwapRequest, SwapRequestId, SwapStatus,
    SwapSubmission, User, UserId,
};

/// Minimum swap message length when nothing else is configured.
pub const DEFAULT_MIN_MESSAGE_CHARS: usize = 10;

/// Validation errors raised before anything is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapValidationError {
    #[error("message must be at least {min} characters (found {found})")]
    MessageTooShort { min: usize, found: usize },
    #[error("a swap request cannot target its own sender")]
    SelfSwap,
    #[error("skill {skill} is not offered by the sender")]
    OfferedSkillNotOwned { skill: SkillId },
    #[error("skill {skill} is not offered by the recipient")]
    RequestedSkillNotOffered { skill: SkillId },
    #[error("{field} must not be blank")]
    MissingField { field: &'static str },
    #[error("email '{value}' is not a valid address")]
    InvalidEmail { value: String },
    #[error("skill names must not be blank")]
    BlankSkillName,
}

/// Rules applied to submissions entering the marketplace.
#[derive(Debug, Clone)]
pub struct SwapRequestGuard {
    min_message_chars: usize,
}

impl Default for SwapRequestGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_MESSAGE_CHARS)
    }
}

impl SwapRequestGuard {
    pub fn new(min_message_chars: usize) -> Self {
        Self { min_message_chars }
    }

    pub fn min_message_chars(&self) -> usize {
        self.min_message_chars
    }

    /// Checks that need no lookups: message length and distinct parties.
    pub fn check_submission(
        &self,
        submission: &SwapSubmission,
    ) -> Result<(), SwapValidationError> {
        if submission.from_user_id == submission.to_user_id {
            return Err(SwapValidationError::SelfSwap);
        }

        let found = submission.message.chars().count();
        if found < self.min_message_chars {
            return Err(SwapValidationError::MessageTooShort {
                min: self.min_message_chars,
                found,
            });
        }

        Ok(())
    }

    /// Build a pending request once both parties have been resolved.
    pub fn request_from_submission(
        &self,
        id: SwapRequestId,
        submission: SwapSubmission,
        source: &User,
        target: &User,
        created_at: DateTime<Utc>,
    ) -> Result<SwapRequest, SwapValidationError> {
        self.check_submission(&submission)?;

        let offered_skill = source
            .offered_skill(&submission.offered_skill_id)
            .cloned()
            .ok_or_else(|| SwapValidationError::OfferedSkillNotOwned {
                skill: submission.offered_skill_id.clone(),
            })?;
        let requested_skill = target
            .offered_skill(&submission.requested_skill_id)
            .cloned()
            .ok_or_else(|| SwapValidationError::RequestedSkillNotOffered {
                skill: submission.requested_skill_id.clone(),
            })?;

        Ok(SwapRequest {
            id,
            from_user: source.summary(),
            to_user: target.summary(),
            offered_skill,
            requested_skill,
            message: submission.message,
            status: SwapStatus::Pending,
            created_at,
        })
    }

    /// Turn a signup payload into a profile, assigning skill ids through `next_skill_id`.
    pub fn user_from_signup(
        &self,
        id: UserId,
        signup: SignupRequest,
        next_skill_id: &mut dyn FnMut() -> SkillId,
    ) -> Result<User, SwapValidationError> {
        let name = required("name", signup.name)?;
        let email = signup.email.trim().to_ascii_lowercase();
        if email.is_empty() {
            return Err(SwapValidationError::MissingField { field: "email" });
        }
        if !is_plausible_email(&email) {
            return Err(SwapValidationError::InvalidEmail { value: email });
        }

        Ok(User {
            id,
            name,
            email,
            location: non_blank(signup.location),
            avatar_url: non_blank(signup.avatar_url),
            skills_offered: skills_from_inputs(signup.skills_offered, next_skill_id)?,
            skills_requested: skills_from_inputs(signup.skills_requested, next_skill_id)?,
            availability: signup.availability.trim().to_string(),
            profile_public: signup.profile_public,
        })
    }
}

pub(crate) fn required(
    field: &'static str,
    value: String,
) -> Result<String, SwapValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SwapValidationError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn skills_from_inputs(
    inputs: Vec<SkillInput>,
    next_skill_id: &mut dyn FnMut() -> SkillId,
) -> Result<Vec<Skill>, SwapValidationError> {
    inputs
        .into_iter()
        .map(|input| {
            let name = input.name.trim();
            if name.is_empty() {
                return Err(SwapValidationError::BlankSkillName);
            }
            Ok(Skill {
                id: input.id.unwrap_or_else(|| next_skill_id()),
                name: name.to_string(),
                description: input.description.trim().to_string(),
            })
        })
        .collect()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn skill(id: &str, name: &str) -> Skill {
        Skill {
            id: SkillId(id.to_string()),
            name: name.to_string(),
            description: String::new(),
        }
    }

    fn user(id: &str, offered: Vec<Skill>) -> User {
        User {
            id: UserId(id.to_string()),
            name: format!("User {id}"),
            email: format!("{id}@example.com"),
            location: None,
            avatar_url: None,
            skills_offered: offered,
            skills_requested: Vec::new(),
            availability: "Weekends".to_string(),
            profile_public: true,
        }
    }

    fn submission(message: &str) -> SwapSubmission {
        SwapSubmission {
            from_user_id: UserId("u1".to_string()),
            to_user_id: UserId("u2".to_string()),
            offered_skill_id: SkillId("s1".to_string()),
            requested_skill_id: SkillId("s2".to_string()),
            message: message.to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 12, 9, 0, 0).unwrap()
    }

    #[test]
    fn message_length_counts_every_character() {
        let guard = SwapRequestGuard::default();
        assert!(guard.check_submission(&submission("0123456789")).is_ok());
        assert_eq!(
            guard.check_submission(&submission("too short")),
            Err(SwapValidationError::MessageTooShort { min: 10, found: 9 })
        );
        // Surrounding whitespace counts toward the minimum.
        assert!(guard.check_submission(&submission("hi there!         ")).is_ok());
        // Ten scalar values even though the byte length is larger.
        assert!(guard.check_submission(&submission("ééééééééé!")).is_ok());
    }

    #[test]
    fn rejects_self_swaps() {
        let guard = SwapRequestGuard::default();
        let mut self_swap = submission("Let's swap lessons!");
        self_swap.to_user_id = self_swap.from_user_id.clone();
        assert_eq!(
            guard.check_submission(&self_swap),
            Err(SwapValidationError::SelfSwap)
        );
    }

    #[test]
    fn requires_skills_from_the_right_owner() {
        let guard = SwapRequestGuard::default();
        let source = user("u1", vec![skill("s1", "Guitar")]);
        let target = user("u2", vec![skill("s2", "Photoshop")]);

        let request = guard
            .request_from_submission(
                SwapRequestId("swap-1".to_string()),
                submission("Let's swap lessons!"),
                &source,
                &target,
                now(),
            )
            .expect("valid submission");
        assert_eq!(request.status, SwapStatus::Pending);
        assert_eq!(request.offered_skill.name, "Guitar");
        assert_eq!(request.requested_skill.name, "Photoshop");
        assert_eq!(request.created_at, now());

        let mut swapped = submission("Let's swap lessons!");
        swapped.offered_skill_id = SkillId("s2".to_string());
        assert_eq!(
            guard.request_from_submission(
                SwapRequestId("swap-2".to_string()),
                swapped,
                &source,
                &target,
                now(),
            ),
            Err(SwapValidationError::OfferedSkillNotOwned {
                skill: SkillId("s2".to_string())
            })
        );

        let mut wanted_only = submission("Let's swap lessons!");
        wanted_only.requested_skill_id = SkillId("s1".to_string());
        assert!(matches!(
            guard.request_from_submission(
                SwapRequestId("swap-3".to_string()),
                wanted_only,
                &source,
                &target,
                now(),
            ),
            Err(SwapValidationError::RequestedSkillNotOffered { .. })
        ));
    }

    #[test]
    fn signup_normalizes_and_assigns_skill_ids() {
        let guard = SwapRequestGuard::default();
        let mut counter = 0;
        let mut next = || {
            counter += 1;
            SkillId(format!("skill-{counter}"))
        };
        let signup = SignupRequest {
            name: "  Alice  ".to_string(),
            email: "Alice@Example.com".to_string(),
            location: Some("   ".to_string()),
            skills_offered: vec![
                SkillInput {
                    id: None,
                    name: "Guitar".to_string(),
                    description: "Acoustic basics".to_string(),
                },
                SkillInput {
                    id: Some(SkillId("keep-me".to_string())),
                    name: "Baking".to_string(),
                    description: String::new(),
                },
            ],
            profile_public: true,
            ..SignupRequest::default()
        };

        let user = guard
            .user_from_signup(UserId("u1".to_string()), signup, &mut next)
            .expect("signup valid");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.location, None);
        assert_eq!(user.skills_offered[0].id, SkillId("skill-1".to_string()));
        assert_eq!(user.skills_offered[1].id, SkillId("keep-me".to_string()));
    }

    #[test]
    fn signup_requires_name_and_email() {
        let guard = SwapRequestGuard::default();
        let mut next = || SkillId("unused".to_string());

        let nameless = SignupRequest {
            email: "a@b.c".to_string(),
            ..SignupRequest::default()
        };
        assert_eq!(
            guard.user_from_signup(UserId("u1".to_string()), nameless, &mut next),
            Err(SwapValidationError::MissingField { field: "name" })
        );

        let bad_email = SignupRequest {
            name: "Bob".to_string(),
            email: "bob.example.com".to_string(),
            ..SignupRequest::default()
        };
        assert!(matches!(
            guard.user_from_signup(UserId("u2".to_string()), bad_email, &mut next),
            Err(SwapValidationError::InvalidEmail { .. })
        ));
    }
}
