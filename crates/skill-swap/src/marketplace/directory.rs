//! Browse helpers over the user directory. Pure filters; order follows the input.

use super::domain::{User, UserId};

/// Users with a public profile, minus `excluding` when given.
pub fn list_public_users<'a, I>(users: I, excluding: Option<&UserId>) -> Vec<&'a User>
where
    I: IntoIterator<Item = &'a User>,
{
    users
        .into_iter()
        .filter(|user| user.profile_public)
        .filter(|user| excluding.map_or(true, |excluded| &user.id != excluded))
        .collect()
}

/// Users offering at least one skill whose name contains `query`, ignoring case.
///
/// A blank query matches everyone.
pub fn find_skill_matches<'a>(query: &str, users: Vec<&'a User>) -> Vec<&'a User> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return users;
    }

    users
        .into_iter()
        .filter(|user| {
            user.skills_offered
                .iter()
                .any(|skill| skill.name.to_lowercase().contains(&needle))
        })
        .collect()
}
