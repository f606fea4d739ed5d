use chrono::{Duration, TimeZone, Utc};
use clap::{Args, ValueEnum};
use skill_swap::error::AppError;
use skill_swap::marketplace::{
    InMemorySwapRepository, InMemoryUserRepository, ManualClock, MarketplaceError,
    SignupRequest, SkillId, SkillInput, SkillSwapService, SwapEntry, SwapListing, SwapRequestGuard,
    SwapStatus, SwapSubmission, User, DEFAULT_MIN_MESSAGE_CHARS,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// How the scripted swap request is resolved
    #[arg(long, value_enum, default_value_t = DemoDecision::Accept)]
    pub(crate) decision: DemoDecision,
    /// Skill to search the public directory for
    #[arg(long, default_value = "photo")]
    pub(crate) search: String,
    /// Message attached to the scripted swap request
    #[arg(long, default_value = "Happy to trade guitar lessons for a Photoshop crash course!")]
    pub(crate) message: String,
    /// Minimum message length enforced by the request guard
    #[arg(long, default_value_t = DEFAULT_MIN_MESSAGE_CHARS)]
    pub(crate) min_message_chars: usize,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            decision: DemoDecision::Accept,
            search: "photo".to_string(),
            message: "Happy to trade guitar lessons for a Photoshop crash course!".to_string(),
            min_message_chars: DEFAULT_MIN_MESSAGE_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DemoDecision {
    /// The recipient accepts
    Accept,
    /// The recipient declines
    Reject,
    /// The sender withdraws
    Cancel,
}

impl DemoDecision {
    fn status(self) -> SwapStatus {
        match self {
            DemoDecision::Accept => SwapStatus::Accepted,
            DemoDecision::Reject => SwapStatus::Rejected,
            DemoDecision::Cancel => SwapStatus::Cancelled,
        }
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        decision,
        search,
        message,
        min_message_chars,
    } = args;

    let start = Utc
        .with_ymd_and_hms(2025, 7, 12, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let clock = Arc::new(ManualClock::starting_at(start));
    let service = SkillSwapService::with_clock(
        Arc::new(InMemoryUserRepository::default()),
        Arc::new(InMemorySwapRepository::default()),
        SwapRequestGuard::new(min_message_chars),
        clock.clone(),
    );

    println!("Skill swap demo");
    let asha = service.signup(member("Asha", "Guitar", "Photoshop", true))?;
    let ben = service.signup(member("Ben", "Photoshop", "Guitar", true))?;
    let chen = service.signup(member("Chen", "Photography", "Baking", false))?;
    for user in [&asha, &ben, &chen] {
        println!(
            "- Registered {} ({}) offering {} | {}",
            user.name,
            user.id,
            skill_names(user),
            if user.profile_public { "public" } else { "private" }
        );
    }

    let matches = service.browse(Some(search.as_str()), Some(&asha.id))?;
    println!(
        "\nDirectory search for '{}' as {}: {} match(es)",
        search,
        asha.name,
        matches.len()
    );
    for user in &matches {
        println!("  - {} offers {}", user.name, skill_names(user));
    }

    clock.advance(Duration::minutes(10));
    let request = match service.create_swap(proposal(&asha, &ben, message), Some(&asha.id)) {
        Ok(request) => request,
        Err(MarketplaceError::Validation(err)) => {
            println!("\nSwap request rejected before sending: {}", err);
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    println!(
        "\nSwap {} sent: {} offers {} for {}'s {} [{}]",
        request.id,
        request.from_user.name,
        request.offered_skill.name,
        request.to_user.name,
        request.requested_skill.name,
        request.status
    );
    render_listing(&ben.name, &service.list_for_user(&ben.id, None)?);

    clock.advance(Duration::hours(2));
    let actor = match decision {
        DemoDecision::Cancel => &asha,
        DemoDecision::Accept | DemoDecision::Reject => &ben,
    };
    let updated = service.update_status(&request.id, &actor.id, decision.status())?;
    println!(
        "\n{} marked swap {} as {}",
        actor.name, updated.id, updated.status
    );

    match service.update_status(&request.id, &asha.id, SwapStatus::Cancelled) {
        Ok(_) => println!("  Unexpected: a settled swap was cancelled"),
        Err(err) => println!("  Follow-up cancel refused: {}", err),
    }

    render_listing(&asha.name, &service.list_for_user(&asha.id, None)?);

    let overview = service.overview()?;
    match serde_json::to_string_pretty(&overview) {
        Ok(json) => println!("\nAdmin overview:\n{}", json),
        Err(err) => println!("\nAdmin overview unavailable: {}", err),
    }

    Ok(())
}

fn member(name: &str, offers: &str, wants: &str, public: bool) -> SignupRequest {
    SignupRequest {
        name: name.to_string(),
        email: format!("{}@swap.demo", name.to_lowercase()),
        location: Some("Pune".to_string()),
        avatar_url: None,
        skills_offered: vec![skill(offers)],
        skills_requested: vec![skill(wants)],
        availability: "Weekends".to_string(),
        profile_public: public,
    }
}

fn skill(name: &str) -> SkillInput {
    SkillInput {
        id: None,
        name: name.to_string(),
        description: format!("Beginner friendly {}", name.to_lowercase()),
    }
}

fn proposal(from: &User, to: &User, message: String) -> SwapSubmission {
    SwapSubmission {
        from_user_id: from.id.clone(),
        to_user_id: to.id.clone(),
        offered_skill_id: first_offered(from),
        requested_skill_id: first_offered(to),
        message,
    }
}

// An unknown id lets the guard report the missing skill.
fn first_offered(user: &User) -> SkillId {
    user.skills_offered
        .first()
        .map(|skill| skill.id.clone())
        .unwrap_or_else(|| SkillId(String::new()))
}

fn skill_names(user: &User) -> String {
    let names: Vec<_> = user
        .skills_offered
        .iter()
        .map(|skill| skill.name.as_str())
        .collect();
    names.join(", ")
}

fn render_listing(name: &str, listing: &SwapListing) {
    println!("\nRequests for {} ({} total)", name, listing.total());
    for (label, entries) in [
        ("Pending", &listing.pending),
        ("Active", &listing.active),
        ("History", &listing.history),
    ] {
        println!("  {}: {}", label, entries.len());
        for entry in entries {
            println!("    - {}", describe(entry));
        }
    }
}

fn describe(entry: &SwapEntry) -> String {
    let request = &entry.request;
    format!(
        "{} {:?} {} <-> {} ({}) at {}",
        request.id,
        entry.direction,
        request.offered_skill.name,
        request.requested_skill.name,
        request.status,
        request.created_at.format("%Y-%m-%d %H:%M")
    )
}
