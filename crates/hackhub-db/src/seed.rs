//! Demo data set: an organizer, a participant, one hackathon in each
//! lifecycle state and the team CodeCrafters (join code CC2024).

use anyhow::Result;
use chrono::{Duration, Utc};
use tracing::info;

use hackhub_types::api::CreateHackathonRequest;
use hackhub_types::models::{Role, TeamSize};

use crate::Database;

pub const DEMO_ORGANIZER_EMAIL: &str = "organizer@hackhub.dev";
pub const DEMO_USER_EMAIL: &str = "demo@hackhub.dev";
pub const DEMO_TEAM_NAME: &str = "CodeCrafters";
pub const DEMO_TEAM_CODE: &str = "CC2024";

/// Seed the demo data unless it is already present. Both demo accounts use
/// `password_hash`. Returns true if anything was written.
pub fn seed_demo(db: &Database, password_hash: &str, signup_credits: i64) -> Result<bool> {
    if db.get_user_by_email(DEMO_ORGANIZER_EMAIL)?.is_some() {
        return Ok(false);
    }

    let organizer = db.create_user(
        DEMO_ORGANIZER_EMAIL,
        "Demo Organizer",
        password_hash,
        Role::Organizer,
        0,
    )?;
    let user = db.create_user(DEMO_USER_EMAIL, "Demo Hacker", password_hash, Role::User, signup_credits)?;

    let now = Utc::now();
    let schedules = [
        ("Winter Build Sprint", now - Duration::days(40), vec!["ai", "web"], 0),
        ("Rust Systems Jam", now - Duration::days(1), vec!["rust", "systems"], 0),
        ("Open Data Hack", now + Duration::days(21), vec!["data", "civic"], 25),
    ];

    let mut ongoing = None;
    for (title, start, tags, entry_fee) in schedules {
        let hackathon = db.create_hackathon(
            organizer.id,
            &CreateHackathonRequest {
                title: title.to_string(),
                description: format!("{title}: build, ship and demo in 48 hours."),
                location: "Online".to_string(),
                start_date: start,
                end_date: start + Duration::days(3),
                registration_deadline: start - Duration::days(2),
                team_size: TeamSize { min: 1, max: 4 },
                tags: tags.into_iter().map(String::from).collect(),
                entry_fee,
                prize_pool: "$5,000".to_string(),
            },
        )?;
        if start <= now && now < hackathon.end_date {
            ongoing = Some(hackathon.id);
        }
    }

    db.create_team(DEMO_TEAM_NAME, DEMO_TEAM_CODE, user.id, ongoing)?;

    info!("Seeded demo data ({} / {})", DEMO_ORGANIZER_EMAIL, DEMO_USER_EMAIL);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hackhub_types::models::HackathonStatus;

    #[test]
    fn seeds_once_with_one_hackathon_per_status() {
        let db = Database::open_in_memory().unwrap();
        assert!(seed_demo(&db, "hash", 100).unwrap());
        assert!(!seed_demo(&db, "hash", 100).unwrap());

        let mut statuses: Vec<HackathonStatus> =
            db.list_hackathons().unwrap().iter().map(|h| h.status).collect();
        statuses.sort_by_key(|s| s.as_str());
        assert_eq!(
            statuses,
            vec![HackathonStatus::Completed, HackathonStatus::Ongoing, HackathonStatus::Upcoming]
        );

        let team = db.team_by_code(DEMO_TEAM_CODE).unwrap().unwrap();
        assert_eq!(team.name, DEMO_TEAM_NAME);
        assert!(team.hackathon_id.is_some());
    }
}
