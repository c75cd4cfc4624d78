use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    CreditTransaction, Hackathon, HackathonStatus, RegistrationStatus, Role, TeamMember, TeamSize,
    User,
};

// -- JWT Claims --

/// JWT claims shared by the REST middleware and the handlers that read them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }
}

// -- Errors --

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

// -- Auth --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// -- Hackathons --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HackathonQuery {
    pub status: Option<HackathonStatus>,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl HackathonQuery {
    /// Status and tag must match exactly (tags ignore case); `search` is a
    /// case-insensitive substring of the title, description, location or a tag.
    pub fn matches(&self, hackathon: &Hackathon) -> bool {
        if self.status.is_some_and(|s| s != hackathon.status) {
            return false;
        }
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            if !hackathon.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                [&hackathon.title, &hackathon.description, &hackathon.location]
                    .into_iter()
                    .chain(hackathon.tags.iter())
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateHackathonRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub team_size: TeamSize,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub entry_fee: i64,
    #[serde(default)]
    pub prize_pool: String,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateHackathonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub team_size: Option<TeamSize>,
    pub tags: Option<Vec<String>>,
    pub entry_fee: Option<i64>,
    pub prize_pool: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestResponse {
    pub interested: bool,
    pub interest_count: u32,
}

// -- Registrations --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRegistrationRequest {
    pub hackathon_id: Uuid,
    #[serde(default)]
    pub team_name: Option<String>,
    pub team_members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRegistrationStatusRequest {
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationCheck {
    pub registered: bool,
    pub status: Option<RegistrationStatus>,
}

impl RegistrationCheck {
    pub const NOT_REGISTERED: Self = Self {
        registered: false,
        status: None,
    };
}

// -- Teams --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub hackathon_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddMemberRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JoinTeamRequest {
    pub code: String,
}

/// What a join code resolves to before the caller commits to joining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub member_count: u32,
}

// -- Submissions --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSubmissionRequest {
    pub team_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub github_url: String,
    #[serde(default)]
    pub demo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateSubmissionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub demo_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreRequest {
    pub score: u32,
}

pub const MAX_SCORE: u32 = 100;

// -- Credits --

/// Highest balance an account may hold. Deposits that would pass it are refused.
pub const MAX_CREDIT_BALANCE: i64 = 1_000_000_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditSummary {
    pub balance: i64,
    pub transactions: Vec<CreditTransaction>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepositRequest {
    pub amount: i64,
}

// -- Analytics --

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub registrations_total: u32,
    pub registrations_pending: u32,
    pub registrations_approved: u32,
    pub registrations_rejected: u32,
    pub teams: u32,
    pub submissions: u32,
    pub average_score: Option<f64>,
    pub wins: u32,
    pub credit_balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hackathon(title: &str, tags: &[&str], status: HackathonStatus) -> Hackathon {
        let now = Utc::now();
        Hackathon {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: title.to_string(),
            description: "A weekend of building".to_string(),
            location: "Berlin".to_string(),
            start_date: now,
            end_date: now,
            registration_deadline: now,
            team_size: TeamSize { min: 1, max: 4 },
            tags: tags.iter().map(|t| t.to_string()).collect(),
            entry_fee: 0,
            prize_pool: String::new(),
            interest_count: 0,
            status,
            created_at: now,
        }
    }

    #[test]
    fn empty_query_matches_everything() {
        let h = hackathon("Rust Jam", &["rust"], HackathonStatus::Upcoming);
        assert!(HackathonQuery::default().matches(&h));
    }

    #[test]
    fn query_filters_status_tag_and_search() {
        let h = hackathon("Rust Jam", &["Rust", "wasm"], HackathonStatus::Ongoing);

        let by_status = HackathonQuery {
            status: Some(HackathonStatus::Completed),
            ..Default::default()
        };
        assert!(!by_status.matches(&h));

        let by_tag = HackathonQuery {
            tag: Some("rust".into()),
            ..Default::default()
        };
        assert!(by_tag.matches(&h));

        let by_search = HackathonQuery {
            search: Some("  berlin ".into()),
            ..Default::default()
        };
        assert!(by_search.matches(&h));

        let missing = HackathonQuery {
            search: Some("python".into()),
            ..Default::default()
        };
        assert!(!missing.matches(&h));
    }
}
