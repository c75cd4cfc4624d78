use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Returned when a stored or submitted enum value is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

// Text-backed enums: the same spelling is used in JSON and in SQLite columns.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// -- Users --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Organizer,
}

text_enum!(Role, "role", { User => "user", Organizer => "organizer" });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

// -- Hackathons --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HackathonStatus {
    Upcoming,
    Ongoing,
    Completed,
}

text_enum!(HackathonStatus, "hackathon status", {
    Upcoming => "upcoming",
    Ongoing => "ongoing",
    Completed => "completed",
});

impl HackathonStatus {
    /// Lifecycle state at `now`. A hackathon whose winners were finalized is
    /// completed regardless of its schedule.
    pub fn at(
        now: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        winners_finalized: bool,
    ) -> Self {
        if winners_finalized || now >= end {
            Self::Completed
        } else if now >= start {
            Self::Ongoing
        } else {
            Self::Upcoming
        }
    }
}

/// Inclusive bounds on the number of people in a registered team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSize {
    pub min: u32,
    pub max: u32,
}

impl TeamSize {
    pub fn is_valid(&self) -> bool {
        self.min >= 1 && self.min <= self.max
    }

    pub fn contains(&self, size: usize) -> bool {
        size >= self.min as usize && size <= self.max as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hackathon {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub team_size: TeamSize,
    pub tags: Vec<String>,
    /// Entry fee in credits.
    pub entry_fee: i64,
    pub prize_pool: String,
    pub interest_count: u32,
    pub status: HackathonStatus,
    pub created_at: DateTime<Utc>,
}

impl Hackathon {
    pub fn registration_open(&self, now: DateTime<Utc>) -> bool {
        self.status != HackathonStatus::Completed && now <= self.registration_deadline
    }
}

// -- Registrations --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

text_enum!(RegistrationStatus, "registration status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HackathonRegistration {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub team_members: Vec<TeamMember>,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

// -- Teams --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub is_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    /// Six-character join code.
    pub code: String,
    pub owner_id: Uuid,
    pub hackathon_id: Option<Uuid>,
    pub members: Vec<TeamMembership>,
    pub created_at: DateTime<Utc>,
}

// -- Submissions --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSubmission {
    pub id: Uuid,
    pub hackathon_id: Uuid,
    pub team_id: Uuid,
    pub submitted_by: Uuid,
    pub title: String,
    pub description: String,
    pub github_url: String,
    pub demo_url: Option<String>,
    /// Judge score, 0..=100. `None` until scored.
    pub score: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub hackathon_id: Uuid,
    /// 1, 2 or 3.
    pub position: u8,
    pub submission_id: Uuid,
    pub team_id: Uuid,
    pub team_name: String,
    pub project_title: String,
    pub score: u32,
}

pub const MAX_WINNERS: usize = 3;

// -- Credits --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditKind {
    Deposit,
    Deduction,
    Refund,
}

text_enum!(CreditKind, "credit transaction type", {
    Deposit => "deposit",
    Deduction => "deduction",
    Refund => "refund",
});

impl CreditKind {
    /// Sign applied to the amount when computing a balance.
    pub fn sign(&self) -> i64 {
        match self {
            Self::Deposit | Self::Refund => 1,
            Self::Deduction => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: CreditKind,
    pub amount: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn status_follows_schedule() {
        let start = Utc::now();
        let end = start + Duration::days(2);

        assert_eq!(
            HackathonStatus::at(start - Duration::hours(1), start, end, false),
            HackathonStatus::Upcoming
        );
        assert_eq!(
            HackathonStatus::at(start + Duration::hours(1), start, end, false),
            HackathonStatus::Ongoing
        );
        assert_eq!(HackathonStatus::at(end, start, end, false), HackathonStatus::Completed);
    }

    #[test]
    fn finalized_hackathon_is_completed_early() {
        let start = Utc::now();
        let end = start + Duration::days(2);
        assert_eq!(
            HackathonStatus::at(start + Duration::hours(1), start, end, true),
            HackathonStatus::Completed
        );
    }

    #[test]
    fn team_size_bounds() {
        let size = TeamSize { min: 2, max: 4 };
        assert!(size.is_valid());
        assert!(!size.contains(1));
        assert!(size.contains(2));
        assert!(size.contains(4));
        assert!(!size.contains(5));

        assert!(!TeamSize { min: 0, max: 3 }.is_valid());
        assert!(!TeamSize { min: 4, max: 3 }.is_valid());
    }

    #[test]
    fn enums_use_lowercase_text() {
        assert_eq!("approved".parse::<RegistrationStatus>(), Ok(RegistrationStatus::Approved));
        assert_eq!(Role::Organizer.to_string(), "organizer");
        assert_eq!(
            serde_json::to_string(&HackathonStatus::Ongoing).unwrap(),
            "\"ongoing\""
        );
        let err = "winner".parse::<RegistrationStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown registration status 'winner'");
    }

    #[test]
    fn credit_transaction_serializes_kind_as_type() {
        let tx = CreditTransaction {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            kind: CreditKind::Refund,
            amount: 20,
            description: "refund".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "refund");
        assert_eq!(CreditKind::Deduction.sign(), -1);
    }
}
