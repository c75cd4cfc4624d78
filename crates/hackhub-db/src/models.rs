//! Inputs and outcomes of the store, plus the column decoders the query
//! modules share. Rows are decoded straight into `hackhub-types` models.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use hackhub_types::api::CreditSummary;
use hackhub_types::models::{TeamMember, UnknownVariant, User, Winner};

/// A user together with the stored password hash. Never leaves the server.
pub struct UserRecord {
    pub user: User,
    pub password_hash: String,
}

pub struct NewRegistration {
    pub hackathon_id: Uuid,
    pub user_id: Uuid,
    pub team_name: Option<String>,
    pub team_members: Vec<TeamMember>,
}

pub struct NewSubmission {
    pub hackathon_id: Uuid,
    pub team_id: Uuid,
    pub submitted_by: Uuid,
    pub title: String,
    pub description: String,
    pub github_url: String,
    pub demo_url: Option<String>,
}

/// Result of a write that has to take credits from the user's balance.
#[derive(Debug)]
pub enum ChargeOutcome<T> {
    Charged(T),
    InsufficientCredits { balance: i64, required: i64 },
}

#[derive(Debug)]
pub enum DepositOutcome {
    Deposited(CreditSummary),
    LimitExceeded { balance: i64, limit: i64 },
}

#[derive(Debug)]
pub enum FinalizeOutcome {
    Finalized(Vec<Winner>),
    AlreadyFinalized,
    NoScoredSubmissions,
}

// -- Column decoding --

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    row.get::<_, Option<String>>(idx)?
        .map(|text| text.parse().map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub(crate) fn time_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_timestamp(&text).map_err(|e| conversion_error(idx, e))
}

pub(crate) fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    let text: String = row.get(idx)?;
    text.parse().map_err(|e| conversion_error(idx, e))
}

pub(crate) fn json_at<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(idx, e))
}

/// Parse a stored timestamp. Values written by `datetime('now')` have no
/// timezone and are read as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    text.parse::<DateTime<Utc>>().or_else(|_| {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
    })
}

/// Canonical stored form of a schedule timestamp; sorts lexicographically.
pub(crate) fn timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
