use anyhow::Result;
use uuid::Uuid;

use hackhub_types::api::UserAnalytics;
use hackhub_types::models::RegistrationStatus;

use super::credits::balance_of;
use crate::Database;

impl Database {
    /// Dashboard counters for one user. Submissions and wins count every
    /// team the user is a member of.
    pub fn user_analytics(&self, user_id: Uuid) -> Result<UserAnalytics> {
        self.with_conn(|conn| {
            let uid = user_id.to_string();
            let mut analytics = UserAnalytics::default();

            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM registrations WHERE user_id = ?1 GROUP BY status",
            )?;
            let by_status = stmt
                .query_map([&uid], |r| Ok((r.get::<_, String>(0)?, r.get::<_, u32>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            for (status, count) in by_status {
                analytics.registrations_total += count;
                match status.parse::<RegistrationStatus>()? {
                    RegistrationStatus::Pending => analytics.registrations_pending = count,
                    RegistrationStatus::Approved => analytics.registrations_approved = count,
                    RegistrationStatus::Rejected => analytics.registrations_rejected = count,
                }
            }

            analytics.teams = conn.query_row(
                "SELECT COUNT(*) FROM team_members WHERE user_id = ?1",
                [&uid],
                |r| r.get(0),
            )?;

            (analytics.submissions, analytics.average_score) = conn.query_row(
                "SELECT COUNT(*), AVG(s.score)
                 FROM submissions s
                 JOIN team_members m ON m.team_id = s.team_id
                 WHERE m.user_id = ?1",
                [&uid],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )?;

            analytics.wins = conn.query_row(
                "SELECT COUNT(*)
                 FROM winners w
                 JOIN submissions s ON s.id = w.submission_id
                 JOIN team_members m ON m.team_id = s.team_id
                 WHERE m.user_id = ?1",
                [&uid],
                |r| r.get(0),
            )?;

            analytics.credit_balance = balance_of(conn, user_id)?;
            Ok(analytics)
        })
    }
}
