use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use hackhub_types::models::ProjectSubmission;

use super::OptionalExt;
use crate::Database;
use crate::models::{NewSubmission, time_at, uuid_at};

const SUBMISSION_COLUMNS: &str = "id, hackathon_id, team_id, submitted_by, title, description,
    github_url, demo_url, score, created_at, updated_at";

impl Database {
    pub fn create_submission(&self, new: &NewSubmission) -> Result<ProjectSubmission> {
        let id = Uuid::new_v4();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO submissions (id, hackathon_id, team_id, submitted_by, title,
                    description, github_url, demo_url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    id.to_string(),
                    new.hackathon_id.to_string(),
                    new.team_id.to_string(),
                    new.submitted_by.to_string(),
                    new.title,
                    new.description,
                    new.github_url,
                    new.demo_url,
                ],
            )?;
            query_submission(conn, id)?.ok_or_else(|| anyhow!("Submission {} missing after insert", id))
        })
    }

    pub fn get_submission(&self, id: Uuid) -> Result<Option<ProjectSubmission>> {
        self.with_conn(|conn| query_submission(conn, id))
    }

    /// Submissions of a hackathon in the order they were made.
    pub fn list_submissions(&self, hackathon_id: Uuid) -> Result<Vec<ProjectSubmission>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUBMISSION_COLUMNS} FROM submissions
                 WHERE hackathon_id = ?1
                 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([hackathon_id.to_string()], submission_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn submission_for_team(
        &self,
        hackathon_id: Uuid,
        team_id: Uuid,
    ) -> Result<Option<ProjectSubmission>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {SUBMISSION_COLUMNS} FROM submissions
                     WHERE hackathon_id = ?1 AND team_id = ?2"
                ),
                [hackathon_id.to_string(), team_id.to_string()],
                submission_from_row,
            )
            .optional()
        })
    }

    /// Persist the editable fields and bump `updated_at`.
    pub fn save_submission(&self, submission: &ProjectSubmission) -> Result<ProjectSubmission> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE submissions
                 SET title = ?2, description = ?3, github_url = ?4, demo_url = ?5,
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![
                    submission.id.to_string(),
                    submission.title,
                    submission.description,
                    submission.github_url,
                    submission.demo_url,
                ],
            )?;
            query_submission(conn, submission.id)?
                .ok_or_else(|| anyhow!("Submission {} missing after update", submission.id))
        })
    }

    pub fn set_submission_score(&self, id: Uuid, score: u32) -> Result<Option<ProjectSubmission>> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE submissions SET score = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), score],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_submission(conn, id)
        })
    }
}

fn query_submission(conn: &Connection, id: Uuid) -> Result<Option<ProjectSubmission>> {
    conn.query_row(
        &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1"),
        [id.to_string()],
        submission_from_row,
    )
    .optional()
}

fn submission_from_row(row: &Row<'_>) -> rusqlite::Result<ProjectSubmission> {
    Ok(ProjectSubmission {
        id: uuid_at(row, 0)?,
        hackathon_id: uuid_at(row, 1)?,
        team_id: uuid_at(row, 2)?,
        submitted_by: uuid_at(row, 3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        github_url: row.get(6)?,
        demo_url: row.get(7)?,
        score: row.get(8)?,
        created_at: time_at(row, 9)?,
        updated_at: time_at(row, 10)?,
    })
}
