use anyhow::{Result, anyhow};
use chrono::Utc;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use hackhub_types::api::CreateHackathonRequest;
use hackhub_types::models::{CreditKind, Hackathon, HackathonStatus, TeamSize};

use super::OptionalExt;
use super::credits::insert_credit_transaction;
use crate::Database;
use crate::models::{json_at, time_at, timestamp, uuid_at};

const HACKATHON_COLUMNS: &str = "h.id, h.organizer_id, h.title, h.description, h.location,
    h.start_date, h.end_date, h.registration_deadline, h.team_size_min, h.team_size_max,
    h.tags, h.entry_fee, h.prize_pool, h.winners_finalized, h.created_at,
    (SELECT COUNT(*) FROM hackathon_interests i WHERE i.hackathon_id = h.id)";

impl Database {
    pub fn create_hackathon(
        &self,
        organizer_id: Uuid,
        req: &CreateHackathonRequest,
    ) -> Result<Hackathon> {
        let id = Uuid::new_v4();
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO hackathons (id, organizer_id, title, description, location,
                    start_date, end_date, registration_deadline, team_size_min, team_size_max,
                    tags, entry_fee, prize_pool)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    id.to_string(),
                    organizer_id.to_string(),
                    req.title,
                    req.description,
                    req.location,
                    timestamp(&req.start_date),
                    timestamp(&req.end_date),
                    timestamp(&req.registration_deadline),
                    req.team_size.min,
                    req.team_size.max,
                    serde_json::to_string(&req.tags)?,
                    req.entry_fee,
                    req.prize_pool,
                ],
            )?;
            query_hackathon(conn, id)?.ok_or_else(|| anyhow!("Hackathon {} missing after insert", id))
        })
    }

    pub fn get_hackathon(&self, id: Uuid) -> Result<Option<Hackathon>> {
        self.with_conn(|conn| query_hackathon(conn, id))
    }

    /// All hackathons, latest start first.
    pub fn list_hackathons(&self) -> Result<Vec<Hackathon>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {HACKATHON_COLUMNS} FROM hackathons h ORDER BY h.start_date DESC"
            ))?;
            let rows = stmt
                .query_map([], hackathon_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Persist the editable fields of an already-validated hackathon.
    pub fn save_hackathon(&self, hackathon: &Hackathon) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE hackathons SET title = ?2, description = ?3, location = ?4,
                    start_date = ?5, end_date = ?6, registration_deadline = ?7,
                    team_size_min = ?8, team_size_max = ?9, tags = ?10, entry_fee = ?11,
                    prize_pool = ?12
                 WHERE id = ?1",
                rusqlite::params![
                    hackathon.id.to_string(),
                    hackathon.title,
                    hackathon.description,
                    hackathon.location,
                    timestamp(&hackathon.start_date),
                    timestamp(&hackathon.end_date),
                    timestamp(&hackathon.registration_deadline),
                    hackathon.team_size.min,
                    hackathon.team_size.max,
                    serde_json::to_string(&hackathon.tags)?,
                    hackathon.entry_fee,
                    hackathon.prize_pool,
                ],
            )?;
            Ok(())
        })
    }

    /// Delete a hackathon, refunding every entry fee still held for it.
    /// Returns false if it did not exist.
    pub fn delete_hackathon(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let title: Option<String> = tx
                .query_row("SELECT title FROM hackathons WHERE id = ?1", [id.to_string()], |r| {
                    r.get(0)
                })
                .optional()?;
            let Some(title) = title else {
                return Ok(false);
            };

            let held: Vec<(String, i64)> = {
                let mut stmt = tx.prepare(
                    "SELECT user_id, fee_held FROM registrations
                     WHERE hackathon_id = ?1 AND fee_held > 0",
                )?;
                stmt.query_map([id.to_string()], |r| Ok((r.get(0)?, r.get(1)?)))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            for (user_id, amount) in held {
                let user_id: Uuid = user_id.parse()?;
                let description = format!("Refund: {} was cancelled", title);
                insert_credit_transaction(&tx, user_id, CreditKind::Refund, amount, &description)?;
            }

            tx.execute("DELETE FROM hackathons WHERE id = ?1", [id.to_string()])?;
            tx.commit()?;
            Ok(true)
        })
    }

    /// Toggle a user's interest: removes if present, inserts if not.
    /// Returns (interested, new interest count).
    pub fn toggle_interest(&self, hackathon_id: Uuid, user_id: Uuid) -> Result<(bool, u32)> {
        self.with_conn_mut(|conn| {
            let hid = hackathon_id.to_string();
            let uid = user_id.to_string();
            let removed = conn.execute(
                "DELETE FROM hackathon_interests WHERE hackathon_id = ?1 AND user_id = ?2",
                [&hid, &uid],
            )?;
            if removed == 0 {
                conn.execute(
                    "INSERT INTO hackathon_interests (hackathon_id, user_id) VALUES (?1, ?2)",
                    [&hid, &uid],
                )?;
            }
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM hackathon_interests WHERE hackathon_id = ?1",
                [&hid],
                |r| r.get(0),
            )?;
            Ok((removed == 0, count))
        })
    }

    pub fn submissions_closed(&self, hackathon_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let closed = conn
                .query_row(
                    "SELECT submissions_closed FROM hackathons WHERE id = ?1",
                    [hackathon_id.to_string()],
                    |r| r.get(0),
                )
                .optional()?;
            Ok(closed.unwrap_or(false))
        })
    }

    pub fn close_submissions(&self, hackathon_id: Uuid) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "UPDATE hackathons SET submissions_closed = 1 WHERE id = ?1",
                [hackathon_id.to_string()],
            )?;
            Ok(())
        })
    }
}

pub(crate) fn query_hackathon(conn: &Connection, id: Uuid) -> Result<Option<Hackathon>> {
    conn.query_row(
        &format!("SELECT {HACKATHON_COLUMNS} FROM hackathons h WHERE h.id = ?1"),
        [id.to_string()],
        hackathon_from_row,
    )
    .optional()
}

fn hackathon_from_row(row: &Row<'_>) -> rusqlite::Result<Hackathon> {
    let start_date = time_at(row, 5)?;
    let end_date = time_at(row, 6)?;
    let winners_finalized: bool = row.get(13)?;

    Ok(Hackathon {
        id: uuid_at(row, 0)?,
        organizer_id: uuid_at(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        start_date,
        end_date,
        registration_deadline: time_at(row, 7)?,
        team_size: TeamSize {
            min: row.get(8)?,
            max: row.get(9)?,
        },
        tags: json_at(row, 10)?,
        entry_fee: row.get(11)?,
        prize_pool: row.get(12)?,
        interest_count: row.get(15)?,
        status: HackathonStatus::at(Utc::now(), start_date, end_date, winners_finalized),
        created_at: time_at(row, 14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures;
    use hackhub_types::models::Role;

    #[test]
    fn create_fetch_and_update() {
        let db = Database::open_in_memory().unwrap();
        let org = fixtures::user(&db, "org@example.com", Role::Organizer, 0);
        let mut h = fixtures::hackathon(&db, org.id, 10);

        assert_eq!(h.status, HackathonStatus::Upcoming);
        assert_eq!(h.tags, vec!["rust".to_string(), "systems".to_string()]);
        assert_eq!(h.interest_count, 0);

        h.title = "Rust Rumble II".into();
        h.team_size = TeamSize { min: 2, max: 5 };
        db.save_hackathon(&h).unwrap();

        let stored = db.get_hackathon(h.id).unwrap().unwrap();
        assert_eq!(stored.title, "Rust Rumble II");
        assert_eq!(stored.team_size, TeamSize { min: 2, max: 5 });
        assert_eq!(stored.start_date, h.start_date);
    }

    #[test]
    fn interest_toggles_back_and_forth() {
        let db = Database::open_in_memory().unwrap();
        let org = fixtures::user(&db, "org@example.com", Role::Organizer, 0);
        let fan = fixtures::user(&db, "fan@example.com", Role::User, 0);
        let h = fixtures::hackathon(&db, org.id, 0);

        assert_eq!(db.toggle_interest(h.id, fan.id).unwrap(), (true, 1));
        assert_eq!(db.toggle_interest(h.id, org.id).unwrap(), (true, 2));
        assert_eq!(db.toggle_interest(h.id, fan.id).unwrap(), (false, 1));
        assert_eq!(db.get_hackathon(h.id).unwrap().unwrap().interest_count, 1);
    }

    #[test]
    fn delete_reports_missing_hackathon() {
        let db = Database::open_in_memory().unwrap();
        assert!(!db.delete_hackathon(Uuid::new_v4()).unwrap());
        assert!(db.list_hackathons().unwrap().is_empty());
    }

    #[test]
    fn submissions_close_once_flagged() {
        let db = Database::open_in_memory().unwrap();
        let org = fixtures::user(&db, "org@example.com", Role::Organizer, 0);
        let h = fixtures::hackathon(&db, org.id, 0);

        assert!(!db.submissions_closed(h.id).unwrap());
        db.close_submissions(h.id).unwrap();
        assert!(db.submissions_closed(h.id).unwrap());
    }
}
