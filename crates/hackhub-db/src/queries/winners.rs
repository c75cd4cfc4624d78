use anyhow::Result;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use hackhub_types::models::{MAX_WINNERS, Winner};

use super::OptionalExt;
use crate::Database;
use crate::models::{FinalizeOutcome, uuid_at};

impl Database {
    /// Winners of a hackathon by position. Empty until finalized.
    pub fn list_winners(&self, hackathon_id: Uuid) -> Result<Vec<Winner>> {
        self.with_conn(|conn| query_winners(conn, hackathon_id))
    }

    pub fn winners_finalized(&self, hackathon_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let finalized = conn
                .query_row(
                    "SELECT winners_finalized FROM hackathons WHERE id = ?1",
                    [hackathon_id.to_string()],
                    |r| r.get(0),
                )
                .optional()?;
            Ok(finalized.unwrap_or(false))
        })
    }

    /// Rank scored submissions (score descending, earlier submission first on
    /// ties), store the top three, close submissions and mark winners final.
    pub fn finalize_winners(&self, hackathon_id: Uuid) -> Result<FinalizeOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let hid = hackathon_id.to_string();

            let finalized: bool = tx
                .query_row("SELECT winners_finalized FROM hackathons WHERE id = ?1", [&hid], |r| {
                    r.get(0)
                })
                .optional()?
                .unwrap_or(false);
            if finalized {
                return Ok(FinalizeOutcome::AlreadyFinalized);
            }

            let ranked: Vec<String> = {
                let mut stmt = tx.prepare(
                    "SELECT id FROM submissions
                     WHERE hackathon_id = ?1 AND score IS NOT NULL
                     ORDER BY score DESC, created_at, rowid
                     LIMIT ?2",
                )?;
                stmt.query_map(rusqlite::params![hid, MAX_WINNERS as i64], |r| r.get(0))?
                    .collect::<std::result::Result<Vec<_>, _>>()?
            };
            if ranked.is_empty() {
                return Ok(FinalizeOutcome::NoScoredSubmissions);
            }

            for (idx, submission_id) in ranked.iter().enumerate() {
                tx.execute(
                    "INSERT INTO winners (hackathon_id, position, submission_id) VALUES (?1, ?2, ?3)",
                    rusqlite::params![hid, idx as i64 + 1, submission_id],
                )?;
            }
            tx.execute(
                "UPDATE hackathons SET winners_finalized = 1, submissions_closed = 1 WHERE id = ?1",
                [&hid],
            )?;

            let winners = query_winners(&tx, hackathon_id)?;
            tx.commit()?;

            info!("Finalized {} winners for hackathon {}", winners.len(), hackathon_id);
            Ok(FinalizeOutcome::Finalized(winners))
        })
    }
}

fn query_winners(conn: &Connection, hackathon_id: Uuid) -> Result<Vec<Winner>> {
    let mut stmt = conn.prepare(
        "SELECT w.hackathon_id, w.position, s.id, s.team_id, t.name, s.title, s.score
         FROM winners w
         JOIN submissions s ON s.id = w.submission_id
         JOIN teams t ON t.id = s.team_id
         WHERE w.hackathon_id = ?1
         ORDER BY w.position",
    )?;
    let winners = stmt
        .query_map([hackathon_id.to_string()], |row| {
            Ok(Winner {
                hackathon_id: uuid_at(row, 0)?,
                position: row.get(1)?,
                submission_id: uuid_at(row, 2)?,
                team_id: uuid_at(row, 3)?,
                team_name: row.get(4)?,
                project_title: row.get(5)?,
                score: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(winners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::fixtures::{self, new_submission};
    use hackhub_types::models::{HackathonStatus, Role};

    #[test]
    fn top_three_scores_win() {
        let db = Database::open_in_memory().unwrap();
        let org = fixtures::user(&db, "org@example.com", Role::Organizer, 0);
        let h = fixtures::hackathon(&db, org.id, 0);

        let scores = [(70, "A"), (95, "B"), (60, "C"), (95, "D"), (10, "E")];
        let mut ids = Vec::new();
        for (i, (score, name)) in scores.iter().enumerate() {
            let dev = fixtures::user(&db, &format!("dev{i}@example.com"), Role::User, 0);
            let team = db.create_team(name, &format!("TM000{i}"), dev.id, Some(h.id)).unwrap();
            let sub = db.create_submission(&new_submission(h.id, team.id, dev.id)).unwrap();
            db.set_submission_score(sub.id, *score).unwrap();
            ids.push(sub.id);
        }

        let winners = match db.finalize_winners(h.id).unwrap() {
            FinalizeOutcome::Finalized(w) => w,
            other => panic!("unexpected outcome {:?}", other),
        };
        let ranking: Vec<(u8, &str, u32)> = winners
            .iter()
            .map(|w| (w.position, w.team_name.as_str(), w.score))
            .collect();
        assert_eq!(ranking, vec![(1, "B", 95), (2, "D", 95), (3, "A", 70)]);
        assert_eq!(winners[0].submission_id, ids[1]);

        let stored = db.get_hackathon(h.id).unwrap().unwrap();
        assert_eq!(stored.status, HackathonStatus::Completed);
        assert!(db.submissions_closed(h.id).unwrap());
        assert!(db.winners_finalized(h.id).unwrap());
        assert_eq!(db.list_winners(h.id).unwrap(), winners);

        assert!(matches!(
            db.finalize_winners(h.id).unwrap(),
            FinalizeOutcome::AlreadyFinalized
        ));
    }

    #[test]
    fn unscored_hackathon_cannot_be_finalized() {
        let db = Database::open_in_memory().unwrap();
        let org = fixtures::user(&db, "org@example.com", Role::Organizer, 0);
        let dev = fixtures::user(&db, "dev@example.com", Role::User, 0);
        let h = fixtures::hackathon(&db, org.id, 0);
        let team = db.create_team("Late", "LT0001", dev.id, Some(h.id)).unwrap();
        db.create_submission(&new_submission(h.id, team.id, dev.id)).unwrap();

        assert!(matches!(
            db.finalize_winners(h.id).unwrap(),
            FinalizeOutcome::NoScoredSubmissions
        ));
        assert!(db.list_winners(h.id).unwrap().is_empty());
        assert!(!db.submissions_closed(h.id).unwrap());
    }
}
