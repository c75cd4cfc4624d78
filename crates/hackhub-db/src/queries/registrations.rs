use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use hackhub_types::models::{CreditKind, HackathonRegistration, RegistrationStatus};

use super::OptionalExt;
use super::credits::{balance_of, insert_credit_transaction};
use crate::Database;
use crate::models::{ChargeOutcome, NewRegistration, enum_at, json_at, time_at, uuid_at};

const REGISTRATION_COLUMNS: &str =
    "id, hackathon_id, user_id, team_name, team_members, status, created_at";

impl Database {
    /// Insert a pending registration and charge the entry fee in one
    /// transaction. Nothing is written when the balance cannot cover the fee.
    pub fn create_registration(
        &self,
        new: &NewRegistration,
        entry_fee: i64,
    ) -> Result<ChargeOutcome<HackathonRegistration>> {
        let id = Uuid::new_v4();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if entry_fee > 0 {
                let balance = balance_of(&tx, new.user_id)?;
                if balance < entry_fee {
                    return Ok(ChargeOutcome::InsufficientCredits {
                        balance,
                        required: entry_fee,
                    });
                }
                insert_credit_transaction(
                    &tx,
                    new.user_id,
                    CreditKind::Deduction,
                    entry_fee,
                    "Hackathon entry fee",
                )?;
            }

            tx.execute(
                "INSERT INTO registrations (id, hackathon_id, user_id, team_name, team_members, fee_held)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    id.to_string(),
                    new.hackathon_id.to_string(),
                    new.user_id.to_string(),
                    new.team_name,
                    serde_json::to_string(&new.team_members)?,
                    entry_fee.max(0),
                ],
            )?;

            let registration = query_registration(&tx, id)?
                .ok_or_else(|| anyhow!("Registration {} missing after insert", id))?;
            tx.commit()?;
            Ok(ChargeOutcome::Charged(registration))
        })
    }

    pub fn get_registration(&self, id: Uuid) -> Result<Option<HackathonRegistration>> {
        self.with_conn(|conn| query_registration(conn, id))
    }

    pub fn registration_for(
        &self,
        hackathon_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<HackathonRegistration>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {REGISTRATION_COLUMNS} FROM registrations
                     WHERE hackathon_id = ?1 AND user_id = ?2"
                ),
                [hackathon_id.to_string(), user_id.to_string()],
                registration_from_row,
            )
            .optional()
        })
    }

    pub fn list_registrations_for_user(&self, user_id: Uuid) -> Result<Vec<HackathonRegistration>> {
        self.list_registrations_where("user_id", user_id)
    }

    pub fn list_registrations_for_hackathon(
        &self,
        hackathon_id: Uuid,
    ) -> Result<Vec<HackathonRegistration>> {
        self.list_registrations_where("hackathon_id", hackathon_id)
    }

    fn list_registrations_where(
        &self,
        column: &str,
        id: Uuid,
    ) -> Result<Vec<HackathonRegistration>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REGISTRATION_COLUMNS} FROM registrations
                 WHERE {column} = ?1
                 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt
                .query_map([id.to_string()], registration_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Change a registration's status, moving credits as needed: rejecting
    /// refunds a held fee, leaving `rejected` charges `entry_fee` again.
    /// Returns `Ok(None)` if the registration does not exist.
    pub fn update_registration_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
        entry_fee: i64,
    ) -> Result<Option<ChargeOutcome<HackathonRegistration>>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current = tx
                .query_row(
                    "SELECT user_id, status, fee_held FROM registrations WHERE id = ?1",
                    [id.to_string()],
                    |r| Ok((uuid_at(r, 0)?, enum_at::<RegistrationStatus>(r, 1)?, r.get::<_, i64>(2)?)),
                )
                .optional()?;
            let Some((user_id, previous, fee_held)) = current else {
                return Ok(None);
            };

            let mut held = fee_held;
            if status == RegistrationStatus::Rejected && previous != RegistrationStatus::Rejected {
                if fee_held > 0 {
                    insert_credit_transaction(
                        &tx,
                        user_id,
                        CreditKind::Refund,
                        fee_held,
                        "Refund: registration rejected",
                    )?;
                }
                held = 0;
            } else if previous == RegistrationStatus::Rejected
                && status != RegistrationStatus::Rejected
                && entry_fee > 0
            {
                let balance = balance_of(&tx, user_id)?;
                if balance < entry_fee {
                    return Ok(Some(ChargeOutcome::InsufficientCredits {
                        balance,
                        required: entry_fee,
                    }));
                }
                insert_credit_transaction(
                    &tx,
                    user_id,
                    CreditKind::Deduction,
                    entry_fee,
                    "Hackathon entry fee",
                )?;
                held = entry_fee;
            }

            tx.execute(
                "UPDATE registrations SET status = ?2, fee_held = ?3 WHERE id = ?1",
                rusqlite::params![id.to_string(), status.as_str(), held],
            )?;
            let updated = query_registration(&tx, id)?
                .ok_or_else(|| anyhow!("Registration {} missing after update", id))?;
            tx.commit()?;
            Ok(Some(ChargeOutcome::Charged(updated)))
        })
    }
}

fn query_registration(conn: &Connection, id: Uuid) -> Result<Option<HackathonRegistration>> {
    conn.query_row(
        &format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = ?1"),
        [id.to_string()],
        registration_from_row,
    )
    .optional()
}

fn registration_from_row(row: &Row<'_>) -> rusqlite::Result<HackathonRegistration> {
    Ok(HackathonRegistration {
        id: uuid_at(row, 0)?,
        hackathon_id: uuid_at(row, 1)?,
        user_id: uuid_at(row, 2)?,
        team_name: row.get(3)?,
        team_members: json_at(row, 4)?,
        status: enum_at(row, 5)?,
        created_at: time_at(row, 6)?,
    })
}
