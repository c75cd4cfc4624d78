use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use hackhub_types::models::{CreditKind, Role, User};

use super::OptionalExt;
use super::credits::insert_credit_transaction;
use crate::Database;
use crate::models::{UserRecord, enum_at, time_at, uuid_at};

const USER_COLUMNS: &str = "id, email, name, role, created_at, password";

impl Database {
    /// Create a user and deposit the signup credits in the same transaction.
    pub fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        role: Role,
        signup_credits: i64,
    ) -> Result<User> {
        let id = Uuid::new_v4();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO users (id, email, name, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id.to_string(), email, name, password_hash, role.as_str()],
            )?;
            if signup_credits > 0 {
                insert_credit_transaction(&tx, id, CreditKind::Deposit, signup_credits, "Signup bonus")?;
            }
            let record = query_user(&tx, "id", &id.to_string())?
                .ok_or_else(|| anyhow!("User {} missing after insert", id))?;
            tx.commit()?;
            Ok(record.user)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn(|conn| Ok(query_user(conn, "id", &id.to_string())?.map(|r| r.user)))
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRecord>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"))?;
    stmt.query_row([value], user_record_from_row).optional()
}

fn user_record_from_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        user: User {
            id: uuid_at(row, 0)?,
            email: row.get(1)?,
            name: row.get(2)?,
            role: enum_at(row, 3)?,
            created_at: time_at(row, 4)?,
        },
        password_hash: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_fetch_user() {
        let db = Database::open_in_memory().unwrap();
        let user = db
            .create_user("ada@example.com", "Ada", "argon-hash", Role::Organizer, 0)
            .unwrap();

        let by_id = db.get_user(user.id).unwrap().unwrap();
        assert_eq!(by_id, user);
        assert_eq!(by_id.role, Role::Organizer);

        let record = db.get_user_by_email("ADA@example.com").unwrap().unwrap();
        assert_eq!(record.user.id, user.id);
        assert_eq!(record.password_hash, "argon-hash");
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("dup@example.com", "A", "h", Role::User, 0).unwrap();
        assert!(db.create_user("dup@example.com", "B", "h", Role::User, 0).is_err());
    }

    #[test]
    fn signup_credits_are_deposited() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("c@example.com", "C", "h", Role::User, 100).unwrap();
        assert_eq!(db.credit_balance(user.id).unwrap(), 100);
        assert!(db.get_user(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn only_unique_violations_read_as_duplicates() {
        let db = Database::open_in_memory().unwrap();
        db.create_user("ada@example.com", "Ada", "h", Role::User, 0).unwrap();

        let again = db.create_user("ADA@example.com", "Ada", "h", Role::User, 0);
        assert!(crate::unless_duplicate(again).unwrap().is_none());

        let user = db.create_user("bo@example.com", "Bo", "h", Role::User, 0).unwrap();
        // A CHECK failure is a real error, not a duplicate
        assert!(crate::unless_duplicate(db.deposit_credits(user.id, 0, "nothing")).is_err());
    }
}
