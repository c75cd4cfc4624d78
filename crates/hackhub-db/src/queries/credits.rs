use anyhow::Result;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use hackhub_types::api::{CreditSummary, MAX_CREDIT_BALANCE};
use hackhub_types::models::{CreditKind, CreditTransaction};

use crate::Database;
use crate::models::{DepositOutcome, enum_at, time_at, uuid_at};

const TX_COLUMNS: &str = "id, user_id, kind, amount, description, created_at";

impl Database {
    pub fn credit_balance(&self, user_id: Uuid) -> Result<i64> {
        self.with_conn(|conn| balance_of(conn, user_id))
    }

    /// Newest first.
    pub fn list_credit_transactions(&self, user_id: Uuid) -> Result<Vec<CreditTransaction>> {
        self.with_conn(|conn| transactions_of(conn, user_id))
    }

    pub fn credit_summary(&self, user_id: Uuid) -> Result<CreditSummary> {
        self.with_conn(|conn| summary_of(conn, user_id))
    }

    /// Deposit `amount` and return the resulting summary, all in one
    /// transaction. Nothing is written if the balance would pass
    /// `MAX_CREDIT_BALANCE`.
    pub fn deposit_credits(
        &self,
        user_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<DepositOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let balance = balance_of(&tx, user_id)?;
            if balance
                .checked_add(amount)
                .is_none_or(|total| total > MAX_CREDIT_BALANCE)
            {
                return Ok(DepositOutcome::LimitExceeded {
                    balance,
                    limit: MAX_CREDIT_BALANCE,
                });
            }
            insert_credit_transaction(&tx, user_id, CreditKind::Deposit, amount, description)?;
            let summary = summary_of(&tx, user_id)?;
            tx.commit()?;
            Ok(DepositOutcome::Deposited(summary))
        })
    }
}

fn summary_of(conn: &Connection, user_id: Uuid) -> Result<CreditSummary> {
    Ok(CreditSummary {
        balance: balance_of(conn, user_id)?,
        transactions: transactions_of(conn, user_id)?,
    })
}

fn transactions_of(conn: &Connection, user_id: Uuid) -> Result<Vec<CreditTransaction>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TX_COLUMNS} FROM credit_transactions
         WHERE user_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;
    let rows = stmt
        .query_map([user_id.to_string()], credit_tx_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Deposits and refunds add, deductions subtract.
pub(crate) fn balance_of(conn: &Connection, user_id: Uuid) -> Result<i64> {
    let balance = conn.query_row(
        "SELECT COALESCE(SUM(CASE kind WHEN 'deduction' THEN -amount ELSE amount END), 0)
         FROM credit_transactions WHERE user_id = ?1",
        [user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(balance)
}

pub(crate) fn insert_credit_transaction(
    conn: &Connection,
    user_id: Uuid,
    kind: CreditKind,
    amount: i64,
    description: &str,
) -> Result<CreditTransaction> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO credit_transactions (id, user_id, kind, amount, description)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![id.to_string(), user_id.to_string(), kind.as_str(), amount, description],
    )?;
    let tx = conn.query_row(
        &format!("SELECT {TX_COLUMNS} FROM credit_transactions WHERE id = ?1"),
        [id.to_string()],
        credit_tx_from_row,
    )?;
    Ok(tx)
}

fn credit_tx_from_row(row: &Row<'_>) -> rusqlite::Result<CreditTransaction> {
    Ok(CreditTransaction {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        kind: enum_at(row, 2)?,
        amount: row.get(3)?,
        description: row.get(4)?,
        created_at: time_at(row, 5)?,
    })
}
