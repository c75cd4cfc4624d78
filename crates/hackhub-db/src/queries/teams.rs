use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};
use uuid::Uuid;

use hackhub_types::models::{Team, TeamMembership};

use super::OptionalExt;
use crate::Database;
use crate::models::{opt_uuid_at, time_at, uuid_at};

const TEAM_COLUMNS: &str = "t.id, t.name, t.code, t.owner_id, t.hackathon_id, t.created_at";

impl Database {
    /// Create a team; the owner becomes its first member.
    pub fn create_team(
        &self,
        name: &str,
        code: &str,
        owner_id: Uuid,
        hackathon_id: Option<Uuid>,
    ) -> Result<Team> {
        let id = Uuid::new_v4();
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO teams (id, name, code, owner_id, hackathon_id) VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    id.to_string(),
                    name,
                    code,
                    owner_id.to_string(),
                    hackathon_id.map(|h| h.to_string()),
                ],
            )?;
            tx.execute(
                "INSERT INTO team_members (team_id, user_id) VALUES (?1, ?2)",
                [id.to_string(), owner_id.to_string()],
            )?;
            let team = query_team(&tx, "t.id", &id.to_string())?
                .ok_or_else(|| anyhow!("Team {} missing after insert", id))?;
            tx.commit()?;
            Ok(team)
        })
    }

    pub fn team_code_taken(&self, code: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let taken = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM teams WHERE code = ?1)",
                [code],
                |r| r.get(0),
            )?;
            Ok(taken)
        })
    }

    pub fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
        self.with_conn(|conn| query_team(conn, "t.id", &id.to_string()))
    }

    pub fn team_by_code(&self, code: &str) -> Result<Option<Team>> {
        self.with_conn(|conn| query_team(conn, "t.code", code))
    }

    /// Teams the user owns or belongs to, oldest first.
    pub fn list_teams_for_user(&self, user_id: Uuid) -> Result<Vec<Team>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TEAM_COLUMNS} FROM teams t
                 JOIN team_members m ON m.team_id = t.id
                 WHERE m.user_id = ?1
                 ORDER BY t.created_at, t.rowid"
            ))?;
            let teams = stmt
                .query_map([user_id.to_string()], team_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            teams
                .into_iter()
                .map(|mut team| {
                    team.members = load_members(conn, &team)?;
                    Ok(team)
                })
                .collect()
        })
    }

    /// Returns false if the user was already a member.
    pub fn add_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO team_members (team_id, user_id) VALUES (?1, ?2)",
                [team_id.to_string(), user_id.to_string()],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn is_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let member = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = ?1 AND user_id = ?2)",
                [team_id.to_string(), user_id.to_string()],
                |r| r.get(0),
            )?;
            Ok(member)
        })
    }

    pub fn delete_team(&self, id: Uuid) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let deleted = conn.execute("DELETE FROM teams WHERE id = ?1", [id.to_string()])?;
            Ok(deleted == 1)
        })
    }
}

fn query_team(conn: &Connection, column: &str, value: &str) -> Result<Option<Team>> {
    let team = conn
        .query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams t WHERE {column} = ?1"),
            [value],
            team_from_row,
        )
        .optional()?;

    match team {
        Some(mut team) => {
            team.members = load_members(conn, &team)?;
            Ok(Some(team))
        }
        None => Ok(None),
    }
}

fn load_members(conn: &Connection, team: &Team) -> Result<Vec<TeamMembership>> {
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name, u.email
         FROM team_members m
         JOIN users u ON u.id = m.user_id
         WHERE m.team_id = ?1
         ORDER BY m.joined_at, m.rowid",
    )?;
    let members = stmt
        .query_map([team.id.to_string()], |row| {
            let user_id = uuid_at(row, 0)?;
            Ok(TeamMembership {
                user_id,
                name: row.get(1)?,
                email: row.get(2)?,
                is_owner: user_id == team.owner_id,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Members are loaded separately.
fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        owner_id: uuid_at(row, 3)?,
        hackathon_id: opt_uuid_at(row, 4)?,
        members: Vec::new(),
        created_at: time_at(row, 5)?,
    })
}
