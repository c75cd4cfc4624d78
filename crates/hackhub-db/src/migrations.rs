use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
                name        TEXT NOT NULL,
                password    TEXT NOT NULL,
                role        TEXT NOT NULL CHECK (role IN ('user', 'organizer')),
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE hackathons (
                id                      TEXT PRIMARY KEY,
                organizer_id            TEXT NOT NULL REFERENCES users(id),
                title                   TEXT NOT NULL,
                description             TEXT NOT NULL DEFAULT '',
                location                TEXT NOT NULL DEFAULT '',
                start_date              TEXT NOT NULL,
                end_date                TEXT NOT NULL,
                registration_deadline   TEXT NOT NULL,
                team_size_min           INTEGER NOT NULL,
                team_size_max           INTEGER NOT NULL,
                tags                    TEXT NOT NULL DEFAULT '[]',
                entry_fee               INTEGER NOT NULL DEFAULT 0,
                prize_pool              TEXT NOT NULL DEFAULT '',
                submissions_closed      INTEGER NOT NULL DEFAULT 0,
                winners_finalized       INTEGER NOT NULL DEFAULT 0,
                created_at              TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE hackathon_interests (
                hackathon_id    TEXT NOT NULL REFERENCES hackathons(id) ON DELETE CASCADE,
                user_id         TEXT NOT NULL REFERENCES users(id),
                PRIMARY KEY (hackathon_id, user_id)
            );

            CREATE TABLE registrations (
                id              TEXT PRIMARY KEY,
                hackathon_id    TEXT NOT NULL REFERENCES hackathons(id) ON DELETE CASCADE,
                user_id         TEXT NOT NULL REFERENCES users(id),
                team_name       TEXT,
                team_members    TEXT NOT NULL DEFAULT '[]',
                status          TEXT NOT NULL DEFAULT 'pending'
                                CHECK (status IN ('pending', 'approved', 'rejected')),
                fee_held        INTEGER NOT NULL DEFAULT 0,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (hackathon_id, user_id)
            );

            CREATE INDEX idx_registrations_user ON registrations(user_id);

            CREATE TABLE teams (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                code            TEXT NOT NULL UNIQUE,
                owner_id        TEXT NOT NULL REFERENCES users(id),
                hackathon_id    TEXT REFERENCES hackathons(id) ON DELETE SET NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE team_members (
                team_id     TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                user_id     TEXT NOT NULL REFERENCES users(id),
                joined_at   TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (team_id, user_id)
            );

            CREATE TABLE submissions (
                id              TEXT PRIMARY KEY,
                hackathon_id    TEXT NOT NULL REFERENCES hackathons(id) ON DELETE CASCADE,
                team_id         TEXT NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                submitted_by    TEXT NOT NULL REFERENCES users(id),
                title           TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                github_url      TEXT NOT NULL,
                demo_url        TEXT,
                score           INTEGER CHECK (score BETWEEN 0 AND 100),
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (hackathon_id, team_id)
            );

            CREATE INDEX idx_submissions_hackathon ON submissions(hackathon_id, created_at);

            CREATE TABLE winners (
                hackathon_id    TEXT NOT NULL REFERENCES hackathons(id) ON DELETE CASCADE,
                position        INTEGER NOT NULL CHECK (position BETWEEN 1 AND 3),
                submission_id   TEXT NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
                PRIMARY KEY (hackathon_id, position)
            );

            CREATE TABLE credit_transactions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                kind        TEXT NOT NULL CHECK (kind IN ('deposit', 'deduction', 'refund')),
                amount      INTEGER NOT NULL CHECK (amount > 0),
                description TEXT NOT NULL DEFAULT '',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_credit_transactions_user ON credit_transactions(user_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
