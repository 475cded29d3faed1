use std::ops::Range;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::Result;
use crate::model::{
    League, Match, MatchStatus, Outcome, Prediction, Team, UserLeagueState, Winner,
};
use crate::store::Store;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        let store = Self { conn: Mutex::new(Connection::open(path)?) };
        store.init()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self { conn: Mutex::new(Connection::open_in_memory()?) };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().expect("store lock");
        conn.execute_batch(
            "BEGIN;
            CREATE TABLE IF NOT EXISTS teams (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS matches (
                id INTEGER PRIMARY KEY,
                matchday INTEGER NOT NULL,
                home_team TEXT NOT NULL,
                away_team TEXT NOT NULL,
                home_score INTEGER,
                away_score INTEGER,
                winner TEXT,
                status TEXT NOT NULL,
                kickoff_ts INTEGER
            );
            CREATE INDEX IF NOT EXISTS idx_matches_matchday ON matches (matchday);
            CREATE TABLE IF NOT EXISTS leagues (
                id TEXT PRIMARY KEY
            );
            CREATE TABLE IF NOT EXISTS league_members (
                league_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                PRIMARY KEY (league_id, user_id)
            );
            CREATE TABLE IF NOT EXISTS predictions (
                user_id TEXT NOT NULL,
                league_id TEXT NOT NULL,
                matchday INTEGER NOT NULL,
                team_id TEXT NOT NULL,
                outcome TEXT NOT NULL DEFAULT 'DEFAULT',
                created_ts INTEGER NOT NULL,
                PRIMARY KEY (user_id, league_id, matchday)
            );
            CREATE TABLE IF NOT EXISTS user_league_state (
                user_id TEXT NOT NULL,
                league_id TEXT NOT NULL,
                lives INTEGER NOT NULL,
                last_matchday_updated INTEGER NOT NULL,
                PRIMARY KEY (user_id, league_id)
            );
            CREATE TABLE IF NOT EXISTS matchday_cursor (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                value INTEGER NOT NULL
            );
            COMMIT;",
        )?;
        Ok(())
    }

    /// Leagues are owned by the surrounding product; this helper exists for
    /// bootstrap scripts and tests, not for the engine.
    pub fn put_league(&self, league: &League) -> Result<()> {
        let mut conn = self.conn.lock().expect("store lock");
        let tx = conn.transaction()?;
        tx.execute("INSERT OR IGNORE INTO leagues (id) VALUES (?1)", params![league.id])?;
        tx.execute("DELETE FROM league_members WHERE league_id = ?1", params![league.id])?;
        for (pos, user_id) in league.members.iter().enumerate() {
            tx.execute(
                "INSERT INTO league_members (league_id, user_id, position) VALUES (?1, ?2, ?3)",
                params![league.id, user_id, pos as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn row_to_match(row: &rusqlite::Row<'_>) -> rusqlite::Result<Match> {
    let winner: Option<String> = row.get(6)?;
    let status: String = row.get(7)?;
    Ok(Match {
        id: row.get::<_, i64>(0)? as u64,
        matchday: row.get::<_, i64>(1)? as u32,
        home_team: row.get(2)?,
        away_team: row.get(3)?,
        home_score: row.get(4)?,
        away_score: row.get(5)?,
        winner: winner.as_deref().and_then(Winner::parse),
        status: MatchStatus::parse(&status),
        kickoff_ts: row.get::<_, Option<i64>>(8)?.map(|v| v as u64),
    })
}

impl Store for SqliteStore {
    fn upsert_matches(&self, matches: &[Match]) -> Result<()> {
        let mut conn = self.conn.lock().expect("store lock");
        let tx = conn.transaction()?;
        for m in matches {
            tx.execute(
                "INSERT OR REPLACE INTO matches
                 (id, matchday, home_team, away_team, home_score, away_score, winner, status, kickoff_ts)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    m.id as i64,
                    m.matchday as i64,
                    m.home_team,
                    m.away_team,
                    m.home_score,
                    m.away_score,
                    m.winner.map(|w| w.as_str()),
                    m.status.as_str(),
                    m.kickoff_ts.map(|v| v as i64),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn matches_for_matchday(&self, matchday: u32) -> Result<Vec<Match>> {
        let conn = self.conn.lock().expect("store lock");
        let mut stmt = conn.prepare(
            "SELECT id, matchday, home_team, away_team, home_score, away_score, winner, status, kickoff_ts
             FROM matches WHERE matchday = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![matchday as i64], row_to_match)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn delete_finished_matches(&self) -> Result<u64> {
        let conn = self.conn.lock().expect("store lock");
        let n = conn.execute("DELETE FROM matches WHERE status = 'FINISHED'", [])?;
        Ok(n as u64)
    }

    fn leagues(&self) -> Result<Vec<League>> {
        let conn = self.conn.lock().expect("store lock");
        let mut stmt = conn.prepare("SELECT id FROM leagues ORDER BY id")?;
        let ids: Vec<String> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<_>>()?;
        let mut members_stmt = conn.prepare(
            "SELECT user_id FROM league_members WHERE league_id = ?1 ORDER BY position",
        )?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            let members: Vec<String> = members_stmt
                .query_map(params![id], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
            out.push(League { id, members });
        }
        Ok(out)
    }

    fn prediction(&self, user_id: &str, league_id: &str, matchday: u32) -> Result<Option<Prediction>> {
        let conn = self.conn.lock().expect("store lock");
        let row = conn
            .query_row(
                "SELECT team_id, outcome, created_ts FROM predictions
                 WHERE user_id = ?1 AND league_id = ?2 AND matchday = ?3",
                params![user_id, league_id, matchday as i64],
                |row| {
                    let outcome: String = row.get(1)?;
                    Ok(Prediction {
                        user_id: user_id.to_string(),
                        league_id: league_id.to_string(),
                        matchday,
                        team_id: row.get(0)?,
                        outcome: Outcome::parse(&outcome),
                        created_ts: row.get::<_, i64>(2)? as u64,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn predicted_teams_in_window(
        &self,
        user_id: &str,
        league_id: &str,
        window: Range<u32>,
    ) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("store lock");
        let mut stmt = conn.prepare(
            "SELECT DISTINCT team_id FROM predictions
             WHERE user_id = ?1 AND league_id = ?2 AND matchday >= ?3 AND matchday < ?4
             ORDER BY team_id",
        )?;
        let teams: Vec<String> = stmt
            .query_map(
                params![user_id, league_id, window.start as i64, window.end as i64],
                |row| row.get(0),
            )?
            .collect::<rusqlite::Result<_>>()?;
        Ok(teams)
    }

    fn insert_prediction_if_absent(&self, p: &Prediction) -> Result<bool> {
        let conn = self.conn.lock().expect("store lock");
        let n = conn.execute(
            "INSERT OR IGNORE INTO predictions
             (user_id, league_id, matchday, team_id, outcome, created_ts)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                p.user_id,
                p.league_id,
                p.matchday as i64,
                p.team_id,
                p.outcome.as_str(),
                p.created_ts as i64,
            ],
        )?;
        Ok(n == 1)
    }

    fn set_prediction_outcome(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        outcome: Outcome,
    ) -> Result<()> {
        let conn = self.conn.lock().expect("store lock");
        conn.execute(
            "UPDATE predictions SET outcome = ?4
             WHERE user_id = ?1 AND league_id = ?2 AND matchday = ?3",
            params![user_id, league_id, matchday as i64, outcome.as_str()],
        )?;
        Ok(())
    }

    fn ensure_user_league_state(&self, user_id: &str, league_id: &str) -> Result<UserLeagueState> {
        {
            let conn = self.conn.lock().expect("store lock");
            let fresh = UserLeagueState::fresh();
            conn.execute(
                "INSERT OR IGNORE INTO user_league_state
                 (user_id, league_id, lives, last_matchday_updated)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, league_id, fresh.lives, fresh.last_matchday_updated as i64],
            )?;
        }
        self.user_league_state(user_id, league_id)?
            .ok_or_else(|| crate::error::EngineError::NotFound {
                entity: "user_league_state",
                id: format!("{}/{}", user_id, league_id),
            })
    }

    fn user_league_state(&self, user_id: &str, league_id: &str) -> Result<Option<UserLeagueState>> {
        let conn = self.conn.lock().expect("store lock");
        let row = conn
            .query_row(
                "SELECT lives, last_matchday_updated FROM user_league_state
                 WHERE user_id = ?1 AND league_id = ?2",
                params![user_id, league_id],
                |row| {
                    Ok(UserLeagueState {
                        lives: row.get(0)?,
                        last_matchday_updated: row.get::<_, i64>(1)? as u32,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn apply_matchday_result(
        &self,
        user_id: &str,
        league_id: &str,
        matchday: u32,
        lose_life: bool,
    ) -> Result<bool> {
        let conn = self.conn.lock().expect("store lock");
        // The guard predicate makes this write race-safe: a second writer
        // for the same matchday matches zero rows.
        let n = conn.execute(
            "UPDATE user_league_state
             SET lives = lives - ?4, last_matchday_updated = ?3
             WHERE user_id = ?1 AND league_id = ?2 AND last_matchday_updated < ?3",
            params![user_id, league_id, matchday as i64, if lose_life { 1 } else { 0 }],
        )?;
        Ok(n == 1)
    }

    fn cursor(&self) -> Result<u32> {
        let conn = self.conn.lock().expect("store lock");
        let value: Option<i64> = conn
            .query_row("SELECT value FROM matchday_cursor WHERE id = 1", [], |row| row.get(0))
            .optional()?;
        Ok(value.map(|v| v as u32).unwrap_or(1))
    }

    fn set_cursor(&self, matchday: u32) -> Result<()> {
        let conn = self.conn.lock().expect("store lock");
        conn.execute(
            "INSERT INTO matchday_cursor (id, value) VALUES (1, ?1)
             ON CONFLICT (id) DO UPDATE SET value = excluded.value",
            params![matchday as i64],
        )?;
        Ok(())
    }

    fn teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn.lock().expect("store lock");
        let mut stmt = conn.prepare("SELECT id, name FROM teams ORDER BY id")?;
        let teams: Vec<Team> = stmt
            .query_map([], |row| Ok(Team { id: row.get(0)?, name: row.get(1)? }))?
            .collect::<rusqlite::Result<_>>()?;
        Ok(teams)
    }

    fn seed_teams(&self, teams: &[Team]) -> Result<()> {
        let mut conn = self.conn.lock().expect("store lock");
        let tx = conn.transaction()?;
        for t in teams {
            tx.execute(
                "INSERT OR IGNORE INTO teams (id, name) VALUES (?1, ?2)",
                params![t.id, t.name],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}
