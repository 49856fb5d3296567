use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

pub type Result<T> = std::result::Result<T, StoreError>;

/// One finished game in the win history
#[derive(Debug, Clone, PartialEq)]
pub struct WinRecord {
    pub finished_at: DateTime<Local>,
    pub elapsed_secs: u32,
    pub moves: u32,
    pub stars: u8,
    pub pairs: u32,
}

/// Where the best time (and optionally the win history) lives.
pub trait BestTimeStore {
    fn best_time(&self) -> Result<Option<u32>>;
    fn set_best_time(&mut self, secs: u32) -> Result<()>;

    fn record_win(&mut self, _record: &WinRecord) -> Result<()> {
        Ok(())
    }

    fn recent_wins(&self, _limit: usize) -> Result<Vec<WinRecord>> {
        Ok(Vec::new())
    }
}

/// Store kept in memory; used in tests and when the database can't be opened.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    best: Option<u32>,
    wins: Vec<WinRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_best_time(secs: u32) -> Self {
        Self {
            best: Some(secs),
            wins: Vec::new(),
        }
    }
}

impl BestTimeStore for MemoryStore {
    fn best_time(&self) -> Result<Option<u32>> {
        Ok(self.best)
    }

    fn set_best_time(&mut self, secs: u32) -> Result<()> {
        self.best = Some(secs);
        Ok(())
    }

    fn record_win(&mut self, record: &WinRecord) -> Result<()> {
        self.wins.push(record.clone());
        Ok(())
    }

    fn recent_wins(&self, limit: usize) -> Result<Vec<WinRecord>> {
        Ok(self.wins.iter().rev().take(limit).cloned().collect())
    }
}

/// SQLite-backed best time and win history
#[derive(Debug)]
pub struct ScoreDb {
    conn: Connection,
}

impl ScoreDb {
    /// Open the database at the default state location.
    pub fn new() -> Result<Self> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("pairmatch.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS best_time (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                seconds INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS wins (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                finished_at TEXT NOT NULL,
                elapsed_secs INTEGER NOT NULL,
                moves INTEGER NOT NULL,
                stars INTEGER NOT NULL,
                pairs INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        Ok(Self { conn })
    }

    /// Write the whole win history, oldest first, as CSV.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record(["finished_at", "elapsed_secs", "moves", "stars", "pairs"])?;

        let mut wins = self.recent_wins(usize::MAX)?;
        wins.reverse();
        for w in &wins {
            out.write_record([
                w.finished_at.to_rfc3339(),
                w.elapsed_secs.to_string(),
                w.moves.to_string(),
                w.stars.to_string(),
                w.pairs.to_string(),
            ])?;
        }
        out.flush()?;
        Ok(wins.len())
    }

    pub fn clear(&self) -> Result<()> {
        self.conn.execute("DELETE FROM best_time", [])?;
        self.conn.execute("DELETE FROM wins", [])?;
        Ok(())
    }
}

impl BestTimeStore for ScoreDb {
    fn best_time(&self) -> Result<Option<u32>> {
        let secs = self
            .conn
            .query_row("SELECT seconds FROM best_time WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(secs)
    }

    fn set_best_time(&mut self, secs: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO best_time (id, seconds) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET seconds = excluded.seconds",
            params![secs],
        )?;
        Ok(())
    }

    fn record_win(&mut self, record: &WinRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO wins (finished_at, elapsed_secs, moves, stars, pairs)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.finished_at.to_rfc3339(),
                record.elapsed_secs,
                record.moves,
                record.stars,
                record.pairs,
            ],
        )?;
        Ok(())
    }

    fn recent_wins(&self, limit: usize) -> Result<Vec<WinRecord>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            r#"
            SELECT finished_at, elapsed_secs, moves, stars, pairs
            FROM wins
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u32>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?;

        let mut wins = Vec::new();
        for row in rows {
            let (ts, elapsed_secs, moves, stars, pairs) = row?;
            let finished_at = DateTime::parse_from_rfc3339(&ts)
                .map_err(|_| StoreError::Timestamp(ts.clone()))?
                .with_timezone(&Local);
            wins.push(WinRecord {
                finished_at,
                elapsed_secs,
                moves,
                stars,
                pairs,
            });
        }
        Ok(wins)
    }
}
