//! SQLite-backed record store for scraped questions.
//!
//! The store is an append-only `questions` table inside a single database
//! file. Every operation opens its own connection and closes it on return,
//! which keeps the store trivially shareable across request handlers and
//! makes `reset` a plain file removal. A missing database file is "no
//! history", never an error.
//!
//! Deduplication is a read-time concern: `append` inserts whatever it is
//! given, and [`QuestionStore::query`] keeps the first row per url.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};

use crate::error::PulseError;
use crate::models::{QuestionRow, ScrapedQuestion};

/// How many keywords the dashboard history selector shows.
pub const HISTORY_LIMIT: usize = 30;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS questions (
    keyword        TEXT NOT NULL,
    scraped_at     TEXT NOT NULL,
    title          TEXT,
    author         TEXT,
    score          INTEGER NOT NULL DEFAULT 0,
    url            TEXT,
    answer_count   INTEGER NOT NULL DEFAULT 0,
    is_answered    INTEGER NOT NULL DEFAULT 0,
    view_count     INTEGER NOT NULL DEFAULT 0,
    creation_date  TEXT,
    tags           TEXT
);
CREATE INDEX IF NOT EXISTS idx_questions_keyword ON questions (keyword);
";

/// Handle to the question database file.
///
/// Cloning is cheap; the handle owns only the path.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    path: PathBuf,
}

impl QuestionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection, creating the file and schema if needed.
    fn open(&self) -> Result<Connection, PulseError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(conn)
    }

    /// Append freshly scraped rows for a keyword, stamped with the current
    /// local time. No uniqueness is enforced here.
    #[instrument(level = "info", skip_all, fields(keyword = %keyword, count = rows.len()))]
    pub fn append(&self, keyword: &str, rows: &[ScrapedQuestion]) -> Result<usize, PulseError> {
        let scraped_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.append_at(keyword, rows, &scraped_at)
    }

    fn append_at(
        &self,
        keyword: &str,
        rows: &[ScrapedQuestion],
        scraped_at: &str,
    ) -> Result<usize, PulseError> {
        let mut conn = self.open()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO questions
                   (keyword, scraped_at, title, author, score, url,
                    answer_count, is_answered, view_count, creation_date, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(params![
                    keyword,
                    scraped_at,
                    row.title,
                    row.author,
                    row.score,
                    row.url,
                    row.answer_count,
                    row.is_answered,
                    row.view_count,
                    row.creation_date,
                    row.tags,
                ])?;
            }
        }
        tx.commit()?;
        info!(keyword, count = rows.len(), "Appended scraped rows");
        Ok(rows.len())
    }

    /// All rows for a keyword in insert order, keeping the first row per url.
    ///
    /// Later rescrapes of the same keyword append duplicate urls; the oldest
    /// row wins so stored history stays stable across refreshes.
    pub fn query(&self, keyword: &str) -> Result<Vec<QuestionRow>, PulseError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT keyword, scraped_at, title, author, score, url,
                    answer_count, is_answered, view_count, creation_date, tags
             FROM questions WHERE keyword = ?1 ORDER BY rowid",
        )?;
        let mut rows = stmt
            .query_map(params![keyword], map_question_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::new();
        rows.retain(|r| match &r.url {
            Some(url) => seen.insert(url.clone()),
            None => true,
        });

        debug!(keyword, count = rows.len(), "Loaded stored rows");
        Ok(rows)
    }

    /// Distinct keywords ordered by most recent scrape, newest first.
    pub fn recent_keywords(&self, limit: usize) -> Result<Vec<String>, PulseError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT keyword, MAX(scraped_at) AS last_seen
             FROM questions
             GROUP BY keyword
             ORDER BY datetime(last_seen) DESC
             LIMIT ?1",
        )?;
        let keywords = stmt
            .query_map(params![limit as i64], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keywords)
    }

    /// Discard all persisted data by removing the database file.
    ///
    /// A file that is already gone counts as success.
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    pub fn reset(&self) -> Result<(), PulseError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Removed question database");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn map_question_row(row: &rusqlite::Row) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        keyword: row.get(0)?,
        scraped_at: row.get(1)?,
        title: row.get(2)?,
        author: row.get(3)?,
        score: row.get(4)?,
        url: row.get(5)?,
        answer_count: row.get(6)?,
        is_answered: row.get(7)?,
        view_count: row.get(8)?,
        creation_date: row.get(9)?,
        tags: row.get(10)?,
    })
}
