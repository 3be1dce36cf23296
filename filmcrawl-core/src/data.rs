use filmcrawl_scanner::FilmRecord;
use rusqlite::{Connection, OptionalExtension, Result, params};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// SQLite store for crawl sessions and the films they produced.
pub struct Database {
    conn: Connection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSession {
    pub id: String,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub status: String,
    pub start_url: String,
    pub max_films: i64,
    pub enrich: bool,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

const INSERT_FILM: &str = "INSERT OR REPLACE INTO films (
    session_id, title, genre, director, country, year, source_url,
    linked_entity_id, external_id, external_rating, crawled_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

impl Database {
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS crawl_sessions (
    id TEXT PRIMARY KEY,
    start_time INTEGER NOT NULL,
    end_time INTEGER,
    status TEXT NOT NULL CHECK(status IN ('running', 'completed', 'failed')),
    start_url TEXT NOT NULL,
    max_films INTEGER NOT NULL,
    enrich BOOLEAN NOT NULL
);

CREATE TABLE IF NOT EXISTS films (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL,
    title TEXT NOT NULL,
    genre TEXT NOT NULL,
    director TEXT NOT NULL,
    country TEXT NOT NULL,
    year TEXT NOT NULL,
    source_url TEXT NOT NULL,

    -- NULL when enrichment was off, '' when a lookup stage came back empty
    linked_entity_id TEXT,
    external_id TEXT,
    external_rating TEXT,

    crawled_at INTEGER NOT NULL,

    FOREIGN KEY(session_id) REFERENCES crawl_sessions(id) ON DELETE CASCADE,
    UNIQUE(session_id, source_url)
);

CREATE INDEX IF NOT EXISTS idx_films_session ON films(session_id);
CREATE INDEX IF NOT EXISTS idx_films_year ON films(year);
            ",
        )?;
        Ok(())
    }

    // Session management
    pub fn create_session(&self, start_url: &str, max_films: usize, enrich: bool) -> Result<String> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let timestamp = current_timestamp();

        self.conn.execute(
            "INSERT INTO crawl_sessions (id, start_time, status, start_url, max_films, enrich) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![&session_id, timestamp, "running", start_url, max_films as i64, enrich],
        )?;

        Ok(session_id)
    }

    pub fn complete_session(&self, session_id: &str) -> Result<()> {
        self.finish_session(session_id, "completed")
    }

    pub fn fail_session(&self, session_id: &str) -> Result<()> {
        self.finish_session(session_id, "failed")
    }

    fn finish_session(&self, session_id: &str, status: &str) -> Result<()> {
        let timestamp = current_timestamp();
        self.conn.execute(
            "UPDATE crawl_sessions SET status = ?1, end_time = ?2 WHERE id = ?3",
            params![status, timestamp, session_id],
        )?;
        Ok(())
    }

    pub fn get_session(&self, session_id: &str) -> Result<Option<CrawlSession>> {
        self.conn
            .query_row(
                "SELECT id, start_time, end_time, status, start_url, max_films, enrich
                 FROM crawl_sessions WHERE id = ?1",
                [session_id],
                |row| {
                    Ok(CrawlSession {
                        id: row.get(0)?,
                        start_time: row.get(1)?,
                        end_time: row.get(2)?,
                        status: row.get(3)?,
                        start_url: row.get(4)?,
                        max_films: row.get(5)?,
                        enrich: row.get(6)?,
                    })
                },
            )
            .optional()
    }

    // Film records

    /// Store a film. Re-inserting the same source URL within a session
    /// replaces the earlier row.
    pub fn insert_film(&self, session_id: &str, film: &FilmRecord) -> Result<i64> {
        self.conn.execute(
            INSERT_FILM,
            params![
                session_id,
                &film.title,
                &film.genre,
                &film.director,
                &film.country,
                &film.year,
                &film.source_url,
                film.linked_entity_id.as_deref(),
                film.external_id.as_deref(),
                film.external_rating.as_deref(),
                current_timestamp(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn insert_films(&mut self, session_id: &str, films: &[FilmRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_FILM)?;
            let timestamp = current_timestamp();
            for film in films {
                stmt.execute(params![
                    session_id,
                    &film.title,
                    &film.genre,
                    &film.director,
                    &film.country,
                    &film.year,
                    &film.source_url,
                    film.linked_entity_id.as_deref(),
                    film.external_id.as_deref(),
                    film.external_rating.as_deref(),
                    timestamp,
                ])?;
            }
        }
        tx.commit()?;
        Ok(films.len())
    }

    pub fn get_films_by_session(&self, session_id: &str) -> Result<Vec<FilmRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT title, genre, director, country, year, source_url,
                    linked_entity_id, external_id, external_rating
             FROM films WHERE session_id = ?1 ORDER BY id",
        )?;

        let films = stmt
            .query_map([session_id], |row| {
                Ok(FilmRecord {
                    title: row.get(0)?,
                    genre: row.get(1)?,
                    director: row.get(2)?,
                    country: row.get(3)?,
                    year: row.get(4)?,
                    source_url: row.get(5)?,
                    linked_entity_id: row.get(6)?,
                    external_id: row.get(7)?,
                    external_rating: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;

        Ok(films)
    }

    pub fn count_films(&self, session_id: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM films WHERE session_id = ?1",
            [session_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
