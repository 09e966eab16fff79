use anyhow::Context;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Local working database: LLM response cache and run history.
#[derive(Clone)]
pub struct Store {
    pub conn: Arc<Mutex<Connection>>,
}

pub struct StoreStats {
    pub runs: u64,
    pub cached_responses: u64,
    pub last_run_id: Option<i64>,
    pub last_run_at: Option<String>,
}

impl Store {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path).context("failed to open sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory sqlite db")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection mutex poisoned"))
    }

    pub fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(crate::storage::schema::DDL)?;
        Ok(())
    }

    pub fn create_run(&self, source: &str) -> anyhow::Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO runs(source, started_at, status) VALUES (?1, ?2, ?3)",
            params![source, now_rfc3339(), "running"],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn finalize_run(
        &self,
        run_id: i64,
        status: &str,
        procedures: usize,
        flagged: usize,
    ) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, procedures = ?3, flagged = ?4
             WHERE id = ?5",
            params![status, now_rfc3339(), procedures as i64, flagged as i64, run_id],
        )?;
        Ok(())
    }

    pub fn stats(&self) -> anyhow::Result<StoreStats> {
        let conn = self.lock()?;
        let runs: i64 = conn.query_row("SELECT count(*) FROM runs", [], |r| r.get(0))?;
        let cached: i64 = conn.query_row("SELECT count(*) FROM llm_cache", [], |r| r.get(0))?;
        let last: Option<(i64, String)> = conn
            .query_row(
                "SELECT id, started_at FROM runs ORDER BY id DESC LIMIT 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

        Ok(StoreStats {
            runs: runs as u64,
            cached_responses: cached as u64,
            last_run_id: last.as_ref().map(|(id, _)| *id),
            last_run_at: last.map(|(_, at)| at),
        })
    }
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
