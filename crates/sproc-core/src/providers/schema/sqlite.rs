use super::SchemaSource;
use crate::model::{ProcedureRecord, NEVER_EXECUTED};
use anyhow::Context;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;

/// Mirrors the columns of `INFORMATION_SCHEMA.ROUTINES` that the analyzer reads.
pub const ROUTINES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS routines (
  routine_schema TEXT NOT NULL DEFAULT 'dbo',
  routine_name TEXT NOT NULL,
  routine_type TEXT NOT NULL DEFAULT 'PROCEDURE',
  routine_definition TEXT,
  last_execution_time TEXT,
  PRIMARY KEY (routine_schema, routine_name)
);
"#;

const PROCEDURES_QUERY: &str = "SELECT
        routine_name,
        routine_definition,
        COALESCE(last_execution_time, ?1)
     FROM routines
     WHERE routine_type = 'PROCEDURE'
     ORDER BY routine_name";

/// Procedure catalog stored in a SQLite file.
pub struct SqliteCatalog {
    pub path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn open(&self) -> anyhow::Result<Connection> {
        if !self.path.exists() {
            anyhow::bail!("catalog database not found: {}", self.path.display());
        }
        Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("failed to open catalog {}", self.path.display()))
    }

    /// Cheap reachability check used by `doctor`: number of procedure rows.
    pub fn count_procedures(&self) -> anyhow::Result<u64> {
        let conn = self.open()?;
        let n: i64 = conn
            .query_row(
                "SELECT count(*) FROM routines WHERE routine_type = 'PROCEDURE'",
                [],
                |r| r.get(0),
            )
            .context("catalog has no readable 'routines' table")?;
        Ok(n as u64)
    }
}

impl SchemaSource for SqliteCatalog {
    fn extract(&self) -> anyhow::Result<Vec<ProcedureRecord>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(PROCEDURES_QUERY)
            .context("catalog has no readable 'routines' table")?;

        let rows = stmt.query_map([NEVER_EXECUTED], |row| {
            Ok(ProcedureRecord {
                name: row.get(0)?,
                definition: row.get(1)?,
                last_execution_time: row.get(2)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        tracing::debug!(
            event = "sproc.schema.extracted",
            source = "sqlite",
            count = out.len()
        );
        Ok(out)
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}

/// Creates the `routines` table and inserts records; used to seed catalogs.
pub fn seed_catalog(conn: &Connection, records: &[ProcedureRecord]) -> anyhow::Result<()> {
    conn.execute_batch(ROUTINES_DDL)?;
    let mut stmt = conn.prepare(
        "INSERT INTO routines(routine_name, routine_definition, last_execution_time)
         VALUES (?1, ?2, ?3)",
    )?;
    for r in records {
        let last = if r.last_execution_time == NEVER_EXECUTED {
            None
        } else {
            Some(r.last_execution_time.as_str())
        };
        stmt.execute(rusqlite::params![r.name, r.definition, last])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_procedures_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(ROUTINES_DDL).unwrap();
        conn.execute_batch(
            "INSERT INTO routines(routine_name, routine_definition, last_execution_time)
                 VALUES ('usp_b', 'SELECT 2', '2024-01-02 03:04:05');
             INSERT INTO routines(routine_name, routine_definition, last_execution_time)
                 VALUES ('usp_a', NULL, NULL);
             INSERT INTO routines(routine_name, routine_type, routine_definition)
                 VALUES ('fn_x', 'FUNCTION', 'RETURN 1');",
        )
        .unwrap();
        drop(conn);

        let procs = SqliteCatalog::new(path.clone()).extract().unwrap();
        assert_eq!(procs.len(), 2);
        assert_eq!(procs[0].name, "usp_a");
        assert_eq!(procs[0].definition, None);
        assert_eq!(procs[0].last_execution_time, NEVER_EXECUTED);
        assert_eq!(procs[1].name, "usp_b");
        assert_eq!(procs[1].last_execution_time, "2024-01-02 03:04:05");

        assert_eq!(SqliteCatalog::new(path).count_procedures().unwrap(), 2);
    }

    #[test]
    fn missing_database_is_an_error() {
        let err = SqliteCatalog::new(PathBuf::from("/nonexistent/catalog.db"))
            .extract()
            .unwrap_err();
        assert!(err.to_string().contains("catalog database not found"));
    }

    #[test]
    fn database_without_routines_table_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();

        let err = SqliteCatalog::new(path).extract().unwrap_err();
        assert!(format!("{:#}", err).contains("routines"));
    }

    #[test]
    fn seeded_catalog_round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.db");
        let mut rec = ProcedureRecord::new("usp_seed", "SELECT 1\n");
        rec.last_execution_time = "2024-05-05 00:00:00".into();
        seed_catalog(&Connection::open(&path).unwrap(), &[rec.clone()]).unwrap();

        let procs = SqliteCatalog::new(path).extract().unwrap();
        assert_eq!(procs, vec![rec]);
    }
}
