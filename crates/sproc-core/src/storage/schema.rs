pub const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS llm_cache (
  key TEXT PRIMARY KEY,
  stage TEXT NOT NULL,
  procedure TEXT NOT NULL,
  provider TEXT NOT NULL,
  model TEXT NOT NULL,
  created_at TEXT NOT NULL,
  response_text TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS runs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  source TEXT NOT NULL,
  started_at TEXT NOT NULL,
  finished_at TEXT,
  status TEXT NOT NULL,
  procedures INTEGER,
  flagged INTEGER
);
"#;
