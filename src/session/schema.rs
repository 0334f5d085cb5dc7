use rusqlite::Connection;

pub mod tables {
    pub const TOKENS: &str = "tokens";

    #[cfg(test)]
    pub const ALL_TABLES: &[&str] = &[TOKENS];
}

pub mod columns {
    pub const SESSION_ID: &str = "session_id";
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const SCOPE: &str = "scope";
    pub const EXPIRES_AT: &str = "expires_at";
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tokens (
    session_id TEXT PRIMARY KEY,
    access_token TEXT NOT NULL,
    refresh_token TEXT,
    scope TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
