use std::path::Path;

use anyhow::anyhow;
use chrono::{DateTime, Local};
use rusqlite::Connection;

use crate::{
    config::SessionsConfig,
    session::{error::SessionError, schema},
};

pub type SecondsSinceUnix = i64;

fn open_in_memory() -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open_in_memory()
}

fn open_from_file(path: &Path) -> Result<rusqlite::Connection, rusqlite::Error> {
    Connection::open(path)
}

pub fn open(config: &SessionsConfig) -> Result<rusqlite::Connection, SessionError> {
    let db = if config.in_memory {
        open_in_memory()?
    } else {
        let path = config.path.as_deref().ok_or(SessionError::NoPath)?;
        open_from_file(path)?
    };
    schema::init(&db)?;
    Ok(db)
}

/// converts number of seconds since unix epoch to local date time
pub fn i64_seconds_to_local_time(since_unix: i64) -> anyhow::Result<DateTime<Local>> {
    let datetime = DateTime::from_timestamp_secs(since_unix).ok_or(anyhow!(
        "failed to convert {since_unix} s timestamp to datetime"
    ))?;

    Ok(DateTime::from(datetime))
}
