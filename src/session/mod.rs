//! OAuth tokens cached per visitor.
//!
//! The visitor is known by the opaque id kept in the session cookie; that id
//! is the key of the token table and nothing else about the visitor is
//! stored.

use rusqlite::{OptionalExtension, params};

use crate::{
    config::SessionsConfig,
    session::{
        db::SecondsSinceUnix,
        error::SessionError,
        schema::{columns::*, tables::*},
    },
};

pub mod db;
pub mod error;
pub(crate) mod schema;

/// Tokens this close to expiry are treated as expired already.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub expires_at: SecondsSinceUnix,
}

impl Token {
    pub fn is_valid(&self, now: SecondsSinceUnix) -> bool {
        now + EXPIRY_MARGIN_SECS < self.expires_at
    }
}

pub fn now() -> SecondsSinceUnix {
    chrono::Utc::now().timestamp()
}

pub struct TokenStore {
    pub(crate) db: rusqlite::Connection,
}

impl TokenStore {
    pub fn new(config: &SessionsConfig) -> Result<Self, SessionError> {
        Ok(Self::from_existing_conn(db::open(config)?))
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// Stores the token of a session, replacing any previous one.
    pub fn save(&self, session_id: &str, token: &Token) -> Result<(), SessionError> {
        self.db.execute(
            &format!(
                "INSERT OR REPLACE INTO {TOKENS}
                 ({SESSION_ID}, {ACCESS_TOKEN}, {REFRESH_TOKEN}, {SCOPE}, {EXPIRES_AT})
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ),
            params![
                session_id,
                token.access_token,
                token.refresh_token,
                token.scope,
                token.expires_at
            ],
        )?;
        Ok(())
    }

    pub fn load(&self, session_id: &str) -> Result<Option<Token>, SessionError> {
        let token = self
            .db
            .query_row(
                &format!(
                    "SELECT {ACCESS_TOKEN}, {REFRESH_TOKEN}, {SCOPE}, {EXPIRES_AT}
                     FROM {TOKENS} WHERE {SESSION_ID} = ?1"
                ),
                params![session_id],
                |row| {
                    Ok(Token {
                        access_token: row.get(0)?,
                        refresh_token: row.get(1)?,
                        scope: row.get(2)?,
                        expires_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(token)
    }

    /// Token of the session if it is still usable at `now`.
    pub fn valid_token(
        &self,
        session_id: &str,
        now: SecondsSinceUnix,
    ) -> Result<Option<Token>, SessionError> {
        Ok(self.load(session_id)?.filter(|t| t.is_valid(now)))
    }

    /// returns whether the session had a token
    pub fn forget(&self, session_id: &str) -> Result<bool, SessionError> {
        let removed = self.db.execute(
            &format!("DELETE FROM {TOKENS} WHERE {SESSION_ID} = ?1"),
            params![session_id],
        )?;
        Ok(removed > 0)
    }

    /// All cached tokens, soonest expiry first
    pub fn list(&self) -> Result<Vec<(String, Token)>, SessionError> {
        let mut stmt = self.db.prepare(&format!(
            "SELECT {SESSION_ID}, {ACCESS_TOKEN}, {REFRESH_TOKEN}, {SCOPE}, {EXPIRES_AT}
             FROM {TOKENS} ORDER BY {EXPIRES_AT}, {SESSION_ID}"
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    Token {
                        access_token: row.get(1)?,
                        refresh_token: row.get(2)?,
                        scope: row.get(3)?,
                        expires_at: row.get(4)?,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Drops every token that is no longer valid at `now`, returns how many.
    pub fn purge_expired(&self, now: SecondsSinceUnix) -> Result<usize, SessionError> {
        let removed = self.db.execute(
            &format!("DELETE FROM {TOKENS} WHERE {EXPIRES_AT} <= ?1"),
            params![now + EXPIRY_MARGIN_SECS],
        )?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TokenStore {
        TokenStore::new(&SessionsConfig {
            in_memory: true,
            path: None,
        })
        .unwrap()
    }

    fn token(access: &str, expires_at: i64) -> Token {
        Token {
            access_token: access.into(),
            refresh_token: Some(format!("{access}-refresh")),
            scope: "playlist-read-private".into(),
            expires_at,
        }
    }

    #[test]
    fn save_then_load() -> anyhow::Result<()> {
        let store = store();
        store.save("visitor", &token("a", 1000))?;

        assert_eq!(store.load("visitor")?, Some(token("a", 1000)));
        assert_eq!(store.load("someone-else")?, None);
        Ok(())
    }

    #[test]
    fn save_replaces_previous_token() -> anyhow::Result<()> {
        let store = store();
        store.save("visitor", &token("a", 1000))?;
        store.save("visitor", &token("b", 2000))?;

        assert_eq!(store.load("visitor")?, Some(token("b", 2000)));
        assert_eq!(store.list()?.len(), 1);
        Ok(())
    }

    #[test]
    fn token_close_to_expiry_is_not_valid() -> anyhow::Result<()> {
        let store = store();
        store.save("visitor", &token("a", 1000))?;

        assert!(store.valid_token("visitor", 900)?.is_some());
        assert!(store.valid_token("visitor", 1000 - EXPIRY_MARGIN_SECS)?.is_none());
        assert!(store.valid_token("visitor", 5000)?.is_none());
        Ok(())
    }

    #[test]
    fn forget_removes_token() -> anyhow::Result<()> {
        let store = store();
        store.save("visitor", &token("a", 1000))?;

        assert!(store.forget("visitor")?);
        assert!(!store.forget("visitor")?);
        assert_eq!(store.load("visitor")?, None);
        Ok(())
    }

    #[test]
    fn purge_drops_only_expired_tokens() -> anyhow::Result<()> {
        let store = store();
        store.save("old", &token("a", 100))?;
        store.save("almost", &token("b", 530))?;
        store.save("fresh", &token("c", 10_000))?;

        assert_eq!(store.purge_expired(500)?, 2);

        let left: Vec<String> = store.list()?.into_iter().map(|(id, _)| id).collect();
        assert_eq!(left, vec!["fresh"]);
        Ok(())
    }

    #[test]
    fn list_orders_by_expiry() -> anyhow::Result<()> {
        let store = store();
        store.save("late", &token("a", 300))?;
        store.save("early", &token("b", 100))?;

        let ids: Vec<String> = store.list()?.into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["early", "late"]);
        Ok(())
    }
}
