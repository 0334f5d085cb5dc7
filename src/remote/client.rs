//! Spotify Web API client backed by `ureq`.

use std::time::Duration;

use log::warn;
use serde_json::{Value, json};

use crate::{
    config::ApiConfig,
    remote::{Connector, MusicService, error::RemoteError},
};

/// Shares one connection pool between all the per-request clients.
#[derive(Clone)]
pub struct SpotifyConnector {
    agent: ureq::Agent,
    config: ApiConfig,
}

impl SpotifyConnector {
    pub fn new(config: ApiConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(5).min(timeout))
            .timeout_read(timeout)
            .timeout_write(timeout)
            .build();
        Self { agent, config }
    }
}

impl Connector for SpotifyConnector {
    type Service = SpotifyClient;

    fn connect(&self, access_token: &str) -> SpotifyClient {
        SpotifyClient {
            agent: self.agent.clone(),
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            bearer: format!("Bearer {access_token}"),
            read_retries: self.config.read_retries,
        }
    }
}

pub struct SpotifyClient {
    agent: ureq::Agent,
    base_url: String,
    bearer: String,
    read_retries: u32,
}

impl SpotifyClient {
    /// GET with retries on transient failures. Only used for reads.
    fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, RemoteError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 0;
        loop {
            let mut request = self
                .agent
                .get(&url)
                .set("Authorization", &self.bearer);
            for (key, value) in query {
                request = request.query(key, value);
            }

            let err = match request.call() {
                Ok(response) => {
                    return response
                        .into_json()
                        .map_err(|e| RemoteError::Decode(format!("GET {path}: {e}")));
                }
                Err(e) => RemoteError::from(e),
            };

            if attempt < self.read_retries && err.is_transient() {
                attempt += 1;
                warn!("GET {path} failed ({err}), retry {attempt}/{}", self.read_retries);
                continue;
            }
            return Err(err);
        }
    }
}

impl MusicService for SpotifyClient {
    fn current_user(&self) -> Result<Value, RemoteError> {
        self.get_json("/me", &[])
    }

    fn user(&self, user_id: &str) -> Result<Value, RemoteError> {
        self.get_json(&format!("/users/{}", urlencoding::encode(user_id)), &[])
    }

    fn owned_playlists(&self, offset: usize, limit: usize) -> Result<Value, RemoteError> {
        self.get_json(
            "/me/playlists",
            &[("offset", offset.to_string()), ("limit", limit.to_string())],
        )
    }

    fn playlist(&self, playlist_id: &str, fields: &str) -> Result<Value, RemoteError> {
        self.get_json(
            &format!("/playlists/{}", urlencoding::encode(playlist_id)),
            &[("fields", fields.to_string())],
        )
    }

    fn playlist_items(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
        fields: &str,
    ) -> Result<Value, RemoteError> {
        self.get_json(
            &format!("/playlists/{}/tracks", urlencoding::encode(playlist_id)),
            &[
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
                ("fields", fields.to_string()),
            ],
        )
    }

    /// Not retried: replaying a move that did go through would reorder twice.
    fn reorder_items(
        &self,
        playlist_id: &str,
        range_start: usize,
        insert_before: usize,
    ) -> Result<(), RemoteError> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.base_url,
            urlencoding::encode(playlist_id)
        );
        self.agent
            .put(&url)
            .set("Authorization", &self.bearer)
            .send_json(json!({
                "range_start": range_start,
                "insert_before": insert_before,
                "range_length": 1,
            }))?;
        Ok(())
    }
}
