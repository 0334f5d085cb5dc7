//! In-memory stand-in for the streaming service, used by tests.
//!
//! Records every call so tests can check what was sent over the wire.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use serde_json::{Value, json};

use crate::remote::{Connector, MusicService, error::RemoteError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentUser,
    User(String),
    OwnedPlaylists { offset: usize, limit: usize },
    Playlist(String),
    PlaylistItems { id: String, offset: usize, limit: usize },
    Reorder { id: String, range_start: usize, insert_before: usize },
}

#[derive(Debug, Clone)]
pub struct FakePlaylist {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub tracks: Vec<String>,
}

#[derive(Default)]
pub struct FakeState {
    /// access token -> user id
    pub tokens: HashMap<String, String>,
    pub users: Vec<String>,
    pub playlists: Vec<FakePlaylist>,
    pub calls: Vec<Call>,
    /// zero-based index among reorder calls that the remote rejects
    pub reject_reorder_at: Option<usize>,
    /// drop the last entry of every track page
    pub short_pages: bool,
    /// report every track as added by this user instead of the owner
    pub contributor: Option<String>,
    /// answer profile lookups with 401, as for a token revoked mid-request
    pub refuse_user_lookups: bool,
    pub reorders_seen: usize,
}

/// One fake service shared by every connection, like the real remote.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
}

pub struct FakeClient {
    state: Arc<Mutex<FakeState>>,
    token: String,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: &str, user_id: &str) -> Self {
        {
            let mut state = self.state();
            state.tokens.insert(token.to_string(), user_id.to_string());
            state.users.push(user_id.to_string());
        }
        self
    }

    pub fn with_playlist(self, id: &str, owner: &str, tracks: &[&str]) -> Self {
        self.state().playlists.push(FakePlaylist {
            id: id.to_string(),
            name: format!("{id} name"),
            owner: owner.to_string(),
            tracks: tracks.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn client(&self, token: &str) -> FakeClient {
        FakeClient {
            state: Arc::clone(&self.state),
            token: token.to_string(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn tracks(&self, playlist_id: &str) -> Vec<String> {
        self.state()
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .map(|p| p.tracks.clone())
            .unwrap_or_default()
    }
}

impl Connector for FakeRemote {
    type Service = FakeClient;

    fn connect(&self, access_token: &str) -> FakeClient {
        self.client(access_token)
    }
}

fn not_found(what: &str) -> RemoteError {
    RemoteError::Status {
        status: 404,
        message: format!("{what} not found"),
    }
}

fn user_record(id: &str) -> Value {
    json!({
        "id": id,
        "display_name": id.to_uppercase(),
        "external_urls": { "spotify": format!("https://open.spotify.com/user/{id}") },
    })
}

fn playlist_record(playlist: &FakePlaylist) -> Value {
    json!({
        "id": playlist.id,
        "name": playlist.name,
        "description": null,
        "external_urls": { "spotify": format!("https://open.spotify.com/playlist/{}", playlist.id) },
        "owner": user_record(&playlist.owner),
        "tracks": { "total": playlist.tracks.len() },
    })
}

fn item_record(track: &str, added_by: &str) -> Value {
    json!({
        "added_by": { "id": added_by },
        "track": {
            "name": track,
            "external_urls": { "spotify": format!("https://open.spotify.com/track/{track}") },
            "album": { "name": format!("{track} album") },
            "artists": [ { "name": format!("{track} artist") }, { "name": "Various" } ],
            "preview_url": null,
        },
    })
}

fn page(items: Vec<Value>, total: usize) -> Value {
    json!({ "items": items, "total": total })
}

impl FakeClient {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl MusicService for FakeClient {
    fn current_user(&self) -> Result<Value, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::CurrentUser);
        match state.tokens.get(&self.token) {
            Some(id) => Ok(user_record(id)),
            None => Err(RemoteError::Status {
                status: 401,
                message: "The access token expired".into(),
            }),
        }
    }

    fn user(&self, user_id: &str) -> Result<Value, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::User(user_id.to_string()));
        if state.refuse_user_lookups {
            return Err(RemoteError::Status {
                status: 401,
                message: "The access token expired".into(),
            });
        }
        if state.users.iter().any(|u| u == user_id) {
            Ok(user_record(user_id))
        } else {
            Err(not_found("user"))
        }
    }

    fn owned_playlists(&self, offset: usize, limit: usize) -> Result<Value, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::OwnedPlaylists { offset, limit });
        let items = state
            .playlists
            .iter()
            .skip(offset)
            .take(limit)
            .map(playlist_record)
            .collect();
        Ok(page(items, state.playlists.len()))
    }

    fn playlist(&self, playlist_id: &str, _fields: &str) -> Result<Value, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::Playlist(playlist_id.to_string()));
        state
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .map(playlist_record)
            .ok_or_else(|| not_found("playlist"))
    }

    fn playlist_items(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
        _fields: &str,
    ) -> Result<Value, RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::PlaylistItems {
            id: playlist_id.to_string(),
            offset,
            limit,
        });
        let short = state.short_pages;
        let contributor = state.contributor.clone();
        let playlist = state
            .playlists
            .iter()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found("playlist"))?;
        let mut items: Vec<Value> = playlist
            .tracks
            .iter()
            .skip(offset)
            .take(limit)
            .map(|t| item_record(t, contributor.as_deref().unwrap_or(&playlist.owner)))
            .collect();
        if short {
            items.pop();
        }
        Ok(page(items, playlist.tracks.len()))
    }

    fn reorder_items(
        &self,
        playlist_id: &str,
        range_start: usize,
        insert_before: usize,
    ) -> Result<(), RemoteError> {
        let mut state = self.state();
        state.calls.push(Call::Reorder {
            id: playlist_id.to_string(),
            range_start,
            insert_before,
        });
        let seen = state.reorders_seen;
        state.reorders_seen += 1;
        if state.reject_reorder_at == Some(seen) {
            return Err(RemoteError::Status {
                status: 502,
                message: "Bad gateway".into(),
            });
        }

        let playlist = state
            .playlists
            .iter_mut()
            .find(|p| p.id == playlist_id)
            .ok_or_else(|| not_found("playlist"))?;
        let len = playlist.tracks.len();
        if range_start >= len || insert_before > len {
            return Err(RemoteError::Status {
                status: 400,
                message: "Index out of bounds".into(),
            });
        }

        // Same semantics as the real endpoint: insert_before counts positions
        // of the list before the move, the moved entry is pulled out first.
        let entry = playlist.tracks.remove(range_start);
        let at = if insert_before > range_start {
            insert_before - 1
        } else {
            insert_before
        };
        playlist.tracks.insert(at, entry);
        Ok(())
    }
}
