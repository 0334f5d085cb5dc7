//! Access to the streaming service's Web API.
//!
//! Every call returns the raw, field-selected JSON record. Turning records
//! into domain values is the job of [`crate::adapter`].

use serde_json::Value;

use crate::remote::error::RemoteError;

pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;

/// Largest page the service returns for a playlist's tracks.
pub const TRACKS_PAGE_SIZE: usize = 100;

/// Largest page the service returns when listing the caller's playlists.
pub const PLAYLISTS_PAGE_SIZE: usize = 50;

/// Calls the core needs from the streaming service.
///
/// One value is bound to one user's credential.
pub trait MusicService {
    /// the account owning the credential
    fn current_user(&self) -> Result<Value, RemoteError>;

    /// public profile of any user
    fn user(&self, user_id: &str) -> Result<Value, RemoteError>;

    /// one page of playlists followed or owned by the caller
    fn owned_playlists(&self, offset: usize, limit: usize) -> Result<Value, RemoteError>;

    fn playlist(&self, playlist_id: &str, fields: &str) -> Result<Value, RemoteError>;

    /// one page of a playlist's entries, in playlist order
    fn playlist_items(
        &self,
        playlist_id: &str,
        offset: usize,
        limit: usize,
        fields: &str,
    ) -> Result<Value, RemoteError>;

    /// Moves the single entry at `range_start` so that it lands right before
    /// the entry that sat at `insert_before` prior to the move.
    fn reorder_items(
        &self,
        playlist_id: &str,
        range_start: usize,
        insert_before: usize,
    ) -> Result<(), RemoteError>;
}

/// Builds a [`MusicService`] for the credential of the current request.
pub trait Connector {
    type Service: MusicService;

    fn connect(&self, access_token: &str) -> Self::Service;
}
