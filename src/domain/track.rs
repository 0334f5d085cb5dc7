use serde::Serialize;

use super::user::User;

/// Represent a playlist owned by some user
#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub owner: User,
    /// `None` until the track listing has been fetched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<Vec<Track>>,
}

/// One entry of a playlist.
///
/// Entries have no identity of their own: the same song may sit in a
/// playlist twice, so an entry is addressed by its position.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub added_by: User,
    pub preview_url: Option<String>,
    pub link: String,
}
