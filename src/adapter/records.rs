use serde_json::Value;

use crate::{
    adapter::{Record, RecordMapper, error::AdapterError},
    domain::{
        track::{Playlist, Track},
        user::User,
    },
};

impl RecordMapper for User {
    const REQUIRED: &'static [&'static str] = &["id", "external_urls.spotify"];
    const OPTIONAL: &'static [&'static str] = &["display_name"];

    fn build(record: Record<'_>) -> Result<Self, AdapterError> {
        let id = record.string("id")?;
        // accounts without a display name show their id instead
        let name = record.opt_string("display_name")?.unwrap_or_else(|| id.clone());
        Ok(User {
            id,
            name,
            link: record.string("external_urls.spotify")?,
        })
    }
}

/// A playlist without its tracks, plus how many tracks it holds.
#[derive(Debug)]
pub struct PlaylistHeader {
    pub playlist: Playlist,
    pub total: usize,
}

impl RecordMapper for PlaylistHeader {
    const REQUIRED: &'static [&'static str] = &[
        "id",
        "name",
        "external_urls.spotify",
        "owner.id",
        "owner.external_urls.spotify",
        "tracks.total",
    ];
    const OPTIONAL: &'static [&'static str] = &["description", "owner.display_name"];

    fn build(record: Record<'_>) -> Result<Self, AdapterError> {
        let owner_id = record.string("owner.id")?;
        let owner = User {
            name: record
                .opt_string("owner.display_name")?
                .unwrap_or_else(|| owner_id.clone()),
            id: owner_id,
            link: record.string("owner.external_urls.spotify")?,
        };
        Ok(PlaylistHeader {
            playlist: Playlist {
                id: record.string("id")?,
                name: record.string("name")?,
                description: record.opt_string("description")?.unwrap_or_default(),
                link: record.string("external_urls.spotify")?,
                owner,
                tracks: None,
            },
            total: record.count("tracks.total")?,
        })
    }
}

/// One playlist entry. Only the id of whoever added it comes with the entry.
#[derive(Debug)]
pub struct TrackItem {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub added_by: String,
    pub preview_url: Option<String>,
    pub link: String,
}

impl TrackItem {
    pub fn into_track(self, added_by: User) -> Track {
        Track {
            name: self.name,
            artists: self.artists,
            album: self.album,
            added_by,
            preview_url: self.preview_url,
            link: self.link,
        }
    }
}

impl RecordMapper for TrackItem {
    const REQUIRED: &'static [&'static str] = &[
        "added_by.id",
        "track.name",
        "track.external_urls.spotify",
        "track.album.name",
    ];
    const OPTIONAL: &'static [&'static str] = &["track.preview_url"];
    const LISTS: &'static [(&'static str, &'static str)] = &[("track.artists", "name")];

    fn build(record: Record<'_>) -> Result<Self, AdapterError> {
        Ok(TrackItem {
            name: record.string("track.name")?,
            artists: record.collect("track.artists", "name")?,
            album: record.string("track.album.name")?,
            added_by: record.string("added_by.id")?,
            preview_url: record.opt_string("track.preview_url")?,
            link: record.string("track.external_urls.spotify")?,
        })
    }
}

/// Envelope around every paginated listing.
#[derive(Debug)]
pub struct Page {
    pub items: Vec<Value>,
    pub total: usize,
}

impl Page {
    /// Field selection for a page of `T` records.
    pub fn fields_of<T: RecordMapper>() -> String {
        format!("total,{}", T::fields_under("items"))
    }
}

impl RecordMapper for Page {
    const REQUIRED: &'static [&'static str] = &["items", "total"];

    fn build(record: Record<'_>) -> Result<Self, AdapterError> {
        Ok(Page {
            items: record.list("items")?.to_vec(),
            total: record.count("total")?,
        })
    }
}
