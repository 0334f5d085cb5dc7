//! Playlist operations offered to the HTTP layer.
//!
//! A [`Library`] lives for one request and is bound to that request's
//! credential, so the signed-in user it memoizes can never leak to another
//! visitor.

use std::{cell::OnceCell, collections::HashMap};

use log::info;

use crate::{
    adapter::{
        RecordMapper,
        records::{Page, PlaylistHeader, TrackItem},
    },
    domain::{moves::Move, track::Playlist, user::User},
    library::{error::LibraryError, guard::ensure_owner},
    remote::{MusicService, PLAYLISTS_PAGE_SIZE, TRACKS_PAGE_SIZE},
};

pub mod error;
pub mod guard;
pub mod pagination;
pub mod reorder;

pub struct Library<S> {
    service: S,
    identity: OnceCell<User>,
}

impl<S: MusicService> Library<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            identity: OnceCell::new(),
        }
    }

    /// The signed-in user, asked from the remote at most once.
    pub fn identity(&self) -> Result<&User, LibraryError> {
        if let Some(user) = self.identity.get() {
            return Ok(user);
        }
        let record = self
            .service
            .current_user()
            .map_err(|e| LibraryError::from_remote(e, "current user"))?;
        let user = User::from_value(&record)?;
        Ok(self.identity.get_or_init(|| user))
    }

    /// Playlists owned by `identity`, in the order the remote lists them.
    /// Followed playlists of other users are left out.
    pub fn list_owned_playlists(&self, identity: &User) -> Result<Vec<Playlist>, LibraryError> {
        let fetch_page = |offset, limit| -> Result<Page, LibraryError> {
            let record = self
                .service
                .owned_playlists(offset, limit)
                .map_err(|e| LibraryError::from_remote(e, "playlists"))?;
            Ok(Page::from_value(&record)?)
        };

        let first = fetch_page(0, PLAYLISTS_PAGE_SIZE)?;
        let mut first_items = Some(first.items);
        let records = pagination::assemble(first.total, PLAYLISTS_PAGE_SIZE, |offset, limit| {
            match first_items.take() {
                Some(items) if offset == 0 => Ok(items),
                _ => Ok(fetch_page(offset, limit)?.items),
            }
        })?;

        let mut owned = Vec::new();
        for record in &records {
            let PlaylistHeader { playlist, .. } = PlaylistHeader::from_value(record)?;
            if playlist.owner == *identity {
                owned.push(playlist);
            }
        }
        Ok(owned)
    }

    /// Playlist with every track, for its owner only.
    pub fn playlist_detail(
        &self,
        identity: &User,
        playlist_id: &str,
    ) -> Result<Playlist, LibraryError> {
        let PlaylistHeader {
            mut playlist,
            total,
        } = self.owned_header(identity, playlist_id)?;

        let fields = Page::fields_of::<TrackItem>();
        let records = pagination::assemble(total, TRACKS_PAGE_SIZE, |offset, limit| {
            let record = self
                .service
                .playlist_items(playlist_id, offset, limit, &fields)
                .map_err(|e| LibraryError::from_remote(e, &format!("playlist {playlist_id}")))?;
            Ok(Page::from_value(&record)?.items)
        })?;

        let mut users: HashMap<String, User> = HashMap::new();
        users.insert(identity.id.clone(), identity.clone());

        let mut tracks = Vec::with_capacity(records.len());
        for record in &records {
            let item = TrackItem::from_value(record)?;
            let added_by = match users.get(&item.added_by) {
                Some(user) => user.clone(),
                None => {
                    let user = self.lookup_user(&item.added_by)?;
                    users.insert(user.id.clone(), user.clone());
                    user
                }
            };
            tracks.push(item.into_track(added_by));
        }

        playlist.tracks = Some(tracks);
        Ok(playlist)
    }

    /// Replays `moves` on the playlist, see [`reorder::apply`].
    pub fn apply_moves(
        &self,
        identity: &User,
        playlist_id: &str,
        moves: &[Move],
    ) -> Result<usize, LibraryError> {
        self.owned_header(identity, playlist_id)?;
        let applied = reorder::apply(&self.service, playlist_id, moves)?;
        info!("playlist {playlist_id}: {applied} moves applied");
        Ok(applied)
    }

    /// Fetches the playlist without its tracks and checks ownership.
    fn owned_header(
        &self,
        identity: &User,
        playlist_id: &str,
    ) -> Result<PlaylistHeader, LibraryError> {
        let record = self
            .service
            .playlist(playlist_id, &PlaylistHeader::fields())
            .map_err(|e| LibraryError::from_remote(e, &format!("playlist {playlist_id}")))?;
        let header = PlaylistHeader::from_value(&record)?;
        ensure_owner(identity, &header.playlist)?;
        Ok(header)
    }

    fn lookup_user(&self, user_id: &str) -> Result<User, LibraryError> {
        let record = self.service.user(user_id).map_err(|e| match e.status() {
            // a vanished contributor is a remote inconsistency, not a missing playlist
            Some(404) => LibraryError::Upstream(e),
            _ => LibraryError::from_remote(e, &format!("user {user_id}")),
        })?;
        Ok(User::from_value(&record)?)
    }
}
