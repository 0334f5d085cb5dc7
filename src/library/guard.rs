use crate::{
    domain::{track::Playlist, user::User},
    library::error::LibraryError,
};

/// Only the owner of a playlist may look inside it or reorder it.
pub fn ensure_owner(identity: &User, playlist: &Playlist) -> Result<(), LibraryError> {
    if playlist.owner == *identity {
        Ok(())
    } else {
        Err(LibraryError::Forbidden(playlist.id.clone()))
    }
}
