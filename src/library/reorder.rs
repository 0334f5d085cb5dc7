//! Replays drag-and-drop moves on the remote, one range-move per gesture.
//!
//! Moves are sent exactly as given, in order, each against whatever the
//! remote holds at that moment. A move is not adjusted for the moves sent
//! before it in the same batch, so a batch is only right when the client
//! already expressed every pair in the order left by the previous ones.
//! Nothing is rolled back when a move is rejected.

use log::{debug, warn};

use crate::{domain::moves::Move, library::error::LibraryError, remote::MusicService};

/// Sends every move of `moves` to the playlist, returning how many went
/// through.
pub fn apply<S: MusicService>(
    service: &S,
    playlist_id: &str,
    moves: &[Move],
) -> Result<usize, LibraryError> {
    for (applied, mv) in moves.iter().enumerate() {
        let insert_before = mv.insert_before();
        debug!(
            "playlist {playlist_id}: move {mv} as range_start={} insert_before={insert_before}",
            mv.src
        );

        if let Err(source) = service.reorder_items(playlist_id, mv.src, insert_before) {
            warn!(
                "playlist {playlist_id}: move {mv} rejected, {applied} of {} already applied",
                moves.len()
            );
            return Err(LibraryError::MovesInterrupted {
                applied,
                total: moves.len(),
                source,
            });
        }
    }
    Ok(moves.len())
}
