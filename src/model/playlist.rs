//! Playlists on the plain base store

use crate::entity;
use crate::store::Store;

entity! {
    /// An ordered list of track keys. No secondary index; lookups are by
    /// key only.
    pub struct Playlist {
        key id: RowId,
        name: String,
        description: String,
        tracks: Vec<u64>,
    }
}

pub type PlaylistStore = Store<Playlist>;
