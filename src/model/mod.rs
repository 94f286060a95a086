//! Bundled entity types and their stores
//!
//! Two of the three entities carry a secondary index: `User` keeps a unique
//! name-to-key map, `Track` keeps a path-presence set. `Playlist` runs on
//! the plain base store.

pub mod playlist;
pub mod track;
pub mod user;

pub use playlist::{Playlist, PlaylistStore};
pub use track::{PathIndex, Track, TrackStore};
pub use user::{NameIndex, Permission, User, UserStore};
