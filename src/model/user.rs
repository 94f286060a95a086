//! User accounts with a unique name index

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, RowId};
use crate::store::{SecondaryIndex, Store};
use crate::{Error, Result, entity, text_encoded};

/// Account privilege level.
///
/// Greater privilege compares lower, so `permission <= Permission::Regular`
/// reads as "may upload".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// May create accounts
    Admin,
    /// May create playlists, upload tracks, edit their own playlists
    #[default]
    Regular,
    ReadOnly,
}

text_encoded!(Permission);

entity! {
    /// A registered account. Names are unique; the password is stored
    /// salted and hashed by the authentication layer before it gets here.
    pub struct User {
        key id: RowId,
        name: String,
        signature: String,
        salt: String,
        password: String,
        created_playlists: Vec<u64>,
        saved_playlists: Vec<u64>,
        permission: Permission,
    }
}

/// Unique name-to-key index over the user map
#[derive(Debug, Default)]
pub struct NameIndex {
    by_name: BTreeMap<String, RowId>,
}

impl SecondaryIndex<User> for NameIndex {
    fn insert(&mut self, row: &User) {
        self.by_name.insert(row.name.clone(), row.id);
    }

    fn remove(&mut self, row: &User) {
        self.by_name.remove(&row.name);
    }
}

/// The user store: write-through cache plus name lookup
pub type UserStore = Store<User, NameIndex>;

impl Store<User, NameIndex> {
    /// Key of the user with this name, if any
    pub fn id_by_name(&self, name: &str) -> Option<RowId> {
        self.with_read(|_, index| index.by_name.get(name).copied())
    }

    /// Whether the name is already taken
    pub fn name_taken(&self, name: &str) -> bool {
        self.id_by_name(name).is_some()
    }

    /// Look up a user by name
    pub fn user_by_name(&self, name: &str) -> Result<User> {
        let id = self.id_by_name(name).ok_or(Error::NotFound {
            table: User::TABLE,
            id: RowId::UNSET,
        })?;
        self.at(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> User {
        User {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_name_index_follows_add() {
        let store = UserStore::open_in_memory().unwrap();
        let stored = store.add(user("hx")).unwrap();

        assert_eq!(store.id_by_name("hx"), Some(stored.id));
        assert!(store.name_taken("hx"));
        assert!(!store.name_taken("nobody"));
    }

    #[test]
    fn test_rename_moves_index_entry() {
        let store = UserStore::open_in_memory().unwrap();
        let stored = store.add(user("old")).unwrap();

        let mut renamed = stored.clone();
        renamed.name = "new".into();
        store.update_strict(renamed).unwrap();

        assert_eq!(store.id_by_name("old"), None);
        assert_eq!(store.id_by_name("new"), Some(stored.id));
    }

    #[test]
    fn test_del_clears_index_entry() {
        let store = UserStore::open_in_memory().unwrap();
        let stored = store.add(user("hx")).unwrap();

        store.del(stored.id).unwrap();
        assert_eq!(store.id_by_name("hx"), None);
    }

    #[test]
    fn test_index_rebuilt_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");

        let id = {
            let store = UserStore::open(&path).unwrap();
            store.add(user("hx")).unwrap().id
        };

        let reloaded = UserStore::open(&path).unwrap();
        assert_eq!(reloaded.id_by_name("hx"), Some(id));
    }

    #[test]
    fn test_user_by_name_round_trip() {
        let store = UserStore::open_in_memory().unwrap();
        let mut hx = user("hx");
        hx.permission = Permission::Admin;
        hx.created_playlists = vec![10, 20];
        store.add(hx).unwrap();

        let found = store.user_by_name("hx").unwrap();
        assert_eq!(found.permission, Permission::Admin);
        assert_eq!(found.created_playlists, vec![10, 20]);

        assert!(matches!(
            store.user_by_name("nobody"),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn test_permission_order() {
        assert!(Permission::Admin < Permission::Regular);
        assert!(Permission::Regular < Permission::ReadOnly);
        assert_eq!(Permission::default(), Permission::Regular);
    }
}
