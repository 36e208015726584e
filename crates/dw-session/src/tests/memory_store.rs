use crate::{MemoryStore, ROLE_KEY, SessionStore, TOKEN_KEY};

#[test]
fn given_empty_store_when_get_then_none() {
    let store = MemoryStore::new();

    assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    assert!(store.is_empty());
}

#[test]
fn given_entries_when_set_all_then_all_readable() {
    let store = MemoryStore::new();

    store
        .set_all(&[(TOKEN_KEY, "tok"), (ROLE_KEY, "analyst")])
        .unwrap();

    assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok"));
    assert_eq!(store.get(ROLE_KEY).unwrap().as_deref(), Some("analyst"));
}

#[test]
fn given_entries_when_remove_all_then_gone_and_missing_keys_ignored() {
    let store = MemoryStore::with_entries(&[(TOKEN_KEY, "tok"), (ROLE_KEY, "user")]);

    store.remove_all(&[TOKEN_KEY, ROLE_KEY, "absent"]).unwrap();

    assert!(store.is_empty());
}
