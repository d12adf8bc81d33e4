//! Tests for keyed observed collections.

use super::support::{Card, card, labels};
use crate::optimistic::{domain::CollectionKey, services::ObservedStore};
use crate::tenancy::domain::TeamId;
use rstest::{fixture, rstest};

#[fixture]
fn store() -> ObservedStore<Card> {
    ObservedStore::new()
}

#[rstest]
fn unknown_collection_is_empty(store: ObservedStore<Card>) {
    let snapshot = store.snapshot(CollectionKey::TeamProjects(TeamId::new()));

    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.revision, 0);
}

#[rstest]
fn every_write_bumps_the_revision(store: ObservedStore<Card>) {
    let key = CollectionKey::TeamProjects(TeamId::new());

    let ((), first) = store.modify(key, |items| items.push(card(1, "a")));
    let ((), second) = store.modify(key, |items| items.push(card(2, "b")));

    assert_eq!((first, second), (1, 2));
    assert_eq!(labels(&store.items(key)), vec!["a", "b"]);
    assert_eq!(store.find(key, &2), Some(card(2, "b")));
    assert_eq!(store.find(key, &3), None);
}

#[rstest]
fn collections_are_isolated_by_key(store: ObservedStore<Card>) {
    let first = CollectionKey::TeamProjects(TeamId::new());
    let second = CollectionKey::TeamProjects(TeamId::new());

    store.modify(first, |items| items.push(card(1, "a")));

    assert_eq!(store.items(first).len(), 1);
    assert!(store.items(second).is_empty());
}

#[rstest]
fn clones_share_collections(store: ObservedStore<Card>) {
    let key = CollectionKey::TeamProjects(TeamId::new());
    let reader = store.clone();

    store.modify(key, |items| items.push(card(1, "a")));

    assert_eq!(labels(&reader.items(key)), vec!["a"]);
}

#[rstest]
fn replace_requires_the_expected_revision(store: ObservedStore<Card>) {
    let key = CollectionKey::TeamProjects(TeamId::new());
    store.modify(key, |items| items.push(card(1, "a")));

    let stale = store.replace_if_unchanged(key, 0, vec![card(9, "stale")]);
    let current = store.replace_if_unchanged(key, 1, vec![card(2, "fresh")]);

    assert!(!stale);
    assert!(current);
    let snapshot = store.snapshot(key);
    assert_eq!(labels(&snapshot.items), vec!["fresh"]);
    assert_eq!(snapshot.revision, 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscribers_observe_writes(store: ObservedStore<Card>) {
    let key = CollectionKey::TeamProjects(TeamId::new());
    let mut updates = store.subscribe(key);
    let writer = store.clone();

    let task = tokio::spawn(async move {
        writer.modify(key, |items| items.push(card(1, "a")));
    });
    let seen = updates
        .wait_for(|snapshot| !snapshot.items.is_empty())
        .await
        .expect("store stays alive")
        .items
        .clone();
    task.await.expect("writer should finish");

    assert_eq!(labels(&seen), vec!["a"]);
}
