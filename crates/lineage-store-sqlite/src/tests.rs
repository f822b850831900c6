//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  io,
  path::PathBuf,
  sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use lineage_core::{
  PersonId,
  child::{ChildColumn, ChildRelationship},
  event::Event,
  graph::GenealogyGraph,
  marriage::Marriage,
  person::{Gender, Person, PersonColumn, PersonDetails},
  query::{Filter, Query},
  resource::{AvatarStore, ResourceError},
  store::{EntityManager, RelationshipManager, SingleKeyManager},
  tree::{Direction, FamilyTree},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn id(n: i64) -> PersonId { PersonId::new(n).unwrap() }

fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

fn person(n: i64, forename: &str, born: NaiveDate) -> Person {
  let details = PersonDetails {
    forename:       forename.into(),
    surname:        "Liddell".into(),
    gender:         Gender::Female,
    date_of_birth:  born,
    place_of_birth: Some("Westminster".into()),
    date_of_death:  None,
    place_of_death: None,
  };
  Person::new(id(n), details).unwrap()
}

fn link(parent: i64, child: i64) -> ChildRelationship {
  ChildRelationship::new(id(parent), id(child)).unwrap()
}

fn wedding(a: i64, b: i64) -> Marriage { Marriage::new(id(a), id(b), date(1876, 9, 1)).unwrap() }

/// Alice(1) with children Bob(2) and Carol(3); Bob has a son Dave(4).
async fn alice_family() -> SqliteStore {
  let s = store().await;
  for p in [
    person(1, "Alice", date(1852, 5, 4)),
    person(2, "Bob", date(1880, 1, 1)),
    person(3, "Carol", date(1882, 1, 1)),
    person(4, "Dave", date(1910, 1, 1)),
  ] {
    s.persons().add(p).await.unwrap();
  }
  for l in [link(1, 2), link(1, 3), link(2, 4)] {
    s.children().add(l).await.unwrap();
  }
  s
}

fn ids(people: &[Person]) -> Vec<PersonId> {
  let mut ids: Vec<_> = people.iter().map(Person::id).collect();
  ids.sort();
  ids
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;
  let alice = person(1, "Alice", date(1852, 5, 4));
  s.persons().add(alice.clone()).await.unwrap();

  let fetched = s.persons().get(id(1)).await.unwrap();
  assert_eq!(fetched, alice);
  assert_eq!(fetched.place_of_birth(), Some("Westminster"));
  assert_eq!(s.persons().count().await.unwrap(), 1);
}

#[tokio::test]
async fn missing_person_is_not_found() {
  let s = store().await;
  let err = s.persons().get(id(42)).await.unwrap_err();
  assert!(err.is_not_found());
  assert!(s.person(id(42)).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicated_id_is_multiple_results() {
  // A persons table without a primary key lets two rows share an id.
  let s = SqliteStore::open_in_memory_with(
    "CREATE TABLE persons (
       id INTEGER NOT NULL, forename TEXT NOT NULL, surname TEXT NOT NULL,
       gender_id INTEGER NOT NULL, date_of_birth TEXT NOT NULL,
       place_of_birth TEXT, date_of_death TEXT, place_of_death TEXT
     );",
  )
  .await
  .unwrap();
  s.persons().add(person(1, "Alice", date(1852, 5, 4))).await.unwrap();
  s.persons().add(person(1, "Alys", date(1852, 5, 4))).await.unwrap();

  let err = s.persons().get(id(1)).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(lineage_core::Error::MultipleResults { count: 2, .. })
  ));
}

#[tokio::test]
async fn update_person_overwrites_details() {
  let s = store().await;
  let alice = s.persons().add(person(1, "Alice", date(1852, 5, 4))).await.unwrap();

  let mut details = alice.details().clone();
  details.surname = "Hargreaves".into();
  details.date_of_death = Some(date(1934, 11, 16));
  let married = alice.with_details(details).unwrap();
  s.persons().update(id(1), married.clone()).await.unwrap();

  let fetched = s.persons().get(id(1)).await.unwrap();
  assert_eq!(fetched.surname(), "Hargreaves");
  assert!(!fetched.is_alive());
}

#[tokio::test]
async fn update_rejects_missing_and_renumbered_persons() {
  let s = store().await;
  let err = s.persons().update(id(5), person(5, "Eve", date(1900, 1, 1))).await.unwrap_err();
  assert!(err.is_not_found());

  s.persons().add(person(1, "Alice", date(1852, 5, 4))).await.unwrap();
  let err = s.persons().update(id(1), person(2, "Alice", date(1852, 5, 4))).await.unwrap_err();
  assert!(matches!(err, Error::Core(lineage_core::Error::InvalidEntity(_))));
}

#[tokio::test]
async fn next_available_id_follows_the_counter() {
  let s = store().await;
  assert_eq!(s.next_available_id().await.unwrap(), id(1));

  s.persons().add(person(7, "Gus", date(1930, 1, 1))).await.unwrap();
  assert_eq!(s.next_available_id().await.unwrap(), id(8));

  // Deleting does not rewind the counter.
  s.delete_person(id(7)).await.unwrap();
  assert_eq!(s.next_available_id().await.unwrap(), id(8));
}

#[tokio::test]
async fn query_and_delete_by_predicate() {
  let s = alice_family().await;
  let found = s
    .persons()
    .query(Query::single(Filter::equal(PersonColumn::Forename, "Carol")))
    .await
    .unwrap();
  assert_eq!(ids(&found), vec![id(3)]);

  let removed = s
    .children()
    .delete(Query::single(Filter::equal(ChildColumn::ParentId, id(1))))
    .await
    .unwrap();
  assert_eq!(removed, 2);
  assert_eq!(s.children().count().await.unwrap(), 1);
  assert_eq!(s.persons().get_all().await.unwrap().len(), 4);
}

// ─── Marriages ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn marriage_is_found_in_either_order() {
  let s = alice_family().await;
  s.persons().add(person(5, "Reginald", date(1853, 10, 13))).await.unwrap();
  s.marriages().add(wedding(5, 1)).await.unwrap();

  let forward = RelationshipManager::get(&s.marriages(), id(5), id(1)).await.unwrap();
  let backward = RelationshipManager::get(&s.marriages(), id(1), id(5)).await.unwrap();
  assert_eq!(forward, backward);
  assert_eq!(forward.ids(), (id(5), id(1)));

  let of_alice = s.marriages_of(id(1)).await.unwrap();
  assert_eq!(of_alice.len(), 1);
  assert_eq!(of_alice[0].other_spouse_id(id(1)), id(5));
  assert_eq!(ids(&s.spouses_of(id(5)).await.unwrap()), vec![id(1)]);
}

#[tokio::test]
async fn reversed_duplicate_marriage_is_rejected() {
  let s = store().await;
  s.marriages().add(wedding(1, 2)).await.unwrap();
  let err = s.marriages().add(wedding(2, 1)).await.unwrap_err();
  assert!(matches!(err, Error::Store { .. }));
  assert!(err.is_constraint_violation());
  assert_eq!(s.marriages().count().await.unwrap(), 1);
}

#[tokio::test]
async fn update_marriage_replaces_the_row() {
  let s = store().await;
  s.marriages().add(wedding(1, 2)).await.unwrap();

  let ended = wedding(2, 1).with_end_date(Some(date(1900, 1, 1))).unwrap();
  RelationshipManager::update(&s.marriages(), (id(1), id(2)), ended).await.unwrap();

  let stored = RelationshipManager::get(&s.marriages(), id(1), id(2)).await.unwrap();
  assert_eq!(stored.end_date(), Some(date(1900, 1, 1)));
  assert_eq!(s.marriages().count().await.unwrap(), 1);

  let err = RelationshipManager::update(&s.marriages(), (id(3), id(4)), wedding(3, 4))
    .await
    .unwrap_err();
  assert!(err.is_not_found());
  assert_eq!(s.marriages().count().await.unwrap(), 1);
}

#[tokio::test]
async fn bulk_replace_marriages() {
  let s = store().await;
  s.marriages().add(wedding(1, 2)).await.unwrap();
  s.marriages().add(wedding(3, 4)).await.unwrap();

  s.update_marriages(id(1), vec![wedding(5, 1), wedding(1, 6)]).await.unwrap();

  let of_one = s.marriages().for_person(id(1)).await.unwrap();
  let mut others: Vec<_> = of_one.iter().map(|m| m.other_spouse_id(id(1))).collect();
  others.sort();
  assert_eq!(others, vec![id(5), id(6)]);
  // Rows not naming person 1 are untouched.
  assert!(RelationshipManager::get(&s.marriages(), id(4), id(3)).await.is_ok());
}

// ─── Children ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bulk_replace_children_is_total() {
  let s = alice_family().await;
  let wanted = vec![link(1, 3), link(5, 1)];
  s.update_children(id(1), wanted.clone()).await.unwrap();

  let mut stored = s.children().for_person(id(1)).await.unwrap();
  stored.sort_by_key(|l| (l.parent_id(), l.child_id()));
  assert_eq!(stored, wanted);
  // Bob's own link to Dave survives.
  assert!(RelationshipManager::get(&s.children(), id(2), id(4)).await.is_ok());

  s.update_children(id(1), vec![]).await.unwrap();
  assert!(s.children().for_person(id(1)).await.unwrap().is_empty());
}

#[tokio::test]
async fn bulk_replace_rejects_unrelated_rows_before_writing() {
  let s = alice_family().await;
  let err = s.update_children(id(1), vec![link(1, 2), link(3, 4)]).await.unwrap_err();
  assert!(matches!(err, Error::Core(lineage_core::Error::InvalidEntity(_))));
  assert_eq!(s.children().for_person(id(1)).await.unwrap().len(), 2);
}

#[tokio::test]
async fn bulk_replace_children_covers_links_as_child() {
  let s = alice_family().await;
  s.update_children(id(2), vec![link(2, 4)]).await.unwrap();

  assert!(s.parents_of(id(2)).await.unwrap().is_empty());
  assert_eq!(ids(&s.children_of(id(2)).await.unwrap()), vec![id(4)]);
}

#[tokio::test]
async fn failed_bulk_replace_keeps_the_old_rows() {
  let s = alice_family().await;
  let err = s.update_children(id(1), vec![link(1, 5), link(1, 5)]).await.unwrap_err();
  assert!(matches!(err, Error::Store { .. }));
  assert!(err.is_constraint_violation());

  let mut stored = s.children().for_person(id(1)).await.unwrap();
  stored.sort_by_key(|l| (l.parent_id(), l.child_id()));
  assert_eq!(stored, vec![link(1, 2), link(1, 3)]);
}

#[tokio::test]
async fn failed_relationship_update_keeps_the_old_row() {
  let s = store().await;
  s.marriages().add(wedding(1, 2)).await.unwrap();
  s.marriages().add(wedding(3, 4)).await.unwrap();

  let err = RelationshipManager::update(&s.marriages(), (id(1), id(2)), wedding(4, 3))
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation());
  assert!(RelationshipManager::get(&s.marriages(), id(2), id(1)).await.is_ok());
  assert_eq!(s.marriages().count().await.unwrap(), 2);
}

#[tokio::test]
async fn delete_children_for_person() {
  let s = alice_family().await;
  assert_eq!(s.children().delete_for_person(id(2)).await.unwrap(), 2);
  assert_eq!(ids(&s.children_of(id(1)).await.unwrap()), vec![id(3)]);
}

// ─── Graph accessor ──────────────────────────────────────────────────────────

#[tokio::test]
async fn parents_and_children_resolve_persons() {
  let s = alice_family().await;
  assert_eq!(ids(&s.children_of(id(1)).await.unwrap()), vec![id(2), id(3)]);
  assert_eq!(ids(&s.parents_of(id(4)).await.unwrap()), vec![id(2)]);
  assert!(s.children_of(id(4)).await.unwrap().is_empty());
  assert!(s.spouses_of(id(4)).await.unwrap().is_empty());
}

#[tokio::test]
async fn orphaned_links_are_skipped() {
  let s = alice_family().await;
  s.children().add(link(9, 2)).await.unwrap();
  assert_eq!(ids(&s.parents_of(id(2)).await.unwrap()), vec![id(1)]);

  let snapshot = s.snapshot().await.unwrap();
  assert_eq!(ids(&snapshot.parents_of(id(2)).await.unwrap()), vec![id(1)]);
}

#[tokio::test]
async fn tree_over_live_store_and_snapshot_agree() {
  let s = alice_family().await;
  let alice = s.persons().get(id(1)).await.unwrap();

  let live = FamilyTree::build(&s, alice.clone(), Direction::Descendants).await.unwrap();
  let snapshot = s.snapshot().await.unwrap();
  let copied = FamilyTree::build(&snapshot, alice, Direction::Descendants).await.unwrap();

  let two = live.flatten(2);
  let names: Vec<_> = two.iter().map(|i| (i.person.forename(), i.depth)).collect();
  assert_eq!(names, vec![("Alice", 0), ("Bob", 1), ("Carol", 1)]);
  assert_eq!(two, copied.flatten(2));
  assert_eq!(live.height(), 3);
}

// ─── Cascade ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingAvatars {
  removed: Mutex<Vec<PersonId>>,
  broken:  bool,
}

impl AvatarStore for RecordingAvatars {
  fn remove(&self, id: PersonId) -> Result<(), ResourceError> {
    if self.broken {
      return Err(ResourceError::Io {
        path:   PathBuf::from("/avatars"),
        source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
      });
    }
    self.removed.lock().unwrap().push(id);
    Ok(())
  }
}

#[tokio::test]
async fn delete_cascades_to_relationships_and_avatar() {
  let avatars = Arc::new(RecordingAvatars::default());
  let s = alice_family().await.with_avatars(avatars.clone());
  s.persons().add(person(5, "Reginald", date(1853, 10, 13))).await.unwrap();
  s.marriages().add(wedding(2, 5)).await.unwrap();

  let outcome = s.delete_person(id(2)).await.unwrap();
  assert_eq!(outcome.marriages_removed, 1);
  assert_eq!(outcome.children_removed, 2);
  assert!(outcome.avatar_failure.is_none());
  assert_eq!(*avatars.removed.lock().unwrap(), vec![id(2)]);

  assert!(s.persons().get(id(2)).await.unwrap_err().is_not_found());
  assert!(s.marriages().for_person(id(2)).await.unwrap().is_empty());
  assert!(s.children().for_person(id(2)).await.unwrap().is_empty());
  // The other parties keep their own records.
  assert!(s.persons().get(id(5)).await.is_ok());
  assert!(s.persons().get(id(4)).await.is_ok());
  assert_eq!(ids(&s.children_of(id(1)).await.unwrap()), vec![id(3)]);
}

#[tokio::test]
async fn avatar_failure_does_not_undo_the_delete() {
  let avatars = Arc::new(RecordingAvatars { broken: true, ..Default::default() });
  let s = alice_family().await.with_avatars(avatars);

  let outcome = s.delete_person(id(3)).await.unwrap();
  assert!(matches!(outcome.avatar_failure, Some(ResourceError::Io { .. })));
  assert!(s.person(id(3)).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_missing_person_changes_nothing() {
  let s = alice_family().await;
  s.children().add(link(9, 2)).await.unwrap();

  assert!(s.delete_person(id(9)).await.unwrap_err().is_not_found());
  assert_eq!(s.children().count().await.unwrap(), 4);
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_list_birthdays_and_anniversaries() {
  let s = store().await;
  s.persons().add(person(1, "Alice", date(1852, 5, 4))).await.unwrap();
  s.persons().add(person(2, "Reginald", date(1853, 10, 13))).await.unwrap();
  s.marriages().add(wedding(1, 2)).await.unwrap();

  let events = s.events().await.unwrap();
  assert_eq!(events.len(), 3);
  assert!(matches!(events[0], Event::Birthday { person_id, .. } if person_id == id(1)));
  assert!(matches!(events[1], Event::Anniversary { .. }));
  assert!(matches!(events[2], Event::Birthday { person_id, .. } if person_id == id(2)));
}
