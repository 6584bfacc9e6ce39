//! End-to-end deploy behaviour against in-memory and file-backed stores.

use std::cell::Cell;

use gallery_core::{
    config::Mode, seed, DraftStore, FileSlot, Item, ItemFields, ItemId, ItemPatch, MemoryRemote,
    MemorySlot, RemoteError, RemoteStore, RemoteUpdate,
};
use gallery_deploy::{DeployError, DeployState, Deployer, FileRemote};
use rstest::rstest;
use tempfile::TempDir;

fn fields(title: &str) -> ItemFields {
    ItemFields::new(title, "Little Crack")
}

fn published(items: &[(i64, &str)]) -> MemoryRemote {
    MemoryRemote::with_items(
        items
            .iter()
            .enumerate()
            .map(|(i, (id, title))| {
                let mut item = Item::new(*id, fields(title));
                item.display_order = i as u32 + 1;
                item
            })
            .collect(),
    )
}

fn empty_draft(remote: &dyn RemoteStore) -> DraftStore<MemorySlot> {
    let mut draft = DraftStore::new(MemorySlot::new());
    draft.load(remote);
    draft
}

fn snapshot(remote: &dyn RemoteStore) -> Vec<(i64, String, u32)> {
    remote
        .fetch_all()
        .expect("fetch")
        .into_iter()
        .map(|i| (i.id.0, i.fields.title, i.display_order))
        .collect()
}

/// Remote that fails the n-th insert (1-based) and counts every call.
struct FlakyRemote {
    inner: MemoryRemote,
    fail_insert: usize,
    inserts: Cell<usize>,
    deletes: Cell<usize>,
}

impl FlakyRemote {
    fn new(inner: MemoryRemote, fail_insert: usize) -> Self {
        Self {
            inner,
            fail_insert,
            inserts: Cell::new(0),
            deletes: Cell::new(0),
        }
    }
}

impl RemoteStore for FlakyRemote {
    fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
        self.inner.fetch_all()
    }
    fn insert(&self, fields: &ItemFields) -> Result<ItemId, RemoteError> {
        self.inserts.set(self.inserts.get() + 1);
        if self.inserts.get() == self.fail_insert {
            return Err(RemoteError::Rejected("quota exceeded".into()));
        }
        self.inner.insert(fields)
    }
    fn update(&self, id: ItemId, change: &RemoteUpdate) -> Result<(), RemoteError> {
        self.inner.update(id, change)
    }
    fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.deletes.set(self.deletes.get() + 1);
        self.inner.delete(id)
    }
}

/// Remote that rejects selected updates and counts inserts and deletes.
struct UpdateRejecting {
    inner: MemoryRemote,
    reject_full: Option<ItemId>,
    reject_order_only: Cell<bool>,
    inserts: Cell<usize>,
    deletes: Cell<usize>,
}

impl UpdateRejecting {
    fn new(inner: MemoryRemote) -> Self {
        Self {
            inner,
            reject_full: None,
            reject_order_only: Cell::new(false),
            inserts: Cell::new(0),
            deletes: Cell::new(0),
        }
    }
}

impl RemoteStore for UpdateRejecting {
    fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
        self.inner.fetch_all()
    }
    fn insert(&self, fields: &ItemFields) -> Result<ItemId, RemoteError> {
        self.inserts.set(self.inserts.get() + 1);
        self.inner.insert(fields)
    }
    fn update(&self, id: ItemId, change: &RemoteUpdate) -> Result<(), RemoteError> {
        let rejected = match change.fields {
            Some(_) => self.reject_full == Some(id),
            None => self.reject_order_only.get(),
        };
        if rejected {
            return Err(RemoteError::Rejected("row is read-only".into()));
        }
        self.inner.update(id, change)
    }
    fn delete(&self, id: ItemId) -> Result<(), RemoteError> {
        self.deletes.set(self.deletes.get() + 1);
        self.inner.delete(id)
    }
}

// ---------------------------------------------------------------------------
// 1. Identity and ordering
// ---------------------------------------------------------------------------

#[test]
fn deploy_matches_ids_and_positions() {
    let remote = published(&[(1, "Rabbit"), (2, "Bear"), (3, "Cat")]);
    remote.advance_sequence(10);
    let mut draft = empty_draft(&remote);

    draft.delete(ItemId(2)).unwrap();
    draft.add(fields("Owl")).unwrap();
    draft.move_item(ItemId(3), 0).unwrap();

    let report = Deployer::new()
        .deploy(Mode::Admin, &mut draft, &remote)
        .expect("deploy");

    assert_eq!(report.applied.updated, vec![ItemId(3), ItemId(1)]);
    assert_eq!(report.applied.inserted.len(), 1);
    assert_eq!(report.applied.inserted[0].assigned, ItemId(10));
    assert_eq!(report.applied.deleted, vec![ItemId(2)]);

    assert_eq!(
        snapshot(&remote),
        vec![
            (3, "Cat".to_string(), 1),
            (1, "Rabbit".to_string(), 2),
            (10, "Owl".to_string(), 3),
        ]
    );
    let draft_ids: Vec<_> = draft.items().iter().map(|i| i.id.0).collect();
    assert_eq!(draft_ids, vec![3, 1, 10], "draft carries the assigned id");
}

#[test]
fn edited_item_keeps_its_identity() {
    let remote = published(&[(4, "Fox")]);
    let mut draft = empty_draft(&remote);
    let patch = ItemPatch {
        title: Some("Arctic Fox".into()),
        creator: Some("Someone Else".into()),
        description: Some(Some("white".into())),
        year: Some(Some(2030)),
        ..Default::default()
    };
    draft.update(ItemId(4), &patch).unwrap();

    Deployer::new()
        .deploy(Mode::Admin, &mut draft, &remote)
        .expect("deploy");

    let items = remote.fetch_all().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ItemId(4));
    assert_eq!(items[0].fields.title, "Arctic Fox");
    assert_eq!(items[0].fields.year, Some(2030));
}

#[test]
fn second_deploy_only_updates() {
    let remote = FlakyRemote::new(published(&[(1, "a"), (2, "b")]), usize::MAX);
    let mut draft = empty_draft(&remote);
    draft.delete(ItemId(1)).unwrap();
    draft.add(fields("c")).unwrap();

    let deployer = Deployer::new();
    deployer.deploy(Mode::Admin, &mut draft, &remote).unwrap();
    let after_first = snapshot(&remote);
    let inserts = remote.inserts.get();
    let deletes = remote.deletes.get();

    let second = deployer.deploy(Mode::Admin, &mut draft, &remote).unwrap();
    assert_eq!(snapshot(&remote), after_first);
    assert_eq!(remote.inserts.get(), inserts, "no inserts on re-run");
    assert_eq!(remote.deletes.get(), deletes, "no deletes on re-run");
    assert_eq!(second.applied.updated.len(), 2);
}

#[test]
fn every_stale_id_is_removed_on_success() {
    let remote = published(&[(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
    let mut draft = empty_draft(&remote);
    draft.delete(ItemId(2)).unwrap();
    draft.delete(ItemId(4)).unwrap();

    Deployer::new()
        .deploy(Mode::Admin, &mut draft, &remote)
        .unwrap();
    let ids: Vec<_> = snapshot(&remote).into_iter().map(|(id, _, _)| id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[test]
fn empty_draft_unpublishes_everything() {
    let remote = published(&[(1, "a"), (2, "b")]);
    let mut draft = DraftStore::new(MemorySlot::with_value("[]"));
    draft.load(&remote);

    Deployer::new()
        .deploy(Mode::Admin, &mut draft, &remote)
        .unwrap();
    assert!(remote.fetch_all().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// 2. Partial failure
// ---------------------------------------------------------------------------

#[test]
fn failed_insert_stops_before_deletes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let remote = FlakyRemote::new(published(&[(1, "keep"), (9, "stale")]), 2);
    remote.inner.advance_sequence(20);
    let mut draft = empty_draft(&remote);
    draft.delete(ItemId(9)).unwrap();
    draft.add(fields("first new")).unwrap();
    draft.add(fields("second new")).unwrap();
    draft.add(fields("third new")).unwrap();

    let deployer = Deployer::new();
    let err = deployer
        .deploy(Mode::Admin, &mut draft, &remote)
        .unwrap_err();

    match &err {
        DeployError::ItemFailed { title, message } => {
            assert_eq!(title, "second new");
            assert!(message.contains("quota exceeded"), "got: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(deployer.state(), DeployState::Failed(reason) if reason.contains("second new")));
    assert_eq!(remote.deletes.get(), 0, "no stale-deletion pass after failure");

    let titles: Vec<_> = snapshot(&remote).into_iter().map(|(_, t, _)| t).collect();
    assert!(titles.contains(&"first new".to_string()));
    assert!(titles.contains(&"stale".to_string()));
    assert!(!titles.contains(&"second new".to_string()));
    assert!(!titles.contains(&"third new".to_string()));
}

#[test]
fn retry_after_failure_does_not_duplicate() {
    let remote = FlakyRemote::new(published(&[(1, "keep")]), 2);
    let mut draft = empty_draft(&remote);
    draft.add(fields("first new")).unwrap();
    draft.add(fields("second new")).unwrap();

    let deployer = Deployer::new();
    deployer
        .deploy(Mode::Admin, &mut draft, &remote)
        .unwrap_err();
    deployer
        .deploy(Mode::Admin, &mut draft, &remote)
        .expect("retry");

    let titles: Vec<_> = snapshot(&remote).into_iter().map(|(_, t, o)| (t, o)).collect();
    assert_eq!(
        titles,
        vec![
            ("keep".to_string(), 1),
            ("first new".to_string(), 2),
            ("second new".to_string(), 3),
        ]
    );
}

#[test]
fn fetch_failure_changes_nothing() {
    struct Offline;
    impl RemoteStore for Offline {
        fn fetch_all(&self) -> Result<Vec<Item>, RemoteError> {
            Err(RemoteError::Transport("dns failure".into()))
        }
        fn insert(&self, _: &ItemFields) -> Result<ItemId, RemoteError> {
            unreachable!("no writes after a failed fetch")
        }
        fn update(&self, _: ItemId, _: &RemoteUpdate) -> Result<(), RemoteError> {
            unreachable!("no writes after a failed fetch")
        }
        fn delete(&self, _: ItemId) -> Result<(), RemoteError> {
            unreachable!("no writes after a failed fetch")
        }
    }

    let mut draft = DraftStore::new(MemorySlot::new());
    draft.load(&Offline);
    draft.add(fields("a")).unwrap();
    let err = Deployer::new()
        .deploy(Mode::Admin, &mut draft, &Offline)
        .unwrap_err();
    assert!(matches!(err, DeployError::Fetch(_)));
}

#[test]
fn failed_update_stops_before_later_steps_and_deletes() {
    let mut remote = UpdateRejecting::new(published(&[(1, "t1"), (2, "t2"), (9, "t9")]));
    remote.reject_full = Some(ItemId(2));
    remote.inner.advance_sequence(20);
    let mut draft = empty_draft(&remote);
    draft.delete(ItemId(9)).unwrap();
    draft.add(fields("t3")).unwrap();

    let err = Deployer::new()
        .deploy(Mode::Admin, &mut draft, &remote)
        .unwrap_err();

    match &err {
        DeployError::ItemFailed { title, message } => {
            assert_eq!(title, "t2");
            assert!(message.contains("read-only"), "got: {message}");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(remote.inserts.get(), 0, "steps after the failure are skipped");
    assert_eq!(remote.deletes.get(), 0, "no stale-deletion pass after failure");
    let ids: Vec<_> = snapshot(&remote).into_iter().map(|(id, _, _)| id).collect();
    assert_eq!(ids, vec![1, 2, 9]);
}

#[test]
fn failed_ranking_after_insert_is_fatal_and_repaired_by_retry() {
    let remote = UpdateRejecting::new(published(&[(1, "keep"), (9, "stale")]));
    remote.inner.advance_sequence(20);
    remote.reject_order_only.set(true);
    let mut draft = empty_draft(&remote);
    draft.delete(ItemId(9)).unwrap();
    draft.add(fields("Owl")).unwrap();

    let deployer = Deployer::new();
    let err = deployer
        .deploy(Mode::Admin, &mut draft, &remote)
        .unwrap_err();

    assert!(matches!(&err, DeployError::ItemFailed { title, .. } if title == "Owl"));
    assert_eq!(remote.deletes.get(), 0);
    assert_eq!(
        draft.items()[1].id,
        ItemId(20),
        "assigned id is recorded before ranking"
    );
    assert!(snapshot(&remote).contains(&(20, "Owl".to_string(), 0)));

    remote.reject_order_only.set(false);
    deployer
        .deploy(Mode::Admin, &mut draft, &remote)
        .expect("retry");
    assert_eq!(remote.inserts.get(), 1, "retry updates instead of inserting");
    assert_eq!(
        snapshot(&remote),
        vec![(1, "keep".to_string(), 1), (20, "Owl".to_string(), 2)]
    );
}

// ---------------------------------------------------------------------------
// 3. Draft id assignment
// ---------------------------------------------------------------------------

#[rstest]
#[case::empty(&[], 1)]
#[case::dense(&[1, 2, 3], 4)]
#[case::sparse(&[7], 8)]
#[case::unordered(&[9, 2, 5], 10)]
fn add_assigns_max_plus_one(#[case] existing: &[i64], #[case] expected: i64) {
    let items: Vec<Item> = existing
        .iter()
        .map(|id| Item::new(*id, fields("x")))
        .collect();
    let mut draft = DraftStore::new(MemorySlot::with_value(
        serde_json::to_string(&items).unwrap(),
    ));
    draft.load(&MemoryRemote::new());
    assert_eq!(draft.add(fields("new")).unwrap(), ItemId(expected));
}

// ---------------------------------------------------------------------------
// 4. File-backed stores
// ---------------------------------------------------------------------------

#[test]
fn reset_then_deploy_to_file_remote() {
    let home = TempDir::new().expect("home");
    let remote = FileRemote::new(home.path().join("published.json"));
    let draft_path = home.path().join("draft.json");

    let mut draft = DraftStore::new(FileSlot::new(&draft_path));
    draft.load(&remote);
    draft.reset_to_default().unwrap();

    Deployer::new()
        .deploy(Mode::Admin, &mut draft, &remote)
        .expect("deploy");

    let published = remote.fetch_all().unwrap();
    assert_eq!(published.len(), seed::default_items().len());
    let orders: Vec<_> = published.iter().map(|i| i.display_order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);

    let mut reopened = DraftStore::new(FileSlot::new(&draft_path));
    let ids: Vec<_> = reopened.load(&remote).iter().map(|i| i.id).collect();
    let published_ids: Vec<_> = published.iter().map(|i| i.id).collect();
    assert_eq!(ids, published_ids, "persisted draft carries assigned ids");
}
