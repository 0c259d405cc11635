use shoplist_core::db::{open_db, open_db_in_memory};
use shoplist_core::{
    spawn_store_worker, ControllerError, Item, ListController, ListSummary, RepoError,
    StoreError,
};
use std::time::Duration;

fn controller() -> ListController {
    let conn = open_db_in_memory().unwrap();
    ListController::new(spawn_store_worker(conn).unwrap())
}

fn names_and_flags(items: &[Item]) -> Vec<(String, bool)> {
    items
        .iter()
        .map(|item| (item.name.clone(), item.is_bought))
        .collect()
}

#[test]
fn add_then_load_roundtrips_name_with_not_bought() {
    let controller = controller();

    controller.add("Sparkling water").wait().unwrap();
    let items = controller.load().wait().unwrap();

    assert_eq!(
        names_and_flags(&items),
        vec![("Sparkling water".to_string(), false)]
    );
}

#[test]
fn load_twice_without_mutation_is_identical() {
    let controller = controller();
    controller.add("Apples").wait().unwrap();
    controller.add("Pears").wait().unwrap();

    let first = controller.load().wait().unwrap();
    let second = controller.load().wait().unwrap();
    assert_eq!(first, second);
    assert_eq!(controller.items(), second);
}

#[test]
fn later_items_are_listed_first() {
    let controller = controller();
    controller.add("A").wait().unwrap();
    let items = controller.add("B").wait().unwrap();

    assert_eq!(items[0].name, "B");
    assert_eq!(items[1].name, "A");
}

#[test]
fn toggle_flips_one_item_and_second_toggle_restores_it() {
    let controller = controller();
    controller.add("Milk").wait().unwrap();
    controller.add("Bread").wait().unwrap();
    let before = controller.load().wait().unwrap();

    let toggled = controller.toggle_bought_at(1).unwrap().wait().unwrap();
    let changed: Vec<_> = before
        .iter()
        .zip(toggled.iter())
        .filter(|(old, new)| old != new)
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0].0.id, changed[0].1.id);
    assert_ne!(changed[0].0.is_bought, changed[0].1.is_bought);

    let milk_id = before[1].id;
    let restored = controller.toggle_bought(milk_id).wait().unwrap();
    assert_eq!(restored, before);
}

#[test]
fn toggle_at_out_of_range_index_is_rejected_without_store_access() {
    let controller = controller();
    controller.add("Milk").wait().unwrap();

    let err = controller.toggle_bought_at(5).err().unwrap();
    assert!(matches!(
        err,
        ControllerError::IndexOutOfRange { index: 5, len: 1 }
    ));
}

#[test]
fn edit_renames_and_keeps_bought_flag() {
    let controller = controller();
    controller.add("Coffe").wait().unwrap();
    let coffee = controller.item_at(0).unwrap();
    controller.toggle_bought(coffee.id).wait().unwrap();

    let items = controller.edit(&coffee, "Coffee beans").wait().unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, coffee.id);
    assert_eq!(items[0].name, "Coffee beans");
    assert!(items[0].is_bought);
}

#[test]
fn edit_to_blank_name_fails_and_keeps_previous_snapshot() {
    let controller = controller();
    let items = controller.add("Cheese").wait().unwrap();

    let err = controller.edit(&items[0], "   ").wait().unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::Validation(_))));
    assert_eq!(controller.items(), items);
}

#[test]
fn add_blank_name_is_rejected_by_the_store() {
    let controller = controller();
    let err = controller.add("").wait().unwrap_err();
    assert!(matches!(err, StoreError::Repo(RepoError::Validation(_))));
    assert!(controller.items().is_empty());
}

#[test]
fn delete_removes_exactly_one_item() {
    let controller = controller();
    for name in ["Onions", "Garlic", "Leeks"] {
        controller.add(name).wait().unwrap();
    }
    let before = controller.items();
    let garlic = before[1].clone();

    let after = controller.delete(&garlic).wait().unwrap();

    let expected: Vec<Item> = before
        .iter()
        .filter(|item| item.id != garlic.id)
        .cloned()
        .collect();
    assert_eq!(after.to_vec(), expected);
}

#[test]
fn mutations_of_deleted_items_are_silent_noops() {
    let controller = controller();
    controller.add("Flour").wait().unwrap();
    let items = controller.add("Sugar").wait().unwrap();
    let sugar = items[0].clone();
    controller.delete(&sugar).wait().unwrap();

    let after_toggle = controller.toggle_bought(sugar.id).wait().unwrap();
    let after_edit = controller.edit(&sugar, "Brown sugar").wait().unwrap();
    let after_delete = controller.delete(&sugar).wait().unwrap();

    for items in [after_toggle, after_edit, after_delete] {
        assert_eq!(names_and_flags(&items), vec![("Flour".to_string(), false)]);
    }
}

#[test]
fn shopping_trip_scenario() {
    let controller = controller();

    controller.add("Milk").wait().unwrap();
    controller.add("Bread").wait().unwrap();
    let items = controller.load().wait().unwrap();
    assert_eq!(
        names_and_flags(&items),
        vec![("Bread".to_string(), false), ("Milk".to_string(), false)]
    );

    controller.toggle_bought_at(1).unwrap().wait().unwrap();
    let items = controller.load().wait().unwrap();
    assert_eq!(
        names_and_flags(&items),
        vec![("Bread".to_string(), false), ("Milk".to_string(), true)]
    );
    assert_eq!(controller.summary(), ListSummary { bought: 1, total: 2 });

    let bread = items[0].clone();
    controller.delete(&bread).wait().unwrap();
    let items = controller.load().wait().unwrap();
    assert_eq!(names_and_flags(&items), vec![("Milk".to_string(), true)]);
}

#[test]
fn rapid_toggles_are_serialized() {
    let controller = controller();
    let items = controller.add("Butter").wait().unwrap();
    let id = items[0].id;

    let completions: Vec<_> = (0..5).map(|_| controller.toggle_bought(id)).collect();
    let mut last = None;
    for completion in completions {
        last = Some(completion.wait().unwrap());
    }

    // Five flips from false land on true, and the snapshot matches the last reload.
    let last = last.unwrap();
    assert!(last[0].is_bought);
    assert_eq!(controller.items(), last);
}

#[test]
fn refresh_signals_completion_and_picks_up_external_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shoplist.sqlite3");
    let controller = ListController::new(spawn_store_worker(open_db(&path).unwrap()).unwrap());
    controller.load().wait().unwrap();
    assert!(controller.items().is_empty());

    let other = open_db(&path).unwrap();
    other
        .execute("INSERT INTO items (name) VALUES ('Basil');", [])
        .unwrap();

    let refreshed = controller
        .refresh()
        .wait_timeout(Duration::from_secs(5))
        .unwrap();
    assert_eq!(names_and_flags(&refreshed), vec![("Basil".to_string(), false)]);
}

#[test]
fn clones_share_one_snapshot() {
    let controller = controller();
    let view = controller.clone();

    controller.add("Lemons").wait().unwrap();

    assert_eq!(view.items().len(), 1);
    assert_eq!(view.summary().to_string(), "0 of 1 bought");
}

#[test]
fn failed_reload_reports_store_error_and_keeps_previous_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shoplist.sqlite3");
    let controller = ListController::new(spawn_store_worker(open_db(&path).unwrap()).unwrap());
    let loaded = controller.add("Milk").wait().unwrap();

    let other = open_db(&path).unwrap();
    other
        .execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO items (name, is_bought) VALUES ('Bread', 3);
             PRAGMA ignore_check_constraints = OFF;",
        )
        .unwrap();

    for completion in [controller.refresh(), controller.load()] {
        let err = completion.wait().unwrap_err();
        assert!(matches!(err, StoreError::Repo(RepoError::InvalidData(_))));
    }
    assert_eq!(controller.items(), loaded);
}
