//! Shopping list state controller.
//!
//! # Responsibility
//! - Hold the in-memory snapshot the presentation layer renders.
//! - Route every mutation through the store worker and reload afterwards.
//!
//! # Invariants
//! - The snapshot is replaced wholesale, never patched in place.
//! - Each mutation performs one write then one full reload inside the same
//!   queued job, so later reloads always observe earlier writes.
//! - Mutating an id that no longer exists is a silent no-op.

use crate::model::item::{Item, ItemId, NewItem};
use crate::repo::item_repo::{ItemRepository, RepoResult};
use crate::service::store_worker::{Completion, StoreError, StoreHandle};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock};

/// Immutable view of the list, most recently created item first.
pub type Snapshot = Arc<[Item]>;

pub type ControllerResult<T> = Result<T, ControllerError>;

/// Errors surfaced by controller entry points.
#[derive(Debug)]
pub enum ControllerError {
    /// Position does not exist in the current snapshot.
    IndexOutOfRange { index: usize, len: usize },
    Store(StoreError),
}

impl Display for ControllerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "item index {index} is out of range for {len} item(s)")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControllerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IndexOutOfRange { .. } => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for ControllerError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Bought/total counts for the summary line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListSummary {
    pub bought: usize,
    pub total: usize,
}

impl ListSummary {
    pub fn of(items: &[Item]) -> Self {
        Self {
            bought: items.iter().filter(|item| item.is_bought).count(),
            total: items.len(),
        }
    }
}

impl Display for ListSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} bought", self.bought, self.total)
    }
}

/// Mediator between the UI and the store worker.
///
/// Cheap to share: clones observe the same snapshot.
#[derive(Clone)]
pub struct ListController {
    store: StoreHandle,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl ListController {
    /// Creates a controller with an empty snapshot; call `load` to fill it.
    pub fn new(store: StoreHandle) -> Self {
        Self {
            store,
            snapshot: Arc::new(RwLock::new(Arc::from(Vec::new()))),
        }
    }

    /// Current snapshot.
    pub fn items(&self) -> Snapshot {
        let guard = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn summary(&self) -> ListSummary {
        ListSummary::of(&self.items())
    }

    /// Fetches every item and replaces the snapshot.
    pub fn load(&self) -> Completion<Snapshot> {
        self.mutate("load", |_repo| Ok(()))
    }

    /// Forced reload; the completion ends a refresh gesture.
    pub fn refresh(&self) -> Completion<Snapshot> {
        self.mutate("refresh", |_repo| Ok(()))
    }

    /// Inserts a not-yet-bought item.
    ///
    /// `name` is passed through untouched; callers normalize it first. The
    /// repository still rejects blank names.
    pub fn add(&self, name: impl Into<String>) -> Completion<Snapshot> {
        let item = NewItem::new(name);
        self.mutate("add", move |repo| {
            let id = repo.insert_item(&item)?;
            info!("event=item_add module=controller status=ok item_id={id}");
            Ok(())
        })
    }

    /// Flips `is_bought` of the item with `id`.
    pub fn toggle_bought(&self, id: ItemId) -> Completion<Snapshot> {
        self.mutate("toggle_bought", move |repo| {
            if let Some(item) = repo.get_item(id)? {
                repo.update_item(&item.toggled())?;
            }
            Ok(())
        })
    }

    /// Resolves `index` against the current snapshot, then toggles by id.
    pub fn toggle_bought_at(&self, index: usize) -> ControllerResult<Completion<Snapshot>> {
        let id = self.id_at(index)?;
        Ok(self.toggle_bought(id))
    }

    /// Renames `item`; its bought flag is re-read from the store.
    pub fn edit(&self, item: &Item, new_name: impl Into<String>) -> Completion<Snapshot> {
        let id = item.id;
        let new_name = new_name.into();
        self.mutate("edit", move |repo| {
            if let Some(current) = repo.get_item(id)? {
                repo.update_item(&current.renamed(new_name))?;
            }
            Ok(())
        })
    }

    /// Removes `item` by id.
    pub fn delete(&self, item: &Item) -> Completion<Snapshot> {
        let id = item.id;
        self.mutate("delete", move |repo| {
            repo.delete_item(id)?;
            Ok(())
        })
    }

    /// Item at `index` in the current snapshot.
    pub fn item_at(&self, index: usize) -> ControllerResult<Item> {
        let items = self.items();
        items
            .get(index)
            .cloned()
            .ok_or(ControllerError::IndexOutOfRange {
                index,
                len: items.len(),
            })
    }

    fn id_at(&self, index: usize) -> ControllerResult<ItemId> {
        self.item_at(index).map(|item| item.id)
    }

    fn mutate<F>(&self, label: &'static str, write: F) -> Completion<Snapshot>
    where
        F: FnOnce(&dyn ItemRepository) -> RepoResult<()> + Send + 'static,
    {
        let snapshot = Arc::clone(&self.snapshot);
        self.store.submit(label, move |repo| {
            write(repo)?;
            let reloaded: Snapshot = Arc::from(repo.list_items()?);
            let mut guard = snapshot.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Arc::clone(&reloaded);
            Ok(reloaded)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ListSummary, Snapshot};
    use crate::model::item::Item;
    use std::sync::Arc;

    fn item(id: i64, name: &str, is_bought: bool) -> Item {
        Item {
            id,
            name: name.to_string(),
            is_bought,
        }
    }

    #[test]
    fn summary_counts_bought_items() {
        let items: Snapshot = Arc::from(vec![
            item(3, "Eggs", true),
            item(2, "Bread", false),
            item(1, "Milk", true),
        ]);
        let summary = ListSummary::of(&items);
        assert_eq!(summary, ListSummary { bought: 2, total: 3 });
        assert_eq!(summary.to_string(), "2 of 3 bought");
    }

    #[test]
    fn summary_of_empty_list() {
        assert_eq!(ListSummary::of(&[]).to_string(), "0 of 0 bought");
    }
}
