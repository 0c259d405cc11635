//! Terminal rendering and ephemeral UI state.
//!
//! Nothing here is persisted; durable changes go through `ListController`.

use shoplist_core::{normalize_item_name, Item, ListSummary};
use std::fmt::Display;
use std::fmt::Write as _;

/// Local state of the list screen.
#[derive(Debug, Default)]
pub struct ListView {
    input: String,
    editing: Option<Item>,
    refreshing: bool,
    banner: Option<String>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the add-item input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Drains the input buffer, returning a normalized name.
    ///
    /// A blank buffer yields `None` and raises the banner instead.
    pub fn take_input(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.input);
        let name = normalize_item_name(&raw);
        if name.is_none() {
            self.show_error("item name cannot be empty");
        }
        name
    }

    /// Opens the edit dialog for `item`.
    pub fn begin_edit(&mut self, item: Item) {
        self.editing = Some(item);
    }

    pub fn editing(&self) -> Option<&Item> {
        self.editing.as_ref()
    }

    /// Closes the edit dialog, handing back the item it was opened for.
    pub fn finish_edit(&mut self) -> Option<Item> {
        self.editing.take()
    }

    pub fn begin_refresh(&mut self) {
        self.refreshing = true;
    }

    pub fn end_refresh(&mut self) {
        self.refreshing = false;
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn show_error(&mut self, message: impl Display) {
        self.banner = Some(message.to_string());
    }

    pub fn clear_banner(&mut self) {
        self.banner = None;
    }

    /// Last failure shown to the user, if any.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Full screen: summary, rows, then banner and dialog lines.
    pub fn render(&self, items: &[Item]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", ListSummary::of(items));
        if items.is_empty() {
            out.push_str("  (nothing to buy)\n");
        }
        for (index, item) in items.iter().enumerate() {
            out.push_str(&render_row(index + 1, item));
            out.push('\n');
        }
        if self.refreshing {
            out.push_str("refreshing...\n");
        }
        if let Some(message) = &self.banner {
            let _ = writeln!(out, "! {message}");
        }
        if let Some(item) = &self.editing {
            let _ = writeln!(out, "new name for \"{}\" (empty line cancels):", item.name);
        }
        out
    }
}

/// One row: 1-based position, checkbox, name.
pub fn render_row(position: usize, item: &Item) -> String {
    let mark = if item.is_bought { 'x' } else { ' ' };
    format!("{position:>3}. [{mark}] {}", item.name)
}
