//! Intent dispatch from the terminal UI to the list controller.
//!
//! # Responsibility
//! - Translate user intents into controller calls.
//! - Surface every failure in the view banner; none ends the process.
//!
//! # Invariants
//! - Positions are resolved against the snapshot the user last saw.
//! - Names are normalized before they reach the controller.
//! - While the last reload failed, the failure stays visible and positional
//!   intents report it instead of acting on the stale list.

use crate::view::ListView;
use log::{error, info};
use shoplist_core::{
    Completion, Item, ListController, RepoError, Snapshot, StoreError, StoreResult,
};
use std::time::Duration;

const UI_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// A user action, with 1-based positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add(String),
    Toggle(usize),
    /// Opens the edit dialog for a position.
    BeginEdit(usize),
    /// Answer to the edit dialog; an empty name cancels it.
    SubmitEdit(String),
    Rename(usize, String),
    Delete(usize),
    Refresh,
    List,
    Help,
    Quit,
}

impl Intent {
    fn label(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Toggle(_) => "toggle",
            Self::BeginEdit(_) => "begin_edit",
            Self::SubmitEdit(_) => "submit_edit",
            Self::Rename(..) => "rename",
            Self::Delete(_) => "delete",
            Self::Refresh => "refresh",
            Self::List => "list",
            Self::Help => "help",
            Self::Quit => "quit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    controller: ListController,
    view: ListView,
    /// Message of the reload failure the current snapshot is stale from.
    stale: Option<String>,
}

impl App {
    /// Wraps `controller` and performs the initial load.
    pub fn start(controller: ListController) -> Self {
        let mut app = Self {
            controller,
            view: ListView::new(),
            stale: None,
        };
        let completion = app.controller.load();
        app.settle(completion);
        app
    }

    /// Why the displayed list may not match the store, if it may not.
    pub fn stale_reason(&self) -> Option<&str> {
        self.stale.as_deref()
    }

    pub fn view(&self) -> &ListView {
        &self.view
    }

    pub fn items(&self) -> Snapshot {
        self.controller.items()
    }

    pub fn render(&self) -> String {
        self.view.render(&self.controller.items())
    }

    pub fn dispatch(&mut self, intent: Intent) -> Flow {
        info!("event=intent module=cli status=start intent={}", intent.label());
        if !matches!(intent, Intent::List | Intent::Help) {
            self.view.clear_banner();
        }

        match intent {
            Intent::Add(raw) => {
                self.view.set_input(raw);
                if let Some(name) = self.view.take_input() {
                    let completion = self.controller.add(name);
                    self.settle(completion);
                }
            }
            Intent::Toggle(position) => {
                if let Some(index) = self.index_of(position) {
                    match self.controller.toggle_bought_at(index) {
                        Ok(completion) => self.settle(completion),
                        Err(err) => self.view.show_error(err),
                    }
                }
            }
            Intent::BeginEdit(position) => {
                if let Some(index) = self.index_of(position) {
                    match self.controller.item_at(index) {
                        Ok(item) => self.view.begin_edit(item),
                        Err(err) => self.view.show_error(err),
                    }
                }
            }
            Intent::SubmitEdit(raw) => {
                if let Some(item) = self.view.finish_edit() {
                    if raw.trim().is_empty() {
                        return Flow::Continue;
                    }
                    self.rename(&item, &raw);
                }
            }
            Intent::Rename(position, raw) => {
                if let Some(index) = self.index_of(position) {
                    match self.controller.item_at(index) {
                        Ok(item) => self.rename(&item, &raw),
                        Err(err) => self.view.show_error(err),
                    }
                }
            }
            Intent::Delete(position) => {
                if let Some(index) = self.index_of(position) {
                    match self.controller.item_at(index) {
                        Ok(item) => {
                            let completion = self.controller.delete(&item);
                            self.settle(completion);
                        }
                        Err(err) => self.view.show_error(err),
                    }
                }
            }
            Intent::Refresh => {
                self.view.begin_refresh();
                let completion = self.controller.refresh();
                self.settle(completion);
                self.view.end_refresh();
            }
            Intent::List | Intent::Help => {}
            Intent::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    fn rename(&mut self, item: &Item, raw: &str) {
        self.view.set_input(raw);
        if let Some(name) = self.view.take_input() {
            let completion = self.controller.edit(item, name);
            self.settle(completion);
        }
    }

    /// Runs one intent for a one-shot command and returns what to print.
    ///
    /// Fails when the list could not be loaded or the intent failed.
    pub fn run_once(&mut self, intent: Intent, json: bool) -> Result<String, String> {
        if let Some(reason) = &self.stale {
            return Err(reason.clone());
        }
        self.dispatch(intent);
        if let Some(message) = self.view.banner() {
            return Err(message.to_string());
        }

        if json {
            serde_json::to_string_pretty(&*self.controller.items())
                .map(|text| text + "\n")
                .map_err(|err| err.to_string())
        } else {
            Ok(self.render())
        }
    }

    fn index_of(&mut self, position: usize) -> Option<usize> {
        if let Some(reason) = &self.stale {
            let message = format!("list is out of date: {reason}");
            self.view.show_error(message);
            return None;
        }
        let len = self.controller.items().len();
        if position == 0 || position > len {
            self.view
                .show_error(format!("no item at position {position} (list has {len})"));
            return None;
        }
        Some(position - 1)
    }

    fn settle(&mut self, completion: Completion<Snapshot>) {
        let label = completion.label();
        let result: StoreResult<Snapshot> = completion.wait_timeout(UI_WAIT_TIMEOUT);
        match result {
            Ok(_) => self.stale = None,
            Err(err) => {
                let message = format!("{label} failed: {err}");
                // A rejected name never reached the reload; anything else may have.
                if !matches!(err, StoreError::Repo(RepoError::Validation(_))) {
                    error!("event=intent module=cli status=error intent={label} error={err}");
                    self.stale = Some(message.clone());
                }
                self.view.show_error(message);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{App, Flow, Intent};
    use shoplist_core::db::open_db_in_memory;
    use shoplist_core::{spawn_store_worker, ListController};

    fn app_with_damaged_row() -> App {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO items (name, is_bought) VALUES ('Milk', 2);
             PRAGMA ignore_check_constraints = OFF;",
        )
        .unwrap();
        App::start(ListController::new(spawn_store_worker(conn).unwrap()))
    }

    fn app() -> App {
        let conn = open_db_in_memory().unwrap();
        App::start(ListController::new(spawn_store_worker(conn).unwrap()))
    }

    fn names(app: &App) -> Vec<String> {
        app.items().iter().map(|item| item.name.clone()).collect()
    }

    #[test]
    fn add_normalizes_names_and_rejects_blank_ones() {
        let mut app = app();
        app.dispatch(Intent::Add("  brown   rice ".to_string()));
        assert_eq!(names(&app), vec!["brown rice"]);

        app.dispatch(Intent::Add("   ".to_string()));
        assert_eq!(names(&app), vec!["brown rice"]);
        assert_eq!(app.view().banner(), Some("item name cannot be empty"));
    }

    #[test]
    fn positions_are_one_based_and_checked() {
        let mut app = app();
        app.dispatch(Intent::Add("Milk".to_string()));
        app.dispatch(Intent::Add("Bread".to_string()));

        app.dispatch(Intent::Toggle(2));
        let items = app.items();
        assert!(!items[0].is_bought);
        assert!(items[1].is_bought);
        assert_eq!(app.view().banner(), None);

        app.dispatch(Intent::Toggle(3));
        assert!(app.view().banner().unwrap().contains("no item at position 3"));
        app.dispatch(Intent::Delete(0));
        assert_eq!(names(&app), vec!["Bread", "Milk"]);
    }

    #[test]
    fn edit_dialog_renames_or_cancels() {
        let mut app = app();
        app.dispatch(Intent::Add("Chees".to_string()));

        app.dispatch(Intent::BeginEdit(1));
        assert_eq!(app.view().editing().map(|item| item.name.as_str()), Some("Chees"));
        app.dispatch(Intent::SubmitEdit("Cheese".to_string()));
        assert!(app.view().editing().is_none());
        assert_eq!(names(&app), vec!["Cheese"]);

        app.dispatch(Intent::BeginEdit(1));
        app.dispatch(Intent::SubmitEdit(String::new()));
        assert!(app.view().editing().is_none());
        assert_eq!(names(&app), vec!["Cheese"]);
    }

    #[test]
    fn rename_and_delete_by_position() {
        let mut app = app();
        app.dispatch(Intent::Add("Apples".to_string()));
        app.dispatch(Intent::Add("Pears".to_string()));

        app.dispatch(Intent::Rename(2, "Green apples".to_string()));
        assert_eq!(names(&app), vec!["Pears", "Green apples"]);

        app.dispatch(Intent::Delete(1));
        assert_eq!(names(&app), vec!["Green apples"]);
        assert!(app.render().starts_with("0 of 1 bought"));
    }

    #[test]
    fn refresh_clears_its_flag_and_quit_stops() {
        let mut app = app();
        assert_eq!(app.dispatch(Intent::Refresh), Flow::Continue);
        assert!(!app.view().is_refreshing());
        assert_eq!(app.dispatch(Intent::Quit), Flow::Quit);
    }

    #[test]
    fn failed_initial_load_stays_visible_after_list() {
        let mut app = app_with_damaged_row();
        assert!(app
            .view()
            .banner()
            .unwrap()
            .contains("invalid is_bought value `2`"));

        app.dispatch(Intent::List);
        assert!(app.view().banner().unwrap().starts_with("load failed"));
        assert!(app.render().contains("! load failed"));
    }

    #[test]
    fn positional_intents_report_the_load_failure() {
        let mut app = app_with_damaged_row();

        app.dispatch(Intent::Toggle(1));
        let banner = app.view().banner().unwrap();
        assert!(banner.contains("list is out of date"));
        assert!(banner.contains("invalid persisted item data"));
        assert!(!banner.contains("no item at position"));
    }

    #[test]
    fn one_shot_fails_when_the_list_cannot_be_loaded() {
        let mut app = app_with_damaged_row();
        let err = app.run_once(Intent::List, false).unwrap_err();
        assert!(err.contains("invalid persisted item data"));
        assert!(app.run_once(Intent::Delete(1), true).is_err());
    }

    #[test]
    fn one_shot_renders_text_or_json_on_success() {
        let mut app = app();
        let text = app.run_once(Intent::Add("Milk".to_string()), false).unwrap();
        assert!(text.starts_with("0 of 1 bought"));

        let json = app.run_once(Intent::List, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Milk");
        assert_eq!(value[0]["isBought"], false);

        assert!(app.run_once(Intent::Toggle(4), false).is_err());
        assert!(app.stale_reason().is_none());
    }
}
