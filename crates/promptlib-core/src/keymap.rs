//! Key parsing/display, per-mode action enums, and the runtime `Keymap`.

use std::collections::HashMap;

use crossterm::event::KeyCode;

use crate::config::{
    load_toml_config, TomlConfig, TomlEditBindings, TomlInsertBindings, TomlNormalBindings,
    TomlSearchBindings,
};

// ── Key parsing and display ──

pub fn parse_key(s: &str) -> Option<KeyCode> {
    match s {
        "Enter" => Some(KeyCode::Enter),
        "Esc" => Some(KeyCode::Esc),
        "Tab" => Some(KeyCode::Tab),
        "Backspace" => Some(KeyCode::Backspace),
        "Delete" => Some(KeyCode::Delete),
        "Up" => Some(KeyCode::Up),
        "Down" => Some(KeyCode::Down),
        "Left" => Some(KeyCode::Left),
        "Right" => Some(KeyCode::Right),
        "Home" => Some(KeyCode::Home),
        "End" => Some(KeyCode::End),
        "PageUp" => Some(KeyCode::PageUp),
        "PageDown" => Some(KeyCode::PageDown),
        "Space" => Some(KeyCode::Char(' ')),
        s if s.chars().count() == 1 => s.chars().next().map(KeyCode::Char),
        _ => None,
    }
}

pub fn key_display(kc: &KeyCode) -> String {
    match kc {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        _ => "?".to_string(),
    }
}

/// Remove all existing bindings for `action`, then insert new ones from `keys`.
/// If `keys` is None, keep defaults.
pub fn apply_bindings<A: PartialEq + Copy>(
    map: &mut HashMap<KeyCode, A>,
    action: A,
    keys: Option<Vec<String>>,
) {
    let Some(keys) = keys else {
        return;
    };

    map.retain(|_, v| *v != action);

    for key_str in &keys {
        if let Some(kc) = parse_key(key_str) {
            map.insert(kc, action);
        }
    }
}

/// Collect all keys bound to a given action, sorted for display consistency.
pub fn keys_for_action<A: PartialEq>(map: &HashMap<KeyCode, A>, action: A) -> Vec<KeyCode> {
    let mut keys: Vec<KeyCode> = map
        .iter()
        .filter(|(_, a)| **a == action)
        .map(|(k, _)| *k)
        .collect();
    keys.sort_by_key(key_display);
    keys
}

/// Format a list of keycodes as a display string like "j/k" or "Esc/n".
pub fn format_keys(keys: &[KeyCode]) -> String {
    keys.iter()
        .map(key_display)
        .collect::<Vec<_>>()
        .join("/")
}

// ── Action enums ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalAction {
    Quit,
    Insert,
    SelectNext,
    SelectPrev,
    GoToTop,
    GoToBottom,
    Edit,
    ToggleFavourite,
    Copy,
    Delete,
    ConfirmDelete,
    CancelDelete,
    Search,
    ToggleFavouritesView,
    ToggleTheme,
    ShowHelp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertAction {
    Cancel,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    Save,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchAction {
    Confirm,
    Clear,
}

// ── Keymap ──

pub struct Keymap {
    pub normal: HashMap<KeyCode, NormalAction>,
    pub insert: HashMap<KeyCode, InsertAction>,
    pub edit: HashMap<KeyCode, EditAction>,
    pub search: HashMap<KeyCode, SearchAction>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut normal = HashMap::new();
        normal.insert(KeyCode::Char('q'), NormalAction::Quit);
        normal.insert(KeyCode::Char('i'), NormalAction::Insert);
        normal.insert(KeyCode::Char('a'), NormalAction::Insert);
        normal.insert(KeyCode::Char('j'), NormalAction::SelectNext);
        normal.insert(KeyCode::Down, NormalAction::SelectNext);
        normal.insert(KeyCode::Char('k'), NormalAction::SelectPrev);
        normal.insert(KeyCode::Up, NormalAction::SelectPrev);
        normal.insert(KeyCode::Char('g'), NormalAction::GoToTop);
        normal.insert(KeyCode::Home, NormalAction::GoToTop);
        normal.insert(KeyCode::Char('G'), NormalAction::GoToBottom);
        normal.insert(KeyCode::End, NormalAction::GoToBottom);
        normal.insert(KeyCode::Char('e'), NormalAction::Edit);
        normal.insert(KeyCode::Char('s'), NormalAction::ToggleFavourite);
        normal.insert(KeyCode::Char('*'), NormalAction::ToggleFavourite);
        normal.insert(KeyCode::Char('c'), NormalAction::Copy);
        normal.insert(KeyCode::Enter, NormalAction::Copy);
        normal.insert(KeyCode::Char('d'), NormalAction::Delete);
        normal.insert(KeyCode::Char('y'), NormalAction::ConfirmDelete);
        normal.insert(KeyCode::Char('n'), NormalAction::CancelDelete);
        normal.insert(KeyCode::Esc, NormalAction::CancelDelete);
        normal.insert(KeyCode::Char('/'), NormalAction::Search);
        normal.insert(KeyCode::Char('f'), NormalAction::ToggleFavouritesView);
        normal.insert(KeyCode::Char('t'), NormalAction::ToggleTheme);
        normal.insert(KeyCode::Char('?'), NormalAction::ShowHelp);

        let mut insert = HashMap::new();
        insert.insert(KeyCode::Esc, InsertAction::Cancel);
        insert.insert(KeyCode::Enter, InsertAction::Submit);

        let mut edit = HashMap::new();
        edit.insert(KeyCode::Enter, EditAction::Save);
        edit.insert(KeyCode::Esc, EditAction::Cancel);

        let mut search = HashMap::new();
        search.insert(KeyCode::Enter, SearchAction::Confirm);
        search.insert(KeyCode::Esc, SearchAction::Clear);

        Self {
            normal,
            insert,
            edit,
            search,
        }
    }
}

impl Keymap {
    /// Defaults overlaid with the bindings from the user's config file.
    pub fn load() -> Self {
        Self::from_toml(load_toml_config())
    }

    pub fn from_toml(config: TomlConfig) -> Self {
        let mut keymap = Self::default();

        if let Some(normal) = config.normal {
            let map = &mut keymap.normal;
            apply_bindings(map, NormalAction::Quit, normal.quit);
            apply_bindings(map, NormalAction::Insert, normal.insert);
            apply_bindings(map, NormalAction::SelectNext, normal.select_next);
            apply_bindings(map, NormalAction::SelectPrev, normal.select_prev);
            apply_bindings(map, NormalAction::GoToTop, normal.go_to_top);
            apply_bindings(map, NormalAction::GoToBottom, normal.go_to_bottom);
            apply_bindings(map, NormalAction::Edit, normal.edit);
            apply_bindings(map, NormalAction::ToggleFavourite, normal.toggle_favourite);
            apply_bindings(map, NormalAction::Copy, normal.copy);
            apply_bindings(map, NormalAction::Delete, normal.delete);
            apply_bindings(map, NormalAction::ConfirmDelete, normal.confirm_delete);
            apply_bindings(map, NormalAction::CancelDelete, normal.cancel_delete);
            apply_bindings(map, NormalAction::Search, normal.search);
            apply_bindings(map, NormalAction::ToggleFavouritesView, normal.toggle_favourites_view);
            apply_bindings(map, NormalAction::ToggleTheme, normal.toggle_theme);
            apply_bindings(map, NormalAction::ShowHelp, normal.show_help);
        }

        if let Some(insert) = config.insert {
            apply_bindings(&mut keymap.insert, InsertAction::Cancel, insert.cancel);
            apply_bindings(&mut keymap.insert, InsertAction::Submit, insert.submit);
        }

        if let Some(edit) = config.edit {
            apply_bindings(&mut keymap.edit, EditAction::Save, edit.save);
            apply_bindings(&mut keymap.edit, EditAction::Cancel, edit.cancel);
        }

        if let Some(search) = config.search {
            apply_bindings(&mut keymap.search, SearchAction::Confirm, search.confirm);
            apply_bindings(&mut keymap.search, SearchAction::Clear, search.clear);
        }

        keymap
    }

    /// Return a TomlConfig with all defaults populated (for `config init`).
    pub fn default_toml_config() -> TomlConfig {
        let km = Self::default();

        fn keys_to_strings<A: PartialEq>(map: &HashMap<KeyCode, A>, action: A) -> Vec<String> {
            let mut keys: Vec<_> = map
                .iter()
                .filter(|(_, a)| **a == action)
                .map(|(k, _)| key_display(k))
                .collect();
            keys.sort();
            keys
        }

        let n = |action| Some(keys_to_strings(&km.normal, action));

        TomlConfig {
            settings: None,
            normal: Some(TomlNormalBindings {
                quit: n(NormalAction::Quit),
                insert: n(NormalAction::Insert),
                select_next: n(NormalAction::SelectNext),
                select_prev: n(NormalAction::SelectPrev),
                go_to_top: n(NormalAction::GoToTop),
                go_to_bottom: n(NormalAction::GoToBottom),
                edit: n(NormalAction::Edit),
                toggle_favourite: n(NormalAction::ToggleFavourite),
                copy: n(NormalAction::Copy),
                delete: n(NormalAction::Delete),
                confirm_delete: n(NormalAction::ConfirmDelete),
                cancel_delete: n(NormalAction::CancelDelete),
                search: n(NormalAction::Search),
                toggle_favourites_view: n(NormalAction::ToggleFavouritesView),
                toggle_theme: n(NormalAction::ToggleTheme),
                show_help: n(NormalAction::ShowHelp),
            }),
            insert: Some(TomlInsertBindings {
                cancel: Some(keys_to_strings(&km.insert, InsertAction::Cancel)),
                submit: Some(keys_to_strings(&km.insert, InsertAction::Submit)),
            }),
            edit: Some(TomlEditBindings {
                save: Some(keys_to_strings(&km.edit, EditAction::Save)),
                cancel: Some(keys_to_strings(&km.edit, EditAction::Cancel)),
            }),
            search: Some(TomlSearchBindings {
                confirm: Some(keys_to_strings(&km.search, SearchAction::Confirm)),
                clear: Some(keys_to_strings(&km.search, SearchAction::Clear)),
            }),
        }
    }

    pub fn normal_help(&self) -> Vec<(String, &'static str)> {
        let entries: &[(NormalAction, &str)] = &[
            (NormalAction::Insert, "new"),
            (NormalAction::Edit, "edit"),
            (NormalAction::ToggleFavourite, "star"),
            (NormalAction::Copy, "copy"),
            (NormalAction::Delete, "delete"),
            (NormalAction::Search, "search"),
            (NormalAction::ToggleFavouritesView, "favourites"),
            (NormalAction::ToggleTheme, "theme"),
            (NormalAction::SelectNext, "next"),
            (NormalAction::SelectPrev, "prev"),
            (NormalAction::GoToTop, "top"),
            (NormalAction::GoToBottom, "bottom"),
            (NormalAction::ShowHelp, "help"),
            (NormalAction::Quit, "quit"),
        ];
        self.build_help(&self.normal, entries)
    }

    /// Shown while a delete is awaiting confirmation.
    pub fn confirm_help(&self) -> Vec<(String, &'static str)> {
        let entries: &[(NormalAction, &str)] = &[
            (NormalAction::ConfirmDelete, "confirm"),
            (NormalAction::CancelDelete, "cancel"),
        ];
        self.build_help(&self.normal, entries)
    }

    pub fn insert_help(&self) -> Vec<(String, &'static str)> {
        let entries: &[(InsertAction, &str)] = &[
            (InsertAction::Submit, "add"),
            (InsertAction::Cancel, "back"),
        ];
        self.build_help(&self.insert, entries)
    }

    pub fn edit_help(&self) -> Vec<(String, &'static str)> {
        let entries: &[(EditAction, &str)] = &[
            (EditAction::Save, "save"),
            (EditAction::Cancel, "cancel"),
        ];
        self.build_help(&self.edit, entries)
    }

    pub fn search_help(&self) -> Vec<(String, &'static str)> {
        let entries: &[(SearchAction, &str)] = &[
            (SearchAction::Confirm, "apply"),
            (SearchAction::Clear, "clear"),
        ];
        self.build_help(&self.search, entries)
    }

    pub fn normal_key_hint(&self, action: NormalAction) -> String {
        match keys_for_action(&self.normal, action).first() {
            Some(kc) => key_display(kc),
            None => "?".to_string(),
        }
    }

    fn build_help<A: PartialEq + Copy>(
        &self,
        map: &HashMap<KeyCode, A>,
        entries: &[(A, &'static str)],
    ) -> Vec<(String, &'static str)> {
        let mut result = Vec::new();
        let mut seen_actions: Vec<A> = Vec::new();

        for &(action, label) in entries {
            if seen_actions.contains(&action) {
                continue;
            }
            seen_actions.push(action);
            let keys = keys_for_action(map, action);
            if keys.is_empty() {
                continue;
            }
            result.push((format_keys(&keys), label));
        }
        result
    }
}
