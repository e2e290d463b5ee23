use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tracing::{info, warn};

use promptlib_core::clipboard::{self, ClipboardSink};
use promptlib_core::keymap::{EditAction, InsertAction, Keymap, NormalAction, SearchAction};
use promptlib_core::library::PromptLibrary;
use promptlib_core::prompt::{Prompt, Theme};
use promptlib_core::store::{self, Store};
use promptlib_core::view::{ScrollMemory, ViewFilter};

use crate::editor::TextBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    /// Typing a new prompt into the input box.
    Insert,
    /// Inline editing of an existing prompt.
    Edit,
    /// Typing into the search box.
    Search,
}

pub struct App {
    pub library: PromptLibrary,
    store: Box<dyn Store>,
    clipboard: Box<dyn ClipboardSink>,
    pub theme: Theme,
    pub filter: ViewFilter,
    /// Scroll offset to put back on the next frame after a favourites toggle.
    pub scroll: ScrollMemory,
    pub mode: AppMode,
    /// Selection is a position in the displayed subset, not the collection.
    pub list_state: ListState,
    /// Pending new-prompt text.
    pub input: TextBuffer,
    /// Cursor-aware copy of the library's in-progress edit text.
    pub edit_input: TextBuffer,
    pub keymap: Keymap,
    pub should_quit: bool,
    pub status_message: Option<(String, Instant)>,
    pub show_help_overlay: bool,
    pub help_scroll: u16,
    /// Collection indices of the displayed subset, in display order.
    visible: Vec<usize>,
}

impl App {
    pub fn new(store: Box<dyn Store>, clipboard: Box<dyn ClipboardSink>, keymap: Keymap) -> Self {
        let prompts = store::load_or_empty(store.as_ref());
        let theme = store::load_theme_or_default(store.as_ref());
        info!(count = prompts.len(), theme = theme.as_str(), "library loaded");

        let mut app = Self {
            library: PromptLibrary::new(prompts),
            store,
            clipboard,
            theme,
            filter: ViewFilter::default(),
            scroll: ScrollMemory::default(),
            mode: AppMode::Normal,
            list_state: ListState::default(),
            input: TextBuffer::new(),
            edit_input: TextBuffer::new(),
            keymap,
            should_quit: false,
            status_message: None,
            show_help_overlay: false,
            help_scroll: 0,
            visible: Vec::new(),
        };
        app.refresh_visible(None);
        app
    }

    // ── Displayed subset ──

    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    pub fn visible_prompts(&self) -> impl Iterator<Item = &Prompt> + '_ {
        let prompts = self.library.prompts();
        self.visible.iter().filter_map(move |&i| prompts.get(i))
    }

    pub fn selected_prompt(&self) -> Option<&Prompt> {
        let pos = self.list_state.selected()?;
        let idx = *self.visible.get(pos)?;
        self.library.prompts().get(idx)
    }

    pub fn selected_id(&self) -> Option<i64> {
        self.selected_prompt().map(|p| p.id)
    }

    /// Recompute the displayed subset. `keep` stays selected when it is still
    /// shown; otherwise the old position is clamped into range.
    fn refresh_visible(&mut self, keep: Option<i64>) {
        let old_pos = self.list_state.selected();
        self.visible = self.filter.visible_indices(self.library.prompts());
        if self.visible.is_empty() {
            self.list_state.select(None);
            return;
        }
        let prompts = self.library.prompts();
        let pos = keep
            .and_then(|id| self.visible.iter().position(|&i| prompts[i].id == id))
            .unwrap_or_else(|| old_pos.unwrap_or(0).min(self.visible.len() - 1));
        self.list_state.select(Some(pos));
    }

    // ── Persistence ──

    fn persist_prompts(&self) {
        if let Err(e) = self.store.save(self.library.prompts()) {
            warn!(error = %e, "failed to save prompts");
        }
    }

    fn persist_theme(&self) {
        if let Err(e) = self.store.save_theme(self.theme) {
            warn!(error = %e, "failed to save theme");
        }
    }

    // ── Status ──

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status messages older than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, created)) = &self.status_message {
            if created.elapsed().as_secs() >= 3 {
                self.status_message = None;
            }
        }
    }

    // ── Operations ──

    /// Add a prompt, selecting it when the current view shows it. Returns
    /// whether anything was added.
    pub fn add_prompt(&mut self, text: &str) -> bool {
        let prev = self.selected_id();
        let Some(id) = self.library.add(text) else {
            return false;
        };
        self.persist_prompts();
        let shown = self.library.get(id).is_some_and(|p| self.filter.matches(p));
        self.refresh_visible(if shown { Some(id) } else { prev });
        true
    }

    fn toggle_selected_favourite(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.library.toggle_favourite(id) {
            self.persist_prompts();
            self.refresh_visible(Some(id));
        }
    }

    fn begin_edit_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if self.library.begin_edit(id) {
            let text = self.library.edit_text().unwrap_or_default();
            self.edit_input = TextBuffer::from_string(text);
            self.mode = AppMode::Edit;
        }
    }

    fn sync_edit_text(&mut self) {
        if let Some(text) = self.library.edit_text_mut() {
            *text = self.edit_input.to_string();
        }
    }

    fn save_edit(&mut self) {
        let Some(id) = self.library.editing_id() else {
            self.mode = AppMode::Normal;
            return;
        };
        if self.library.save_edit(id) {
            self.persist_prompts();
            self.edit_input.clear();
            self.mode = AppMode::Normal;
            self.refresh_visible(Some(id));
        }
    }

    fn cancel_edit(&mut self) {
        self.library.cancel_edit();
        self.edit_input.clear();
        self.mode = AppMode::Normal;
    }

    fn copy_selected(&mut self) {
        let Some(text) = self.selected_prompt().map(|p| p.text.clone()) else {
            return;
        };
        if clipboard::copy(self.clipboard.as_mut(), &text) {
            self.set_status("Copied to clipboard");
        }
    }

    fn request_delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.library.request_delete(id);
        }
    }

    fn confirm_pending_delete(&mut self) {
        let Some(id) = self.library.pending_delete() else {
            return;
        };
        let prev = self.selected_id();
        if self.library.confirm_delete(id) {
            self.persist_prompts();
            self.refresh_visible(prev.filter(|&p| p != id));
        }
    }

    fn toggle_favourites_view(&mut self) {
        self.scroll.record(self.list_state.offset());
        let keep = self.selected_id();
        self.filter.toggle_favourites();
        self.refresh_visible(keep);
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        self.persist_theme();
    }

    fn set_search(&mut self, search: String) {
        let keep = self.selected_id();
        self.filter.search = search;
        self.refresh_visible(keep);
    }

    // ── Navigation ──

    fn select_next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.visible.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn select_prev(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    fn select_first(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn select_last(&mut self) {
        if !self.visible.is_empty() {
            self.list_state.select(Some(self.visible.len() - 1));
        }
    }

    // ── Key handling ──

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Help overlay intercepts all keys
        if self.show_help_overlay {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help_overlay = false;
                    self.help_scroll = 0;
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    self.help_scroll = self.help_scroll.saturating_add(1);
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.help_scroll = self.help_scroll.saturating_sub(1);
                }
                _ => {}
            }
            return;
        }

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Insert => self.handle_insert_key(key),
            AppMode::Edit => self.handle_edit_key(key),
            AppMode::Search => self.handle_search_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let Some(&action) = self.keymap.normal.get(&key.code) else {
            return;
        };
        match action {
            NormalAction::Quit => self.should_quit = true,
            NormalAction::Insert => self.mode = AppMode::Insert,
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::GoToTop => self.select_first(),
            NormalAction::GoToBottom => self.select_last(),
            NormalAction::Edit => self.begin_edit_selected(),
            NormalAction::ToggleFavourite => self.toggle_selected_favourite(),
            NormalAction::Copy => self.copy_selected(),
            NormalAction::Delete => self.request_delete_selected(),
            NormalAction::ConfirmDelete => self.confirm_pending_delete(),
            NormalAction::CancelDelete => self.library.cancel_delete_request(),
            NormalAction::Search => self.mode = AppMode::Search,
            NormalAction::ToggleFavouritesView => self.toggle_favourites_view(),
            NormalAction::ToggleTheme => self.toggle_theme(),
            NormalAction::ShowHelp => self.show_help_overlay = true,
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        if is_newline(&key) {
            self.input.insert_newline();
            return;
        }
        if let Some(&action) = self.keymap.insert.get(&key.code) {
            match action {
                InsertAction::Submit => {
                    let text = self.input.to_string();
                    if self.add_prompt(&text) {
                        self.input.clear();
                        self.set_status("Prompt added");
                    }
                }
                // The draft survives leaving the input box
                InsertAction::Cancel => self.mode = AppMode::Normal,
            }
            return;
        }
        self.input.apply_key(key);
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        if is_newline(&key) {
            self.edit_input.insert_newline();
            self.sync_edit_text();
            return;
        }
        if let Some(&action) = self.keymap.edit.get(&key.code) {
            match action {
                EditAction::Save => self.save_edit(),
                EditAction::Cancel => self.cancel_edit(),
            }
            return;
        }
        if self.edit_input.apply_key(key) {
            self.sync_edit_text();
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        if let Some(&action) = self.keymap.search.get(&key.code) {
            match action {
                SearchAction::Confirm => {}
                SearchAction::Clear => self.set_search(String::new()),
            }
            self.mode = AppMode::Normal;
            return;
        }
        match key.code {
            KeyCode::Backspace => {
                let mut search = self.filter.search.clone();
                search.pop();
                self.set_search(search);
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let search = format!("{}{c}", self.filter.search);
                self.set_search(search);
            }
            _ => {}
        }
    }

    /// Bracketed paste goes to whichever text field has focus.
    pub fn handle_paste(&mut self, text: &str) {
        match self.mode {
            AppMode::Insert => self.input.insert_str(text),
            AppMode::Edit => {
                self.edit_input.insert_str(text);
                self.sync_edit_text();
            }
            AppMode::Search => {
                let pasted: String = text.chars().filter(|c| !c.is_control()).collect();
                let search = format!("{}{pasted}", self.filter.search);
                self.set_search(search);
            }
            AppMode::Normal => {}
        }
    }
}

fn is_newline(key: &KeyEvent) -> bool {
    key.code == KeyCode::Enter && key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT)
}
