//! The prompt collection and its two single-slot state machines (edit and
//! delete confirmation).

use tracing::{info, warn};

use crate::prompt::Prompt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing { id: i64, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteState {
    #[default]
    Idle,
    PendingConfirmation(i64),
}

/// Ordered prompt collection, most recent first.
///
/// Mutating operations return whether the collection changed so the caller
/// knows when to persist.
#[derive(Debug, Default)]
pub struct PromptLibrary {
    prompts: Vec<Prompt>,
    edit: EditState,
    delete: DeleteState,
    /// Highest id ever issued or loaded. Ids are never reused.
    last_id: i64,
}

impl PromptLibrary {
    pub fn new(prompts: Vec<Prompt>) -> Self {
        let last_id = prompts.iter().map(|p| p.id).max().unwrap_or(0);
        Self {
            prompts,
            edit: EditState::Idle,
            delete: DeleteState::Idle,
            last_id,
        }
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }

    pub fn favourite_count(&self) -> usize {
        self.prompts.iter().filter(|p| p.favourite).count()
    }

    pub fn get(&self, id: i64) -> Option<&Prompt> {
        self.prompts.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: i64) -> Option<&mut Prompt> {
        self.prompts.iter_mut().find(|p| p.id == id)
    }

    /// Creation timestamp in milliseconds, bumped past the last issued id when
    /// the clock hasn't moved (or moved backwards). `None` once the id space
    /// above the high-water mark is exhausted.
    fn fresh_id(&mut self) -> Option<i64> {
        let next = self.last_id.checked_add(1)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.last_id = now.max(next);
        Some(self.last_id)
    }

    // ── Collection ──

    /// Prepend a new prompt. Returns its id, or `None` when the trimmed text
    /// is empty or no unused id remains.
    pub fn add(&mut self, raw: &str) -> Option<i64> {
        let text = raw.trim();
        if text.is_empty() {
            return None;
        }
        let Some(id) = self.fresh_id() else {
            warn!(last_id = self.last_id, "prompt id space exhausted, not adding");
            return None;
        };
        self.prompts.insert(0, Prompt::new(id, text.to_string()));
        info!(id, "prompt added");
        Some(id)
    }

    pub fn delete(&mut self, id: i64) -> bool {
        let Some(idx) = self.prompts.iter().position(|p| p.id == id) else {
            return false;
        };
        self.prompts.remove(idx);
        if self.editing_id() == Some(id) {
            self.edit = EditState::Idle;
        }
        if self.delete == DeleteState::PendingConfirmation(id) {
            self.delete = DeleteState::Idle;
        }
        info!(id, "prompt deleted");
        true
    }

    pub fn toggle_favourite(&mut self, id: i64) -> bool {
        match self.get_mut(id) {
            Some(p) => {
                p.favourite = !p.favourite;
                true
            }
            None => false,
        }
    }

    // ── Edit state machine ──

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn editing_id(&self) -> Option<i64> {
        match self.edit {
            EditState::Editing { id, .. } => Some(id),
            EditState::Idle => None,
        }
    }

    pub fn edit_text(&self) -> Option<&str> {
        match &self.edit {
            EditState::Editing { text, .. } => Some(text.as_str()),
            EditState::Idle => None,
        }
    }

    pub fn edit_text_mut(&mut self) -> Option<&mut String> {
        match &mut self.edit {
            EditState::Editing { text, .. } => Some(text),
            EditState::Idle => None,
        }
    }

    /// Start editing `id`, seeded with its current text. Any other edit in
    /// progress is dropped.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        let Some(text) = self.get(id).map(|p| p.text.clone()) else {
            return false;
        };
        self.edit = EditState::Editing { id, text };
        true
    }

    /// Commit the edit text to `id`. Empty text is rejected and leaves edit
    /// mode active.
    pub fn save_edit(&mut self, id: i64) -> bool {
        let text = match &self.edit {
            EditState::Editing { id: editing, text } if *editing == id => text.trim().to_string(),
            _ => return false,
        };
        if text.is_empty() {
            return false;
        }
        let Some(prompt) = self.get_mut(id) else {
            return false;
        };
        prompt.text = text;
        self.edit = EditState::Idle;
        true
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditState::Idle;
    }

    // ── Delete confirmation ──

    pub fn delete_state(&self) -> DeleteState {
        self.delete
    }

    pub fn pending_delete(&self) -> Option<i64> {
        match self.delete {
            DeleteState::PendingConfirmation(id) => Some(id),
            DeleteState::Idle => None,
        }
    }

    /// Ask for confirmation before deleting `id`. Replaces any other pending
    /// request.
    pub fn request_delete(&mut self, id: i64) {
        if self.get(id).is_some() {
            self.delete = DeleteState::PendingConfirmation(id);
        }
    }

    /// Delete `id` if it is the one awaiting confirmation.
    pub fn confirm_delete(&mut self, id: i64) -> bool {
        if self.delete != DeleteState::PendingConfirmation(id) {
            return false;
        }
        self.delete = DeleteState::Idle;
        self.delete(id)
    }

    pub fn cancel_delete_request(&mut self) {
        self.delete = DeleteState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library(entries: &[(i64, &str, bool)]) -> PromptLibrary {
        PromptLibrary::new(
            entries
                .iter()
                .map(|&(id, text, favourite)| Prompt { id, text: text.to_string(), favourite })
                .collect(),
        )
    }

    fn ids(lib: &PromptLibrary) -> Vec<i64> {
        lib.prompts().iter().map(|p| p.id).collect()
    }

    // ── add ──

    #[test]
    fn add_prepends_trimmed_non_favourite() {
        let mut lib = library(&[(1, "old", true)]);
        let id = lib.add("  new prompt \n").unwrap();
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.prompts()[0].id, id);
        assert_eq!(lib.prompts()[0].text, "new prompt");
        assert!(!lib.prompts()[0].favourite);
        assert_eq!(lib.prompts()[1].id, 1);
    }

    #[test]
    fn add_empty_or_whitespace_is_noop() {
        let mut lib = library(&[(1, "a", false)]);
        assert_eq!(lib.add(""), None);
        assert_eq!(lib.add("   "), None);
        assert_eq!(lib.add("\n\t"), None);
        assert_eq!(ids(&lib), vec![1]);
    }

    #[test]
    fn add_issues_unique_increasing_ids() {
        let mut lib = PromptLibrary::default();
        let mut issued = Vec::new();
        for i in 0..50 {
            issued.push(lib.add(&format!("p{i}")).unwrap());
        }
        for pair in issued.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn ids_not_reused_after_delete() {
        let mut lib = PromptLibrary::default();
        let a = lib.add("a").unwrap();
        assert!(lib.delete(a));
        let b = lib.add("b").unwrap();
        assert!(b > a);
    }

    #[test]
    fn ids_start_above_loaded_max() {
        let far_future = chrono::Utc::now().timestamp_millis() + 1_000_000;
        let mut lib = library(&[(far_future, "future", false)]);
        let id = lib.add("next").unwrap();
        assert_eq!(id, far_future + 1);
    }

    #[test]
    fn add_after_max_id_is_refused_without_reuse() {
        let mut lib = library(&[(i64::MAX, "last", false)]);
        assert_eq!(lib.add("next"), None);
        assert_eq!(lib.add("again"), None);
        assert_eq!(ids(&lib), vec![i64::MAX]);
    }

    #[test]
    fn max_id_loaded_from_store_does_not_panic() {
        use crate::store::{load_or_empty, MemoryStore};
        let store = MemoryStore::with_raw(r#"[{"id":9223372036854775807,"text":"a"}]"#);
        let mut lib = PromptLibrary::new(load_or_empty(&store));
        assert_eq!(lib.add("b"), None);
        assert_eq!(lib.len(), 1);
    }

    // ── delete ──

    #[test]
    fn delete_removes_only_matching() {
        let mut lib = library(&[(3, "c", false), (2, "b", false), (1, "a", false)]);
        assert!(lib.delete(2));
        assert_eq!(ids(&lib), vec![3, 1]);
    }

    #[test]
    fn delete_is_idempotent() {
        let mut lib = library(&[(1, "a", false)]);
        assert!(lib.delete(1));
        assert!(!lib.delete(1));
        assert!(lib.is_empty());
    }

    #[test]
    fn delete_clears_edit_and_pending_for_that_id() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        lib.begin_edit(1);
        lib.request_delete(1);
        assert!(lib.delete(1));
        assert_eq!(lib.edit_state(), &EditState::Idle);
        assert_eq!(lib.delete_state(), DeleteState::Idle);
    }

    #[test]
    fn delete_keeps_state_for_other_ids() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        lib.begin_edit(2);
        lib.request_delete(2);
        assert!(lib.delete(1));
        assert_eq!(lib.editing_id(), Some(2));
        assert_eq!(lib.pending_delete(), Some(2));
    }

    // ── toggle_favourite ──

    #[test]
    fn toggle_favourite_twice_restores() {
        let mut lib = library(&[(1, "a", false), (2, "b", true)]);
        let before = lib.prompts().to_vec();
        assert!(lib.toggle_favourite(1));
        assert!(lib.get(1).unwrap().favourite);
        assert_eq!(lib.get(2), before.get(1));
        assert!(lib.toggle_favourite(1));
        assert_eq!(lib.prompts(), before.as_slice());
    }

    #[test]
    fn toggle_favourite_missing_is_noop() {
        let mut lib = library(&[(1, "a", false)]);
        assert!(!lib.toggle_favourite(99));
        assert!(!lib.get(1).unwrap().favourite);
    }

    #[test]
    fn toggle_favourite_keeps_position_and_edit() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        lib.begin_edit(2);
        lib.toggle_favourite(2);
        assert_eq!(ids(&lib), vec![1, 2]);
        assert_eq!(lib.editing_id(), Some(2));
    }

    // ── edit ──

    #[test]
    fn begin_edit_seeds_text() {
        let mut lib = library(&[(1, "original", false)]);
        assert!(lib.begin_edit(1));
        assert_eq!(lib.edit_text(), Some("original"));
    }

    #[test]
    fn begin_edit_missing_is_noop() {
        let mut lib = library(&[(1, "a", false)]);
        assert!(!lib.begin_edit(5));
        assert_eq!(lib.edit_state(), &EditState::Idle);
    }

    #[test]
    fn begin_edit_on_other_abandons_unsaved() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        lib.begin_edit(1);
        lib.edit_text_mut().unwrap().push_str(" changed");
        lib.begin_edit(2);
        assert_eq!(lib.editing_id(), Some(2));
        assert_eq!(lib.edit_text(), Some("b"));
        assert_eq!(lib.get(1).unwrap().text, "a");
    }

    #[test]
    fn save_edit_updates_in_place() {
        let mut lib = library(&[(1, "a", true), (2, "b", false)]);
        lib.begin_edit(2);
        *lib.edit_text_mut().unwrap() = "  updated  ".to_string();
        assert!(lib.save_edit(2));
        assert_eq!(ids(&lib), vec![1, 2]);
        assert_eq!(lib.get(2).unwrap().text, "updated");
        assert!(!lib.get(2).unwrap().favourite);
        assert_eq!(lib.edit_state(), &EditState::Idle);
    }

    #[test]
    fn save_edit_empty_is_rejected_and_stays_editing() {
        let mut lib = library(&[(1, "keep me", false)]);
        lib.begin_edit(1);
        assert_eq!(lib.edit_text(), Some("keep me"));
        lib.edit_text_mut().unwrap().clear();
        assert!(!lib.save_edit(1));
        assert_eq!(lib.get(1).unwrap().text, "keep me");
        assert_eq!(lib.editing_id(), Some(1));
    }

    #[test]
    fn save_edit_for_other_id_is_noop() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        lib.begin_edit(1);
        *lib.edit_text_mut().unwrap() = "x".to_string();
        assert!(!lib.save_edit(2));
        assert_eq!(lib.get(2).unwrap().text, "b");
        assert_eq!(lib.editing_id(), Some(1));
    }

    #[test]
    fn cancel_edit_discards() {
        let mut lib = library(&[(1, "a", false)]);
        lib.begin_edit(1);
        *lib.edit_text_mut().unwrap() = "zzz".to_string();
        lib.cancel_edit();
        assert_eq!(lib.edit_state(), &EditState::Idle);
        assert!(lib.edit_text_mut().is_none());
        assert_eq!(lib.get(1).unwrap().text, "a");
    }

    // ── delete confirmation ──

    #[test]
    fn request_then_confirm_deletes() {
        let mut lib = library(&[(1, "a", false)]);
        lib.request_delete(1);
        assert_eq!(lib.delete_state(), DeleteState::PendingConfirmation(1));
        assert!(lib.confirm_delete(1));
        assert!(lib.is_empty());
        assert_eq!(lib.delete_state(), DeleteState::Idle);
    }

    #[test]
    fn switching_target_then_confirm_deletes_only_second() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        lib.request_delete(1);
        lib.request_delete(2);
        assert_eq!(lib.pending_delete(), Some(2));
        assert!(lib.confirm_delete(2));
        assert_eq!(ids(&lib), vec![1]);
        assert_eq!(lib.delete_state(), DeleteState::Idle);
    }

    #[test]
    fn confirm_without_matching_request_is_noop() {
        let mut lib = library(&[(1, "a", false), (2, "b", false)]);
        assert!(!lib.confirm_delete(1));
        lib.request_delete(2);
        assert!(!lib.confirm_delete(1));
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.pending_delete(), Some(2));
    }

    #[test]
    fn cancel_delete_request_returns_to_idle() {
        let mut lib = library(&[(1, "a", false)]);
        lib.request_delete(1);
        lib.cancel_delete_request();
        assert_eq!(lib.delete_state(), DeleteState::Idle);
        assert_eq!(lib.len(), 1);
    }

    #[test]
    fn request_delete_missing_is_ignored() {
        let mut lib = library(&[(1, "a", false)]);
        lib.request_delete(42);
        assert_eq!(lib.delete_state(), DeleteState::Idle);
    }

    #[test]
    fn favourite_count() {
        let lib = library(&[(1, "a", true), (2, "b", false), (3, "c", true)]);
        assert_eq!(lib.favourite_count(), 2);
    }
}
