//! Displayed-subset filtering and scroll-position memory for the list view.

use crate::prompt::Prompt;

/// Search text plus the favourites-only switch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub search: String,
    pub favourites_only: bool,
}

impl ViewFilter {
    pub fn new(search: impl Into<String>, favourites_only: bool) -> Self {
        Self {
            search: search.into(),
            favourites_only,
        }
    }

    /// Trimmed, lower-cased search needle (empty means "no search").
    pub fn needle(&self) -> String {
        self.search.trim().to_lowercase()
    }

    pub fn is_active(&self) -> bool {
        self.favourites_only || !self.needle().is_empty()
    }

    pub fn toggle_favourites(&mut self) {
        self.favourites_only = !self.favourites_only;
    }

    pub fn matches(&self, prompt: &Prompt) -> bool {
        if self.favourites_only && !prompt.favourite {
            return false;
        }
        let needle = self.needle();
        needle.is_empty() || prompt.text.to_lowercase().contains(&needle)
    }

    /// Indices into `prompts` that survive the filter, in collection order.
    pub fn visible_indices(&self, prompts: &[Prompt]) -> Vec<usize> {
        let needle = self.needle();
        prompts
            .iter()
            .enumerate()
            .filter(|(_, p)| !self.favourites_only || p.favourite)
            .filter(|(_, p)| needle.is_empty() || p.text.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn apply<'a>(&self, prompts: &'a [Prompt]) -> Vec<&'a Prompt> {
        self.visible_indices(prompts)
            .into_iter()
            .map(|i| &prompts[i])
            .collect()
    }
}

/// Remembers a list scroll offset across a filter change and hands it back
/// exactly once, on the next render.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollMemory {
    offset: usize,
    pending: bool,
}

impl ScrollMemory {
    pub fn record(&mut self, offset: usize) {
        self.offset = offset;
        self.pending = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The recorded offset if a restore is pending; clears the pending flag.
    pub fn take(&mut self) -> Option<usize> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(self.offset)
    }
}
