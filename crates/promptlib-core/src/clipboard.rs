//! System clipboard access. Copy failures are never surfaced to the user.

use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("failed to set clipboard: {0}")]
    Write(String),
}

/// Anything text can be copied into.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard, opened on first use and kept for the session.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            let cb = arboard::Clipboard::new()
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            self.inner = Some(cb);
        }
        let Some(cb) = self.inner.as_mut() else {
            return Err(ClipboardError::Unavailable("not initialised".to_string()));
        };
        cb.set_text(text.to_string())
            .map_err(|e| ClipboardError::Write(e.to_string()))
    }
}

/// Copy `text`, swallowing any failure. Returns whether the write landed.
pub fn copy(sink: &mut dyn ClipboardSink, text: &str) -> bool {
    match sink.set_text(text) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "clipboard copy failed");
            false
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeClipboard;
    use super::*;

    #[test]
    fn copy_writes_exact_text() {
        let mut cb = FakeClipboard::default();
        assert!(copy(&mut cb, "  keep\nwhitespace "));
        assert_eq!(cb.copied, vec!["  keep\nwhitespace ".to_string()]);
    }

    #[test]
    fn copy_failure_is_swallowed() {
        let mut cb = FakeClipboard { fail: true, ..Default::default() };
        assert!(!copy(&mut cb, "x"));
        assert!(cb.copied.is_empty());
    }

    #[test]
    fn error_messages() {
        let e = ClipboardError::Write("denied".to_string());
        assert_eq!(e.to_string(), "failed to set clipboard: denied");
    }
}
