use serde::{Deserialize, Serialize};

/// A user-authored text snippet.
///
/// `favourite` is optional on disk (older collections omit it) but always
/// written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub favourite: bool,
}

impl Prompt {
    pub fn new(id: i64, text: String) -> Self {
        Self {
            id,
            text,
            favourite: false,
        }
    }

    pub fn star(&self) -> &str {
        if self.favourite { "★" } else { "☆" }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Anything other than the literal `dark` reads as light.
    pub fn parse(s: &str) -> Self {
        if s.trim() == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Label for the toggle control: names the theme you would switch to.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Light => "Dark mode",
            Theme::Dark => "Light mode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Prompt ──

    #[test]
    fn new_prompt_is_not_favourite() {
        let p = Prompt::new(7, "hello".to_string());
        assert_eq!(p.id, 7);
        assert_eq!(p.text, "hello");
        assert!(!p.favourite);
    }

    #[test]
    fn star_reflects_favourite() {
        let mut p = Prompt::new(1, "x".to_string());
        assert_eq!(p.star(), "☆");
        p.favourite = true;
        assert_eq!(p.star(), "★");
    }

    #[test]
    fn deserialize_without_favourite_defaults_false() {
        let p: Prompt = serde_json::from_str(r#"{"id":5,"text":"hi"}"#).unwrap();
        assert_eq!(p, Prompt::new(5, "hi".to_string()));
    }

    #[test]
    fn serialize_always_writes_favourite() {
        let json = serde_json::to_string(&Prompt::new(1, "a".to_string())).unwrap();
        assert_eq!(json, r#"{"id":1,"text":"a","favourite":false}"#);
    }

    // ── Theme ──

    #[test]
    fn theme_defaults_to_light() {
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn theme_parse() {
        assert_eq!(Theme::parse("dark"), Theme::Dark);
        assert_eq!(Theme::parse("dark\n"), Theme::Dark);
        assert_eq!(Theme::parse("light"), Theme::Light);
        assert_eq!(Theme::parse("DARK"), Theme::Light);
        assert_eq!(Theme::parse(""), Theme::Light);
    }

    #[test]
    fn theme_toggle_roundtrip() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Light.toggle().toggle(), Theme::Light);
    }

    #[test]
    fn theme_labels() {
        assert_eq!(Theme::Dark.as_str(), "dark");
        assert_eq!(Theme::Light.toggle_label(), "Dark mode");
        assert_eq!(Theme::Dark.toggle_label(), "Light mode");
    }
}
