use promptlib_core::prompt::Theme;
use promptlib_core::store::Store;

pub fn cmd_theme(store: &dyn Store, args: &[String]) -> i32 {
    let current = match store.load_theme() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Cannot read theme: {e}");
            return 1;
        }
    };
    let next = match args.first().map(|s| s.as_str()) {
        None => {
            println!("{}", current.as_str());
            return 0;
        }
        Some("light") => Theme::Light,
        Some("dark") => Theme::Dark,
        Some("toggle") => current.toggle(),
        Some(other) => {
            eprintln!("Unknown theme: {other}");
            eprintln!("Usage: promptlib-cli theme [light|dark|toggle]");
            return 1;
        }
    };
    if next != current {
        if let Err(e) = store.save_theme(next) {
            eprintln!("Failed to save theme: {e}");
            return 1;
        }
    }
    println!("Theme: {}", next.as_str());
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptlib_core::store::MemoryStore;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn show_does_not_write() {
        let store = MemoryStore::new();
        assert_eq!(cmd_theme(&store, &[]), 0);
        assert_eq!(store.theme_saves(), 0);
    }

    #[test]
    fn set_and_toggle() {
        let store = MemoryStore::new();
        assert_eq!(cmd_theme(&store, &args(&["dark"])), 0);
        assert_eq!(store.load_theme().unwrap(), Theme::Dark);
        assert_eq!(cmd_theme(&store, &args(&["toggle"])), 0);
        assert_eq!(store.load_theme().unwrap(), Theme::Light);
        assert_eq!(store.theme_saves(), 2);
    }

    #[test]
    fn setting_same_theme_skips_write() {
        let store = MemoryStore::new();
        assert_eq!(cmd_theme(&store, &args(&["light"])), 0);
        assert_eq!(store.theme_saves(), 0);
    }

    #[test]
    fn unknown_theme_fails() {
        let store = MemoryStore::new();
        assert_eq!(cmd_theme(&store, &args(&["solarized"])), 1);
    }
}
