use std::path::{Path, PathBuf};

use promptlib_core::config;
use promptlib_core::keymap::Keymap;

pub fn cmd_config(args: &[String]) -> i32 {
    match args.first().map(|s| s.as_str()) {
        Some("path") => config_path(),
        Some("edit") => config_edit(),
        Some("init") => config_init(args.get(1).map(|s| s.as_str()) == Some("--force")),
        _ => {
            eprintln!("Usage: promptlib-cli config <path|edit|init>");
            eprintln!("  path           Print config file path");
            eprintln!("  edit           Open config in $EDITOR");
            eprintln!("  init [--force] Create config with defaults");
            1
        }
    }
}

fn path_or_err() -> Result<PathBuf, i32> {
    config::config_path().ok_or_else(|| {
        eprintln!("Cannot determine config path.");
        1
    })
}

fn config_path() -> i32 {
    match path_or_err() {
        Ok(p) => {
            println!("{}", p.display());
            0
        }
        Err(code) => code,
    }
}

fn config_edit() -> i32 {
    let path = match path_or_err() {
        Ok(p) => p,
        Err(code) => return code,
    };

    if !path.exists() {
        if let Err(e) = config::save_toml_config_to(&path, &Keymap::default_toml_config()) {
            eprintln!("Failed to create config file: {e}");
            return 1;
        }
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    match std::process::Command::new(&editor).arg(&path).status() {
        Ok(status) if status.success() => 0,
        Ok(_) => 1,
        Err(e) => {
            eprintln!("Failed to open editor '{editor}': {e}");
            1
        }
    }
}

fn config_init(force: bool) -> i32 {
    match path_or_err() {
        Ok(path) => init_at(&path, force),
        Err(code) => code,
    }
}

fn init_at(path: &Path, force: bool) -> i32 {
    if path.exists() && !force {
        eprintln!("Config file already exists: {}", path.display());
        eprintln!("Use --force to overwrite.");
        return 1;
    }
    if let Err(e) = config::save_toml_config_to(path, &Keymap::default_toml_config()) {
        eprintln!("Failed to write config: {e}");
        return 1;
    }
    println!("Created config: {}", path.display());
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_no_args_returns_error() {
        assert_eq!(cmd_config(&[]), 1);
        assert_eq!(cmd_config(&["bogus".to_string()]), 1);
    }

    #[test]
    fn init_writes_defaults_that_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("promptlib").join("config.toml");
        assert_eq!(init_at(&path, false), 0);

        let loaded = config::load_toml_config_from(&path);
        let keymap = Keymap::from_toml(loaded);
        assert_eq!(keymap.normal_key_hint(promptlib_core::keymap::NormalAction::Quit), "q");
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();
        assert_eq!(init_at(&path, false), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        assert_eq!(init_at(&path, true), 0);
        assert!(std::fs::read_to_string(&path).unwrap().contains("[normal]"));
    }
}
