mod commands;

use std::path::PathBuf;

use promptlib_core::config;
use promptlib_core::logging;
use promptlib_core::store::FileStore;

fn main() {
    logging::init_stderr("warn");
    let args: Vec<String> = std::env::args().collect();
    let code = run(&args);
    std::process::exit(code);
}

fn run(args: &[String]) -> i32 {
    let mut rest = args.get(1..).unwrap_or_default();
    let mut data_dir = None;
    if rest.first().map(String::as_str) == Some("--data-dir") {
        let Some(dir) = rest.get(1) else {
            eprintln!("Error: --data-dir requires a path argument");
            return 1;
        };
        data_dir = Some(PathBuf::from(dir));
        rest = &rest[2..];
    }

    let Some(cmd) = rest.first().map(String::as_str) else {
        cmd_help();
        return 1;
    };
    let sub = &rest[1..];
    match cmd {
        "help" | "--help" | "-h" => cmd_help(),
        "config" => commands::config::cmd_config(sub),
        "list" | "count" | "path" | "add" | "fav" | "remove" | "theme" => {
            let store = match open_store(data_dir) {
                Ok(s) => s,
                Err(code) => return code,
            };
            match cmd {
                "list" => commands::store::cmd_list(&store, sub),
                "count" => commands::store::cmd_count(&store),
                "path" => commands::store::cmd_path(&store),
                "add" => commands::store::cmd_add(&store, sub),
                "fav" => commands::store::cmd_fav(&store, sub),
                "remove" => commands::store::cmd_remove(&store, sub),
                _ => commands::theme::cmd_theme(&store, sub),
            }
        }
        other => {
            eprintln!("Unknown command: {other}");
            cmd_help();
            1
        }
    }
}

/// The store under `--data-dir`, or the configured/default data directory.
fn open_store(data_dir: Option<PathBuf>) -> Result<FileStore, i32> {
    match data_dir.or_else(|| config::data_dir(&config::load_settings())) {
        Some(dir) => Ok(FileStore::new(dir)),
        None => {
            eprintln!("Cannot determine data directory.");
            Err(1)
        }
    }
}

fn cmd_help() -> i32 {
    println!("promptlib-cli {}", env!("CARGO_PKG_VERSION"));
    println!("Scriptable access to the promptlib prompt library.");
    println!();
    println!("Usage: promptlib-cli [--data-dir <path>] <command> [options]");
    println!();
    println!("Commands:");
    println!("  list [--favourites] [--search <text>]");
    println!("                      List stored prompts, newest first");
    println!("  count               Show total and favourite counts");
    println!("  path                Print the data directory");
    println!("  add <text...>       Add a prompt");
    println!("  fav <id>            Star or unstar a prompt");
    println!("  remove <id>         Delete a prompt");
    println!("  theme [light|dark|toggle]");
    println!("                      Show or change the theme");
    println!("  config              Manage config file");
    println!("    path              Print config file path");
    println!("    edit              Open config in $EDITOR");
    println!("    init [--force]    Create config with defaults");
    println!();
    println!("Set PROMPTLIB_LOG (e.g. PROMPTLIB_LOG=debug) for diagnostics.");
    println!();
    println!("Examples:");
    println!("  promptlib-cli add \"Summarise this in three bullet points\"");
    println!("  promptlib-cli list --search summary");
    println!("  promptlib-cli theme toggle");
    println!("  promptlib-cli config init");
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("promptlib-cli")
            .chain(v.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn run_help_variants() {
        assert_eq!(run(&args(&["help"])), 0);
        assert_eq!(run(&args(&["--help"])), 0);
        assert_eq!(run(&args(&["-h"])), 0);
    }

    #[test]
    fn run_no_args_shows_help() {
        assert_eq!(run(&args(&[])), 1);
    }

    #[test]
    fn run_unknown_shows_help() {
        assert_eq!(run(&args(&["bogus"])), 1);
    }

    #[test]
    fn data_dir_requires_value() {
        assert_eq!(run(&args(&["--data-dir"])), 1);
    }

    #[test]
    fn commands_use_data_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        assert_eq!(run(&args(&["--data-dir", d, "add", "hello", "world"])), 0);
        assert_eq!(run(&args(&["--data-dir", d, "theme", "dark"])), 0);
        assert_eq!(run(&args(&["--data-dir", d, "list"])), 0);

        let content = std::fs::read_to_string(dir.path().join("prompts.json")).unwrap();
        assert!(content.contains("hello world"));
        let theme = std::fs::read_to_string(dir.path().join("theme")).unwrap();
        assert_eq!(theme.trim(), "dark");
    }

    #[test]
    fn subcommand_errors_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let d = dir.path().to_str().unwrap();
        assert_eq!(run(&args(&["--data-dir", d, "fav"])), 1);
        assert_eq!(run(&args(&["--data-dir", d, "remove", "abc"])), 1);
        assert_eq!(run(&args(&["--data-dir", d, "add"])), 1);
        assert_eq!(run(&args(&["config"])), 1);
    }
}
