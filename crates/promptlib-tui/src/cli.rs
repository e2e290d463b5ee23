use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct LaunchOptions {
    /// Prompts to add before the first frame is drawn.
    pub prompts: Vec<String>,
    /// Overrides the configured data directory for this session.
    pub data_dir: Option<PathBuf>,
}

pub enum CliAction {
    Exit(i32),
    LaunchTui(LaunchOptions),
}

pub fn run(args: &[String]) -> CliAction {
    let mut opts = LaunchOptions::default();
    let mut rest = args.get(1..).unwrap_or_default();

    // Global option, accepted ahead of any command
    if rest.first().map(String::as_str) == Some("--data-dir") {
        let Some(dir) = rest.get(1) else {
            eprintln!("Error: --data-dir requires a path argument");
            return CliAction::Exit(1);
        };
        opts.data_dir = Some(PathBuf::from(dir));
        rest = &rest[2..];
    }

    let Some(cmd) = rest.first().map(|s| s.as_str()) else {
        return CliAction::LaunchTui(opts);
    };
    match cmd {
        "help" | "--help" | "-h" => CliAction::Exit(cmd_help()),
        "--version" | "-V" => {
            println!("promptlib {}", env!("CARGO_PKG_VERSION"));
            CliAction::Exit(0)
        }
        "import" => cmd_import(&rest[1..], opts),
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("Run 'promptlib --help' for usage.");
            CliAction::Exit(1)
        }
    }
}

fn cmd_help() -> i32 {
    println!("promptlib {}", env!("CARGO_PKG_VERSION"));
    println!("A terminal library for your reusable prompts.");
    println!();
    println!("Usage: promptlib [--data-dir <path>] [command]");
    println!();
    println!("Commands:");
    println!("  (none)              Launch the TUI");
    println!("  import <files...>   Add each file's contents as a prompt, then launch");
    println!("                      Files may also be given comma-separated");
    println!("  --help, -h          Show this help");
    println!("  --version, -V       Show the version");
    println!();
    println!("Options:");
    println!("  --data-dir <path>   Read and write prompts under <path>");
    println!();
    println!("Logs go to promptlib.log in the data directory (filter with PROMPTLIB_LOG).");
    println!();
    println!("For scripting, use promptlib-cli:");
    println!("  promptlib-cli list      Print stored prompts");
    println!("  promptlib-cli theme     Show or change the theme");
    println!("  promptlib-cli config    Manage the config file");
    0
}

fn cmd_import(args: &[String], mut opts: LaunchOptions) -> CliAction {
    if args.is_empty() {
        eprintln!("Usage: promptlib import <file1> [file2...] or <file1,file2,...>");
        return CliAction::Exit(1);
    }

    let mut prompts = Vec::new();
    for arg in args {
        for path_str in arg.split(',') {
            let path_str = path_str.trim();
            if path_str.is_empty() {
                continue;
            }
            match std::fs::read_to_string(path_str) {
                Ok(content) => {
                    let content = content.trim().to_string();
                    if content.is_empty() {
                        eprintln!("Warning: skipping empty file: {path_str}");
                    } else {
                        prompts.push(content);
                    }
                }
                Err(e) => {
                    eprintln!("Warning: cannot read {path_str}: {e}");
                }
            }
        }
    }

    if prompts.is_empty() {
        eprintln!("No prompts loaded from files.");
        return CliAction::Exit(1);
    }

    opts.prompts = prompts;
    CliAction::LaunchTui(opts)
}
