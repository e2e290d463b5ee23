use promptlib_core::library::PromptLibrary;
use promptlib_core::prompt::Prompt;
use promptlib_core::store::{FileStore, Store};
use promptlib_core::view::ViewFilter;
use tracing::debug;

const TEXT_WIDTH: usize = 60;

/// Unreadable or malformed data is an error here, never an empty collection.
fn load(store: &dyn Store) -> Result<Vec<Prompt>, i32> {
    store.load().map_err(|e| {
        eprintln!("Cannot read stored prompts: {e}");
        1
    })
}

fn save(store: &dyn Store, prompts: &[Prompt]) -> Result<(), i32> {
    store.save(prompts).map_err(|e| {
        eprintln!("Failed to save prompts: {e}");
        1
    })
}

fn parse_id(args: &[String], usage: &str) -> Result<i64, i32> {
    let Some(raw) = args.first() else {
        eprintln!("Usage: {usage}");
        return Err(1);
    };
    raw.parse().map_err(|_| {
        eprintln!("Invalid prompt id: {raw}");
        1
    })
}

/// One display line: newlines flattened, long text cut on a char boundary.
fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > TEXT_WIDTH {
        let cut: String = flat.chars().take(TEXT_WIDTH - 3).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

pub fn cmd_list(store: &dyn Store, args: &[String]) -> i32 {
    let mut filter = ViewFilter::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--favourites" | "-f" => filter.favourites_only = true,
            "--search" | "-s" => match iter.next() {
                Some(q) => filter.search = q.clone(),
                None => {
                    eprintln!("Error: --search requires a value");
                    return 1;
                }
            },
            other => {
                eprintln!("Unknown option for list: {other}");
                eprintln!("Usage: promptlib-cli list [--favourites] [--search <text>]");
                return 1;
            }
        }
    }

    let prompts = match load(store) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let shown = filter.apply(&prompts);
    debug!(total = prompts.len(), shown = shown.len(), "listing prompts");
    if shown.is_empty() {
        if prompts.is_empty() {
            println!("No stored prompts.");
        } else {
            println!("No matching prompts.");
        }
        return 0;
    }

    println!("{:<15} {:<2} PROMPT", "ID", "");
    println!("{}", "-".repeat(TEXT_WIDTH + 19));
    for p in &shown {
        println!("{:<15} {:<2} {}", p.id, p.star(), preview(&p.text));
    }
    if filter.is_active() {
        println!("\n{} of {} prompt(s) shown.", shown.len(), prompts.len());
    } else {
        println!("\n{} prompt(s) total.", prompts.len());
    }
    0
}

pub fn cmd_count(store: &dyn Store) -> i32 {
    let prompts = match load(store) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let favourites = prompts.iter().filter(|p| p.favourite).count();
    println!("favourites: {favourites}");
    println!("total: {}", prompts.len());
    0
}

pub fn cmd_path(store: &FileStore) -> i32 {
    println!("{}", store.dir().display());
    0
}

pub fn cmd_add(store: &dyn Store, args: &[String]) -> i32 {
    let text = args.join(" ");
    let mut library = match load(store) {
        Ok(p) => PromptLibrary::new(p),
        Err(code) => return code,
    };
    if text.trim().is_empty() {
        eprintln!("Usage: promptlib-cli add <text...>");
        eprintln!("Prompt text must not be empty.");
        return 1;
    }
    let Some(id) = library.add(&text) else {
        eprintln!("No unused prompt id is left; nothing added.");
        return 1;
    };
    if let Err(code) = save(store, library.prompts()) {
        return code;
    }
    println!("Added prompt {id}.");
    0
}

pub fn cmd_fav(store: &dyn Store, args: &[String]) -> i32 {
    let id = match parse_id(args, "promptlib-cli fav <id>") {
        Ok(id) => id,
        Err(code) => return code,
    };
    let mut library = match load(store) {
        Ok(p) => PromptLibrary::new(p),
        Err(code) => return code,
    };
    if !library.toggle_favourite(id) {
        eprintln!("No prompt with id {id}.");
        return 1;
    }
    if let Err(code) = save(store, library.prompts()) {
        return code;
    }
    match library.get(id) {
        Some(p) if p.favourite => println!("Starred prompt {id}."),
        _ => println!("Unstarred prompt {id}."),
    }
    0
}

pub fn cmd_remove(store: &dyn Store, args: &[String]) -> i32 {
    let id = match parse_id(args, "promptlib-cli remove <id>") {
        Ok(id) => id,
        Err(code) => return code,
    };
    let mut library = match load(store) {
        Ok(p) => PromptLibrary::new(p),
        Err(code) => return code,
    };
    if !library.delete(id) {
        eprintln!("No prompt with id {id}.");
        return 1;
    }
    if let Err(code) = save(store, library.prompts()) {
        return code;
    }
    println!("Removed prompt {id}.");
    0
}
