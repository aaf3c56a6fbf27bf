//! CLI smoke entry point.
//!
//! Opens (or creates) a MemoryShare database and prints what the stores
//! loaded. Usage: `memoryshare_cli [DB_PATH]`.

use memoryshare_core::{core_version, ping, AppCore};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("memoryshare.sqlite3"));

    println!("memoryshare_core ping={}", ping());
    println!("memoryshare_core version={}", core_version());

    let app = match AppCore::open(&path) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("failed to open {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let settings = app.settings();
    let store = app.memories();
    println!(
        "db={} language={} theme={} memories={} tags={} this_month={}",
        path.display(),
        settings.language().code(),
        settings.theme().code(),
        store.memories().len(),
        store.tags().len(),
        store.count_current_month()
    );
    for memory in store.memories() {
        println!(
            "{}  {}  ({:.4}, {:.4})  tags={}",
            memory.created_at.format("%Y-%m-%d"),
            memory.title,
            memory.location.latitude,
            memory.location.longitude,
            memory.tags.len()
        );
    }
    ExitCode::SUCCESS
}
