use std::path::PathBuf;

use anyhow::Result;

use footdb_terminal::config::DbConfig;
use footdb_terminal::seed;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let path = match std::env::args().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => DbConfig::from_env().path,
    };

    let summary = seed::seed_demo_db(&path)?;
    println!(
        "Seeded {} with {} results and {} shootouts",
        path.display(),
        summary.results,
        summary.shootouts
    );
    Ok(())
}
