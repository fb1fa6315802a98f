//! `studybuddy upload`: ingest a file into the configured store.

use std::path::Path;
use studybuddy_store::{build_store, material_from_file};

pub async fn run(path: &Path, title: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    if config.storage.backend == "memory" {
        eprintln!("  Note: the memory backend forgets uploads when this command exits.");
    }

    let bytes = std::fs::read(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());

    let material = material_from_file(&filename, &bytes, title)?;
    let title = material.title.clone();
    let words = material.word_count();

    let store = build_store(&config.storage).await?;
    let id = store.store(material).await?;

    println!("  Uploaded '{title}' ({words} words)");
    println!("  ID: {id}");
    Ok(())
}
