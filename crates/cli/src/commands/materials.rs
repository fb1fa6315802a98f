//! `studybuddy materials`: list stored materials.

use studybuddy_store::build_store;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let store = build_store(&config.storage).await?;
    let materials = store.summaries().await?;

    if materials.is_empty() {
        println!("  No materials uploaded yet. Try: studybuddy upload notes.md");
        return Ok(());
    }

    println!("  {} material(s) in {} store\n", materials.len(), store.name());
    for m in &materials {
        println!("  [{}] {} ({}, {} words)", m.id, m.title, m.kind, m.word_count);
    }
    Ok(())
}
