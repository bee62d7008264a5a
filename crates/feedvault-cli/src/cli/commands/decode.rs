//! `feedvault decode <file>` – decode a captured response body.

use anyhow::{Context, Result};
use feedvault_core::decode;
use std::path::Path;

pub fn run_decode(file: &Path, encoding: Option<&str>) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let envelope = decode::decode(&raw, encoding)
        .with_context(|| format!("decode {}", file.display()))?;
    if !envelope.is_success() {
        println!(
            "error envelope: code {} ({})",
            envelope.code,
            envelope.message.as_deref().unwrap_or("no message")
        );
        return Ok(());
    }
    println!("{} records", envelope.data.list.len());
    for (i, record) in envelope.data.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                println!("  #{} unreadable: {}", i, e);
                continue;
            }
        };
        println!(
            "  {}  {}  {} image(s), {} video(s)",
            record.item.id,
            record.item.title,
            record.item.images.len(),
            record.item.videos.len()
        );
    }
    Ok(())
}
