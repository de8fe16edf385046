//! Write a small log file, then inspect what object types it contains
//!
//! Run with: cargo run --example inspect_blf [path/to/file.blf]

use blf_engine::records::{AppText, CanMessage, ObjectHeader};
use blf_engine::{BlfFile, OpenMode, Record};
use std::collections::HashMap;
use std::path::PathBuf;

fn write_sample(path: &PathBuf) -> blf_engine::Result<()> {
    let mut file = BlfFile::open(path, OpenMode::Write)?;
    file.write(Record::AppText(AppText {
        text: b"sample measurement".to_vec(),
        ..Default::default()
    }))?;
    for i in 0..1000u32 {
        file.write(Record::CanMessage(CanMessage {
            header: ObjectHeader::with_time_ns(i as u64 * 1_000_000),
            channel: 1,
            id: 0x100 + (i % 16),
            dlc: 8,
            data: [i as u8; 8],
            ..Default::default()
        }))?;
    }
    file.close()
}

fn main() -> blf_engine::Result<()> {
    env_logger::init();

    let path = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let path = std::env::temp_dir().join("inspect_blf_sample.blf");
            write_sample(&path)?;
            path
        }
    };

    println!("\n═══════════════════════════════════════");
    println!("Inspecting: {:?}", path);
    println!("═══════════════════════════════════════");

    let mut file = BlfFile::open(&path, OpenMode::Read)?;
    let stats = file.statistics().clone();
    println!("Objects (header):  {}", stats.object_count);
    println!("File size:         {} bytes", stats.file_size);
    println!("Uncompressed:      {} bytes", stats.uncompressed_file_size);
    println!("Restore points:    {}\n", file.restore_points().len());

    let mut type_counts: HashMap<u32, (&'static str, usize)> = HashMap::new();
    let mut total = 0;
    while let Some(record) = file.read()? {
        type_counts
            .entry(record.object_type())
            .or_insert((record.name(), 0))
            .1 += 1;
        total += 1;
    }
    file.close()?;

    println!("Object Type Statistics:");
    println!("─────────────────────────");
    let mut types: Vec<_> = type_counts.into_iter().collect();
    types.sort_by_key(|(t, _)| *t);
    for (obj_type, (name, count)) in types {
        println!("  Type {:3} ({:<24}): {:6} objects", obj_type, name, count);
    }
    println!("\nTotal: {} objects", total);

    Ok(())
}
