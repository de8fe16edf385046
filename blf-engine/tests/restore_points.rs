// Seeking through the restore-point index
use blf_engine::records::{CanMessage, EthernetFrameEx, ObjectHeader};
use blf_engine::store::StoreReader;
use blf_engine::stream::UncompressedStream;
use blf_engine::sync::AbortToken;
use blf_engine::{BlfFile, EngineConfig, OpenMode, Record};
use std::path::Path;
use tempfile::TempDir;

fn record(i: usize) -> Record {
    let header = ObjectHeader::with_time_ns(i as u64);
    if i % 3 == 0 {
        Record::EthernetFrameEx(EthernetFrameEx {
            header,
            frame_data: vec![i as u8; i % 300],
            ..Default::default()
        })
    } else {
        Record::CanMessage(CanMessage {
            header,
            id: i as u32,
            dlc: 8,
            ..Default::default()
        })
    }
}

fn config() -> EngineConfig {
    EngineConfig::new()
        .with_container_size(2048)
        .with_compression_level(3)
        .with_restore_point_interval(3)
}

fn write_sample(path: &Path) -> Vec<Record> {
    let records: Vec<Record> = (0..3000).map(record).collect();
    let mut file = BlfFile::open_with(path, OpenMode::Write, config()).unwrap();
    for r in &records {
        file.write(r.clone()).unwrap();
    }
    file.close().unwrap();
    records
}

/// Inflate every container from the given restore point on
fn inflate_from(path: &Path, point: Option<usize>) -> Vec<u8> {
    let mut reader = StoreReader::open(path).unwrap();
    if let Some(i) = point {
        let point = reader.restore_points()[i];
        reader.seek_to(&point).unwrap();
    }
    let mut out = Vec::new();
    while let Some(block) = reader.read_block().unwrap() {
        out.extend(block.decompress().unwrap());
    }
    out
}

#[test]
fn test_restore_point_bytes_match_linear_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bytes.blf");
    write_sample(&path);

    let linear = inflate_from(&path, None);
    let points = StoreReader::open(&path).unwrap().restore_points().to_vec();
    assert!(points.len() > 3);
    assert_eq!(points[0].logical_offset, 0);

    for (i, point) in points.iter().enumerate() {
        let seeked = inflate_from(&path, Some(i));
        assert_eq!(seeked, &linear[point.logical_offset as usize..]);
    }
}

#[test]
fn test_restore_point_records_match_linear_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.blf");
    let records = write_sample(&path);

    // Logical offset at which each record starts
    let mut offsets = Vec::with_capacity(records.len());
    let mut offset = 0u64;
    for r in &records {
        offsets.push(offset);
        offset += r.calculate_size() as u64;
    }

    let points = BlfFile::open(&path, OpenMode::Read).unwrap().restore_points().to_vec();
    for point in points.iter().skip(1) {
        let first = offsets
            .iter()
            .position(|&o| o == point.logical_offset)
            .expect("restore points lie on record boundaries");

        let mut file = BlfFile::open_at(&path, config(), point).unwrap();
        let mut tail = Vec::new();
        while let Some(r) = file.read().unwrap() {
            tail.push(r);
        }
        assert_eq!(tail.as_slice(), &records[first..]);
    }
}

#[test]
fn test_stream_starts_at_restore_point_offset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stream.blf");
    write_sample(&path);

    let mut reader = StoreReader::open(&path).unwrap();
    let point = reader.restore_points()[2];
    reader.seek_to(&point).unwrap();

    let stream = UncompressedStream::new(&config(), AbortToken::new());
    stream.start_at(point.logical_offset).unwrap();
    let block = reader.read_block().unwrap().unwrap();
    stream.write_container(block.decompress().unwrap()).unwrap();
    assert_eq!(stream.tell_read(), point.logical_offset);

    let header = stream.read(16);
    assert_eq!(&header[0..4], b"LOBJ");
}
