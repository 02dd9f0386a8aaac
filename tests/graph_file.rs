use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use recount::graph::{
    format, ComponentTracker, NeighborEdge, NeighborGraphReader, NeighborGraphWriter,
    OverflowMode, StreamingGraphWriter, WriterOptions,
};
use recount::{Error, ErrorKind};

fn random_graph(rng: &mut SmallRng, num_nodes: usize) -> Vec<(usize, Vec<(usize, f64)>)> {
    (0..num_nodes)
        .map(|id| {
            let mut neighbors = Vec::new();
            for _ in 0..rng.gen_range(0..4) {
                let other = rng.gen_range(0..num_nodes);
                if other != id && !neighbors.iter().any(|&(n, _)| n == other) {
                    neighbors.push((other, rng.gen_range(0.0..0.25)));
                }
            }
            (id, neighbors)
        })
        .collect()
}

#[test]
fn records_survive_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.bin");
    let mut rng = SmallRng::seed_from_u64(1);
    let records = random_graph(&mut rng, 200);

    let mut writer = NeighborGraphWriter::create(&path, WriterOptions::default()).unwrap();
    for (id, neighbors) in &records {
        writer.append(*id, neighbors).unwrap();
    }
    let (_, n) = writer.finish().unwrap();
    assert_eq!(n, 200);

    let mut reader = NeighborGraphReader::open_path(&path).unwrap();
    assert_eq!(reader.node_count(), 200);
    let mut i = 0;
    while reader.read_next().unwrap() {
        let (id, neighbors) = &records[i];
        let list = reader.current();
        assert_eq!(list.id(), *id);
        assert_eq!(list.len(), neighbors.len() + 1);
        for (e, &(n, p)) in list.iter().zip(neighbors) {
            assert_eq!(*e, NeighborEdge::new(n, p));
        }
        //Self-edge closes every list and the probabilities add up to one
        assert_eq!(list.edges().last().unwrap().id, *id);
        assert!((list.prob_sum() - 1.0).abs() < 1e-12);
        i += 1;
    }
    assert_eq!(i, 200);
}

#[test]
fn streaming_and_seekable_writers_agree() {
    let mut rng = SmallRng::seed_from_u64(2);
    let records = random_graph(&mut rng, 50);

    let dir = tempfile::tempdir().unwrap();
    let seek_path = dir.path().join("seek.bin");
    let mut writer = NeighborGraphWriter::create(&seek_path, WriterOptions::default()).unwrap();
    for (id, neighbors) in &records {
        writer.append(*id, neighbors).unwrap();
    }
    writer.finish().unwrap();

    let mut streamed = Vec::new();
    let mut writer =
        StreamingGraphWriter::new(&mut streamed, records.len() as u64, WriterOptions::default())
            .unwrap();
    for (id, neighbors) in &records {
        writer.append(*id, neighbors).unwrap();
    }
    writer.finish().unwrap();

    assert_eq!(std::fs::read(&seek_path).unwrap(), streamed);
}

#[test]
fn crash_before_finish_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.bin");
    {
        let mut writer = NeighborGraphWriter::create(&path, WriterOptions::default()).unwrap();
        writer.append(0, &[(1, 0.1)]).unwrap();
        writer.append(1, &[]).unwrap();
    }

    let mut reader = NeighborGraphReader::open_path(&path).unwrap();
    assert_eq!(reader.node_count(), 0);
    let err = reader.read_next().unwrap_err();
    assert!(matches!(err, Error::NodeCountMismatch { declared: 0, .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn missing_and_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = NeighborGraphReader::open_path(dir.path().join("nope.bin"));
    assert!(matches!(missing, Err(Error::FileNotFound { .. })));

    let path = dir.path().join("text.bin");
    let mut f = BufWriter::new(File::create(&path).unwrap());
    writeln!(f, "this is not a neighbor graph at all").unwrap();
    drop(f);
    assert!(matches!(
        NeighborGraphReader::open_path(&path),
        Err(Error::BadSignature { .. })
    ));
}

#[test]
fn strict_mode_leaves_no_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strict.bin");
    let options = WriterOptions {
        overflow: OverflowMode::Strict,
        ..Default::default()
    };
    let mut writer = NeighborGraphWriter::create(&path, options).unwrap();
    writer.append(0, &[(1, 0.2)]).unwrap();
    assert!(writer.append(1, &[(0, 0.45), (2, 0.45), (3, 0.45)]).is_err());
    writer.append(2, &[]).unwrap();
    writer.finish().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[..16], format::SIGNATURE);
    let mut reader = NeighborGraphReader::open(std::io::Cursor::new(bytes)).unwrap();
    let mut ids = Vec::new();
    reader
        .for_each_record(|list| {
            ids.push(list.id());
            Ok(())
        })
        .unwrap();
    assert_eq!(ids, vec![0, 2]);
}

#[test]
fn components_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cc.bin");
    let mut writer = NeighborGraphWriter::create(&path, WriterOptions::default()).unwrap();
    writer.append(0, &[(1, 0.1)]).unwrap();
    writer.append(1, &[(2, 0.1)]).unwrap();
    writer.append(3, &[(4, 0.1)]).unwrap();
    writer.finish().unwrap();

    let mut reader: NeighborGraphReader<BufReader<File>> =
        NeighborGraphReader::open_path(&path).unwrap();
    let n = reader.id_bound().unwrap();
    assert_eq!(n, 5);

    let mut tracker = ComponentTracker::new(n);
    tracker.add_graph(&mut reader).unwrap();
    let mut out = Vec::new();
    assert_eq!(tracker.get_node_components(&mut out), 2);
    assert_eq!(out, vec![0, 0, 0, 1, 1]);
}
