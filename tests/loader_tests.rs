use std::io::{Cursor, Write};

use cograph::{
    CographError, Graph,
    bench_utils::{DatasetShape, generate_dataset},
    loader,
};

fn load(text: &str) -> Result<Graph, CographError> {
    loader::load_reader(Cursor::new(text.as_bytes().to_vec()))
}

#[test]
fn test_generated_graph_equals_manual_graph() {
    let loaded = loader::load_path(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/dc.tsv"))
        .expect("dc graph");

    let groups: &[(&str, &[&str])] = &[
        ("Justice League", &["Batman", "Green Arrow", "Flash", "Random Pedestrian"]),
        ("Smallville", &["Green Arrow", "Lex Luthor", "Chloe Sullivan"]),
        ("Dark Knight", &["Batman", "Joker", "Ra's al Ghul", "Scarecrow"]),
        ("The Flash", &["Flash", "Deathstroke"]),
        ("Arrow", &["Green Arrow", "Deathstroke"]),
        ("Legion of Doom", &["Lex Luthor", "Joker", "Deathstroke"]),
        ("Marvel vs DC", &["Captain America", "Batman"]),
        ("Marvel vs Capcom", &["Captain America", "Zero"]),
        (
            "Darkness",
            &["Lex Luthor", "Deathstroke", "Darkseid", "Ra's al Ghul", "Scarecrow"],
        ),
        ("The Bible", &["Daler Mehndi"]),
    ];
    let mut manual = Graph::new();
    for (group, members) in groups {
        let label = format!("\"{group}\"");
        let names: Vec<String> = members.iter().map(|m| format!("\"{m}\"")).collect();
        if names.len() == 1 {
            manual.add_vertex(&names[0]);
            continue;
        }
        for (idx, a) in names.iter().enumerate() {
            for b in &names[idx + 1..] {
                manual.add_edge(a, b, &label).expect("edge");
            }
        }
    }

    assert_eq!(loaded, manual);
    assert_eq!(loaded.vertex_count(), 14);
}

#[test]
fn test_empty_input_builds_empty_graph() {
    let graph = load("").expect("graph");
    assert_eq!(graph.vertex_count(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_groups_are_consecutive_runs() {
    // the second "g1" run is a new group with the same label
    let graph = load("a\tg1\nb\tg1\nc\tg2\nd\tg1\ne\tg1\n").expect("graph");
    assert!(graph.edges_between("a", "b").is_ok());
    assert!(graph.edges_between("d", "e").is_ok());
    assert!(graph.edges_between("a", "d").is_err());
    assert!(graph.contains_vertex("c"));
    assert!(graph.neighbours("c").expect("c").is_empty());
}

#[test]
fn test_repeated_entity_in_group_is_collapsed() {
    let graph = load("a\tg\na\tg\nb\tg\n").expect("graph");
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.vertex_count(), 2);
}

#[test]
fn test_shared_pair_gets_one_edge_per_group() {
    let graph = load("a\t1999\nb\t1999\na\t1985\nb\t1985\n").expect("graph");
    let labels: Vec<&str> = graph
        .edges_between("a", "b")
        .expect("edges")
        .iter()
        .map(|e| e.label())
        .collect();
    assert_eq!(labels, vec!["1985", "1999"]);
}

#[test]
fn test_blank_lines_are_skipped() {
    let graph = load("a\tg\n\nb\tg\n   \n").expect("graph");
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_crlf_line_endings() {
    let graph = load("a\tg\r\nb\tg\r\n").expect("graph");
    assert!(graph.edges_between("a", "b").is_ok());
}

#[test]
fn test_trailing_empty_fields_are_ignored() {
    let graph = load("a\tg\t\nb\tg\t\t\n").expect("graph");
    assert!(graph.edges_between("a", "b").is_ok());

    let record = loader::parse_record(4, "x\ty\t").expect("parse").expect("record");
    assert_eq!(record.group, "y");
    assert!(loader::parse_record(5, "x\t\t").is_err());
}

#[test]
fn test_generated_chain_loads_parallel_edges() {
    let dataset = generate_dataset(DatasetShape::Chain, 10, 0);
    let graph = dataset.load().expect("graph");
    assert_eq!(graph.vertex_count(), 10);
    // nine links plus reprints of links 0, 3 and 6
    assert_eq!(graph.edge_count(), 12);
    let labels: Vec<&str> = graph
        .edges_between(dataset.name(3), dataset.name(4))
        .expect("edges")
        .iter()
        .map(|e| e.label())
        .collect();
    assert_eq!(labels, vec!["LINK-3", "REPRINT-3"]);
}

#[test]
fn test_generated_dataset_keeps_uncast_entities() {
    let shape = DatasetShape::Random {
        groups: 3,
        max_cast: 2,
    };
    let dataset = generate_dataset(shape, 50, 7);
    let graph = dataset.load().expect("graph");
    assert_eq!(graph.vertex_count(), dataset.entity_count());
    assert_eq!(loader::load_reader(Cursor::new(dataset.to_tsv())).expect("graph"), graph);
}

#[test]
fn test_malformed_line_reports_line_number() {
    let err = load("a\tg\nb\tg\nbroken line\n").unwrap_err();
    match err {
        CographError::Ingest { line, .. } => assert_eq!(line, 3),
        other => panic!("unexpected error {other:?}"),
    }
    let err = load("a\tg\textra\n").unwrap_err();
    assert!(matches!(err, CographError::Ingest { line: 1, .. }));
}

#[test]
fn test_parse_record_fields() {
    let record = loader::parse_record(7, "\"WOLVERINE/LOGAN \"\t\"X-MEN 1\"")
        .expect("parse")
        .expect("record");
    assert_eq!(record.line, 7);
    assert_eq!(record.entity, "\"WOLVERINE/LOGAN \"");
    assert_eq!(record.group, "\"X-MEN 1\"");
    assert!(loader::parse_record(1, "").expect("parse").is_none());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = loader::load_path(dir.path().join("missing.tsv")).unwrap_err();
    assert!(matches!(err, CographError::Io(_)));
}

#[test]
fn test_large_file_streams_through_channel() {
    let mut file = tempfile::NamedTempFile::new().expect("file");
    for group in 0..500 {
        for member in 0..4 {
            writeln!(file, "c{}\tissue{group}", group * 2 + member).expect("write");
        }
    }
    file.flush().expect("flush");
    let graph = loader::load_path(file.path()).expect("graph");
    assert_eq!(graph.vertex_count(), 1002);
    assert_eq!(graph.edge_count(), 500 * 6);
}
