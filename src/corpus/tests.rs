use super::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_corpus(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("guides.csv");
    fs::write(&path, content).expect("write corpus");
    (dir, path)
}

#[test]
fn loads_title_body_corpus() {
    let (_dir, path) = write_corpus(
        "title,body\n進化素材,ルビーは序盤に温存する\n編成,壁役は前衛に2体置く\n",
    );

    let texts = load_corpus(&path).expect("load corpus");

    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "進化素材：ルビーは序盤に温存する");
    assert_eq!(texts[1], "編成：壁役は前衛に2体置く");
}

#[test]
fn loads_text_corpus() {
    let (_dir, path) = write_corpus("text\nfirst passage\nsecond passage\n");

    let texts = load_corpus(&path).expect("load corpus");

    assert_eq!(texts, vec!["first passage", "second passage"]);
}

#[test]
fn skips_blank_rows() {
    let (_dir, path) = write_corpus("title,body\nfirst,passage\n,\n  ,  \nsecond,passage\n");

    let texts = load_corpus(&path).expect("load corpus");

    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], "first：passage");
    assert_eq!(texts[1], "second：passage");
}

#[test]
fn partial_rows_keep_remaining_column() {
    let (_dir, path) = write_corpus("title,body\nonly title,\n,only body\n");

    let texts = load_corpus(&path).expect("load corpus");

    assert_eq!(texts, vec!["only title", "only body"]);
}

#[test]
fn header_whitespace_is_tolerated() {
    let (_dir, path) = write_corpus("title , body\na,b\n");

    let texts = load_corpus(&path).expect("load corpus");

    assert_eq!(texts, vec!["a：b"]);
}

#[test]
fn quoted_fields_keep_embedded_commas() {
    let (_dir, path) =
        write_corpus("title,body\n\"boss, final\",\"open the gate, then circle left\"\n");

    let texts = load_corpus(&path).expect("load corpus");

    assert_eq!(texts, vec!["boss, final：open the gate, then circle left"]);
}

#[test]
fn unknown_columns_are_rejected() {
    let (_dir, path) = write_corpus("foo,bar\n1,2\n");

    let result = load_corpus(&path);
    assert!(matches!(result, Err(GuideError::Schema(_))));
}

#[test]
fn empty_corpus_is_rejected() {
    let (_dir, path) = write_corpus("title,body\n");

    let result = load_corpus(&path);
    assert!(matches!(result, Err(GuideError::Schema(_))));
}

#[test]
fn missing_file_is_rejected() {
    let dir = TempDir::new().expect("create temp dir");

    let result = load_corpus(dir.path().join("missing.csv"));
    assert!(matches!(result, Err(GuideError::Schema(_))));
}
