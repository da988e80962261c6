use std::fs;

use minnow_db::{
    AggregateFunction, Condition, Database, DatabaseError, loader::load_csv_table,
    loader::load_manifest,
};

#[test]
fn test_load_manifest_and_query() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("data")).unwrap();

    fs::write(
        dir.path().join("data/people.csv"),
        "Name,Age,City\nAlice,30,Paris\n\nBob, 25 ,Lima\nCarol,41,Paris\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("cities.csv"),
        "city,country\nParis,France\nLima,Peru\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("db.lcsv"),
        "# name, path\npeople, data/people.csv\n\ncities, cities.csv\n",
    )
    .unwrap();

    let mut db = Database::new();
    let loaded = load_manifest(&mut db, dir.path().join("db.lcsv")).unwrap();
    assert_eq!(loaded, vec!["people", "cities"]);

    let people = db.get_table("people").unwrap();
    assert_eq!(people.columns, vec!["name", "age", "city"]);
    assert_eq!(people.len(), 3);
    assert_eq!(people.rows[1]["age"], "25");

    let result = db
        .execute_query("SELECT name FROM people WHERE city = 'Paris' ORDER BY -age;")
        .unwrap();
    let names: Vec<&str> = result.rows().iter().map(|r| r["name"].as_str()).collect();
    assert_eq!(names, vec!["Carol", "Alice"]);

    let joined = db.join("people", "cities", "city", "city", None).unwrap();
    assert_eq!(joined.len(), 3);
    assert_eq!(joined[1]["country"], "Peru");

    let avg = db
        .aggregate(
            "people",
            AggregateFunction::parse("AVG").unwrap(),
            "age",
            &Condition::eq("city", "Paris"),
        )
        .unwrap();
    assert_eq!(avg, Some(35.5));

    let groups = db
        .group_by("people", "city", "age", AggregateFunction::Count)
        .unwrap();
    assert_eq!(groups["Paris"], 2.0);
    assert_eq!(groups["Lima"], 1.0);
}

#[test]
fn test_ragged_rows_leave_cells_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.csv");
    fs::write(&path, "a,b,c\n1,2\n4,5,6,7\n").unwrap();

    let table = load_csv_table("t", &path).unwrap();
    assert_eq!(table.rows[0].len(), 2);
    assert!(!table.rows[0].contains_key("c"));
    assert_eq!(table.rows[1].len(), 3);
    assert_eq!(table.rows[1]["c"], "6");
}

#[test]
fn test_empty_csv_gives_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").unwrap();

    let table = load_csv_table("empty", &path).unwrap();
    assert!(table.columns.is_empty());
    assert!(table.is_empty());
}

#[test]
fn test_missing_files() {
    let dir = tempfile::tempdir().unwrap();

    let mut db = Database::new();
    let err = load_manifest(&mut db, dir.path().join("nope.lcsv")).unwrap_err();
    assert!(matches!(err, DatabaseError::Io { .. }));

    fs::write(dir.path().join("db.lcsv"), "people, people.csv\n").unwrap();
    let err = load_manifest(&mut db, dir.path().join("db.lcsv")).unwrap_err();
    assert!(matches!(err, DatabaseError::Csv { .. }));
}
