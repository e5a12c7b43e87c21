use std::collections::HashSet;

use pretty_assertions::assert_eq;
use shelf_core::{
    annotate, merge_install_state, DetailUriTemplate, InstallState, Record, ResultSet,
};

fn installed(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

fn sample() -> ResultSet {
    ResultSet::from_records(vec![
        Record::new("c3", "Chat"),
        Record::new("a1", "Notes App"),
        Record::new("b2", "Browser").with_install_state(InstallState::Installed),
        Record::new("d4", "Dice"),
    ])
}

#[test]
fn merge_preserves_count_and_order() {
    let results = sample();
    let before: Vec<String> = results.ids().into_iter().map(String::from).collect();

    let merged = merge_install_state(results, &installed(&["a1", "d4", "not-in-results"]));

    assert_eq!(merged.len(), before.len());
    assert_eq!(merged.ids(), before.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn merge_rewrites_only_install_state() {
    let merged = merge_install_state(sample(), &installed(&["a1", "d4"]));
    let states: Vec<(&str, bool)> = merged
        .iter()
        .map(|record| (record.id(), record.is_installed()))
        .collect();

    assert_eq!(
        states,
        vec![("c3", false), ("a1", true), ("b2", false), ("d4", true)]
    );
    assert_eq!(merged.get("a1").unwrap().name(), "Notes App");
}

#[test]
fn merge_is_idempotent() {
    let lookup = installed(&["b2", "c3"]);
    let once = merge_install_state(sample(), &lookup);
    let twice = merge_install_state(once.clone(), &lookup);
    assert_eq!(twice, once);
}

#[test]
fn merge_of_empty_set_is_empty() {
    let merged = merge_install_state(ResultSet::new(), &installed(&["a1"]));
    assert!(merged.is_empty());
}

#[test]
fn notes_query_scenario() {
    let fetched: Vec<Record> =
        serde_json::from_str(r#"[{"id":"a1","name":"Notes App","installed":false}]"#).unwrap();
    let merged = merge_install_state(ResultSet::from_records(fetched), &installed(&["a1"]));

    let record = merged.get("a1").unwrap().clone();
    assert_eq!(record.install_state(), InstallState::Installed);
    assert_eq!(record.name(), "Notes App");

    let mut annotated = record;
    annotate(&mut annotated, &DetailUriTemplate::default());
    assert_eq!(annotated.detail_uri(), Some("/snap/a1"));

    // Serialized form carries the merged flag but never the derived uri.
    let json = serde_json::to_value(&annotated).unwrap();
    assert_eq!(json["installed"], true);
    assert!(json.get("detail_uri").is_none());
}
