use aleph_core::index_store::IndexEntry;
use aleph_core::search::search;

fn entries(names: &[&str]) -> Vec<IndexEntry> {
    names
        .iter()
        .map(|name| IndexEntry::new(*name, format!("/data/{name}")))
        .collect()
}

#[test]
fn typo_query_returns_expected_match() {
    let items = entries(&["Q4_Report.xlsx"]);
    let results = search(&items, "q4 reort", 10);
    assert_eq!(results[0].path, "/data/Q4_Report.xlsx");
    assert!(results[0].score.is_some());
}

#[test]
fn results_are_ordered_by_descending_score() {
    let items = entries(&["my-docs.txt", "doc.txt", "dxoxc.txt"]);
    let results = search(&items, "doc", 10);

    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["doc.txt", "my-docs.txt", "dxoxc.txt"]);
    assert!(results
        .windows(2)
        .all(|pair| pair[0].score.unwrap() >= pair[1].score.unwrap()));
}

#[test]
fn limit_and_blank_queries_are_respected() {
    let items = entries(&["a1.txt", "a2.txt", "a3.txt"]);
    assert_eq!(search(&items, "a", 2).len(), 2);
    assert!(search(&items, "  ", 10).is_empty());
    assert!(search(&items, "a", 0).is_empty());
    assert!(search(&items, "zzz", 10).is_empty());
}
