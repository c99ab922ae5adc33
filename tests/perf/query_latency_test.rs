use std::time::Instant;

use crate::index_store::IndexEntry;
use crate::model::Domain;
use crate::normalize::build_result_set;
use crate::search::search;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn warm_search_and_rank_p95_under_15ms() {
    let mut entries: Vec<IndexEntry> = (0..10_000)
        .map(|i| {
            IndexEntry::new(
                format!("Document_{i:05}.txt"),
                format!("/Users/me/Documents/Document_{i:05}.txt"),
            )
        })
        .collect();

    entries.push(IndexEntry::new(
        "Q4_Report.xlsx",
        "/Users/me/Reports/Q4_Report.xlsx",
    ));
    entries.push(IndexEntry::new("Reporter.app", "/Applications/Reporter.app"));

    let run = |seq: u64| {
        let raw = search(&entries, "q4 reort", 20);
        build_result_set(Domain::Files, seq, "q4 reort", raw)
    };

    for seq in 0..30 {
        let _ = run(seq);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for batch in 0..5u64 {
        let mut samples = Vec::with_capacity(80);
        for sample in 0..80u64 {
            let start = Instant::now();
            let set = run(batch * 100 + sample);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
            assert!(!set.is_empty(), "report should still match");
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 15.0,
        "median batch p95 too high: {median_p95:.3}ms (limit 15.0ms); batches={batch_p95:?}",
    );
}
