use crate::index_store::IndexEntry;
use crate::model::RawResult;

pub fn normalize_for_search(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Scores entry names against `query` and returns the best `limit`, highest
/// score first. Ties keep index order.
pub fn search(entries: &[IndexEntry], query: &str, limit: usize) -> Vec<RawResult> {
    if limit == 0 || entries.is_empty() {
        return Vec::new();
    }

    let normalized_query = normalize_for_search(query);
    if normalized_query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(i64, usize, &IndexEntry)> = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            score_name(entry.normalized_name(), &normalized_query).map(|score| (score, index, entry))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    scored
        .into_iter()
        .take(limit)
        .map(|(score, _, entry)| {
            RawResult::new(entry.name.clone(), entry.path.clone()).with_score(score as f32)
        })
        .collect()
}

fn score_name(normalized_name: &str, query: &str) -> Option<i64> {
    if normalized_name.is_empty() || query.is_empty() {
        return None;
    }

    if let Some(position) = normalized_name.find(query) {
        let prefix_bonus = if position == 0 { 400 } else { 0 };
        let compact_bonus = (query.len() as i64) * 40;
        let length_penalty = (normalized_name.len() as i64 - query.len() as i64).abs();
        return Some(10_000 + prefix_bonus + compact_bonus - position as i64 - length_penalty);
    }

    let positions = subsequence_positions(normalized_name, query)?;
    let start_penalty = positions[0] as i64;
    let gap_penalty: i64 = positions
        .windows(2)
        .map(|pair| pair[1].saturating_sub(pair[0] + 1) as i64)
        .sum();
    let length_penalty = (normalized_name.len() as i64 - query.len() as i64).max(0);

    Some(5_000 + (query.len() as i64) * 30 - gap_penalty * 6 - start_penalty - length_penalty)
}

fn subsequence_positions(haystack: &str, needle: &str) -> Option<Vec<usize>> {
    let mut positions = Vec::with_capacity(needle.len());
    let mut rest = haystack.char_indices();

    for wanted in needle.chars() {
        let (position, _) = rest.by_ref().find(|(_, c)| *c == wanted)?;
        positions.push(position);
    }

    Some(positions)
}
