//! Vector similarity utilities.

use storyweaver_core::knowledge::KnowledgeRecord;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is empty, zero, or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank records by similarity to `query`.
///
/// Keeps only records scoring strictly above `threshold`, sorts descending,
/// and truncates to `limit`. The sort is stable, so equal scores keep
/// their stored order.
pub fn rank_records(
    records: Vec<KnowledgeRecord>,
    query: &[f32],
    threshold: f32,
    limit: usize,
) -> Vec<(KnowledgeRecord, f32)> {
    let mut scored: Vec<(KnowledgeRecord, f32)> = records
        .into_iter()
        .map(|record| {
            let sim = cosine_similarity(&record.embedding, query);
            (record, sim)
        })
        .filter(|(_, sim)| *sim > threshold)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
