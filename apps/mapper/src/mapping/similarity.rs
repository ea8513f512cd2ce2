//! Cosine similarity and per-requirement top-K selection.
//!
//! Pure functions, no I/O. Scores are raw cosine values in [-1, 1]; clamping
//! for display happens in the assembler.

/// Default number of experience matches kept per requirement.
pub const DEFAULT_TOP_K: usize = 5;

/// A candidate match: position in the experience corpus plus its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredIndex {
    pub index: usize,
    pub score: f32,
}

/// Cosine of the angle between `a` and `b`. Returns 0.0 when either vector has
/// zero norm. Callers guarantee equal lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Full requirement × experience matrix. Row `i` holds the scores of
/// requirement `i` against every experience item, in corpus order.
pub fn similarity_matrix(requirements: &[Vec<f32>], experiences: &[Vec<f32>]) -> Vec<Vec<f32>> {
    requirements
        .iter()
        .map(|req| {
            experiences
                .iter()
                .map(|exp| cosine_similarity(req, exp))
                .collect()
        })
        .collect()
}

/// The `k` highest scores of `row`, descending. Equal scores keep corpus
/// order (stable sort), so the lower experience index ranks first. A NaN score
/// ranks below every real score.
pub fn top_k(row: &[f32], k: usize) -> Vec<ScoredIndex> {
    let mut scored: Vec<ScoredIndex> = row
        .iter()
        .enumerate()
        .map(|(index, &score)| ScoredIndex {
            index,
            score: if score.is_nan() { f32::NEG_INFINITY } else { score },
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(k.min(row.len()));
    scored
}

/// Ranks experiences for every requirement: one `top_k` list per matrix row.
pub fn rank_matches(matrix: &[Vec<f32>], k: usize) -> Vec<Vec<ScoredIndex>> {
    matrix.iter().map(|row| top_k(row, k)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_identical_is_one() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_opposite_is_minus_one() {
        let score = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]);
        assert!((score + 1.0).abs() < 1e-6, "Score was {score}");
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let score = cosine_similarity(&[1.0, 1.0], &[10.0, 10.0]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_matrix_shape() {
        let reqs = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let exps = vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]];
        let matrix = similarity_matrix(&reqs, &exps);
        assert_eq!(matrix.len(), 2);
        assert!(matrix.iter().all(|row| row.len() == 3));
        assert!((matrix[0][0] - 1.0).abs() < 1e-6);
        assert_eq!(matrix[0][2], 0.0);
    }

    #[test]
    fn test_top_k_descending() {
        let picks = top_k(&[0.1, 0.9, 0.5, 0.7], 3);
        let indices: Vec<usize> = picks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 3, 2]);
        assert!(picks.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_top_k_ties_keep_corpus_order() {
        let picks = top_k(&[0.5, 0.8, 0.5, 0.8, 0.5], 4);
        let indices: Vec<usize> = picks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_top_k_nan_scores_rank_last() {
        let row = [0.2, f32::NAN, 0.9, 0.1, f32::NAN, 0.5, 0.95, 0.3];
        let picks = top_k(&row, 5);
        let indices: Vec<usize> = picks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![6, 2, 5, 7, 0]);
        assert!(picks.windows(2).all(|w| w[0].score >= w[1].score));

        let all = top_k(&row, row.len());
        assert_eq!(all[6].index, 1);
        assert_eq!(all[7].index, 4);
        assert_eq!(all[7].score, f32::NEG_INFINITY);
    }

    #[test]
    fn test_top_k_capped_by_row_length() {
        assert_eq!(top_k(&[0.2, 0.4], DEFAULT_TOP_K).len(), 2);
    }

    #[test]
    fn test_top_k_default_caps_at_five() {
        let row: Vec<f32> = (0..12).map(|i| i as f32 / 12.0).collect();
        let picks = top_k(&row, DEFAULT_TOP_K);
        assert_eq!(picks.len(), 5);
        assert_eq!(picks[0].index, 11);
    }

    #[test]
    fn test_rank_matches_one_list_per_row() {
        let matrix = vec![vec![0.1, 0.2], vec![0.9, 0.3]];
        let ranked = rank_matches(&matrix, 1);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0][0].index, 1);
        assert_eq!(ranked[1][0].index, 0);
    }
}
