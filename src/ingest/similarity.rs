// src/ingest/similarity.rs
//! Title similarity in [0.0, 1.0].
//!
//! Default metric is the Ratcliff/Obershelp "gestalt" ratio: `2 * M / (len(a) + len(b))`,
//! where `M` is the number of characters covered by recursively found longest common
//! blocks. Ties pick the earliest block in `a`, then in `b`. No junk heuristics.
//!
//! `Levenshtein` (`strsim::normalized_levenshtein`) is the alternative. Both give 1.0 for
//! identical non-empty strings and 0.0 when either side is empty or no character is shared.
//! The 0.8 default threshold holds for both on reworded-headline pairs such as
//! "Seoul flood warning issued" / "Seoul flood warning issued today" (0.90 / 0.81).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    #[default]
    Gestalt,
    Levenshtein,
}

impl SimilarityMetric {
    pub fn score(self, a: &str, b: &str) -> f64 {
        if a.is_empty() || b.is_empty() {
            return 0.0;
        }
        match self {
            SimilarityMetric::Gestalt => gestalt_ratio(a, b),
            SimilarityMetric::Levenshtein => strsim::normalized_levenshtein(a, b),
        }
    }

    pub fn is_similar(self, a: &str, b: &str, threshold: f64) -> bool {
        self.score(a, b) >= threshold
    }
}

/// Gestalt ratio; 0.0 if either string is empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    SimilarityMetric::Gestalt.score(a, b)
}

pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    similarity(a, b) >= threshold
}

fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Sum of block sizes found by longest-match-then-recurse on both sides.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b_index.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, &b_index, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
fn longest_match(
    a: &[char],
    b_index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run length of the match ending at b[j], for the previous row of a
    let mut prev: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut cur: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = b_index.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|pj| prev.get(&pj))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                cur.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        prev = cur;
    }
    (best_i, best_j, best_k)
}
