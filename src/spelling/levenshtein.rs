//! Levenshtein distance for spelling correction.
//!
//! Distances are counted in characters, not bytes, so Cyrillic words compare
//! the way they read.

use std::cmp::min;

/// Minimum number of single-character insertions, deletions and
/// substitutions turning one word into the other.
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    distance_rows(&a, &b, usize::MAX).unwrap_or(usize::MAX)
}

/// Levenshtein distance, or `None` as soon as it is certain to exceed
/// `threshold`.
pub fn levenshtein_distance_threshold(s1: &str, s2: &str, threshold: usize) -> Option<usize> {
    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    if a.len().abs_diff(b.len()) > threshold {
        return None;
    }
    distance_rows(&a, &b, threshold)
}

/// Two-row dynamic programming with early exit once a whole row is above
/// the threshold.
fn distance_rows(a: &[char], b: &[char], threshold: usize) -> Option<usize> {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        let mut row_min = current[0];

        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = min(
                min(previous[j + 1] + 1, current[j] + 1),
                previous[j] + cost,
            );
            row_min = min(row_min, current[j + 1]);
        }

        if row_min > threshold {
            return None;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    let distance = previous[b.len()];
    (distance <= threshold).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("скамейка", ""), 8);
        assert_eq!(levenshtein_distance("скамейка", "скамейка"), 0);
        assert_eq!(levenshtein_distance("скамека", "скамейка"), 1);
        assert_eq!(levenshtein_distance("лавка", "лавочка"), 2);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn test_levenshtein_distance_threshold() {
        assert_eq!(levenshtein_distance_threshold("скамека", "скамейка", 2), Some(1));
        assert_eq!(levenshtein_distance_threshold("лавка", "лавочка", 1), None);
        assert_eq!(levenshtein_distance_threshold("урна", "скамейка", 2), None);
        assert_eq!(levenshtein_distance_threshold("", "ab", 2), Some(2));
    }

    #[test]
    fn test_symmetry() {
        for (a, b) in [("дерево", "деревья"), ("газон", "газоны"), ("парк", "")] {
            assert_eq!(levenshtein_distance(a, b), levenshtein_distance(b, a));
        }
    }
}
