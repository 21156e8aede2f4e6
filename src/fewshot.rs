//! Few-Shot Selection
//!
//! Chooses the bounded subset of historical post/response pairs that grounds
//! the LLM prompt. Selection is deterministic so that identical inputs always
//! produce identical prompts, which keeps generation reproducible under test.

use crate::course::Example;

/// Select up to `k` examples from `examples`.
///
/// When `k` covers the whole list, every example is returned in original
/// order. Otherwise the *last* `k` are taken, relative order preserved:
/// the source list is oldest-first, so the tail reflects the most recent
/// instructor behavior. `k = 0` yields an empty slice (zero-shot mode).
///
/// `k` is a count, not an offset; negative values are unrepresentable.
pub fn select(examples: &[Example], k: usize) -> &[Example] {
    let start = examples.len().saturating_sub(k);
    &examples[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(n: u32) -> Example {
        Example {
            post: format!("post {}", n),
            response: format!("response {}", n),
        }
    }

    #[test]
    fn test_all_returned_when_k_covers_list() {
        let examples: Vec<_> = (1..=3).map(example).collect();
        assert_eq!(select(&examples, 3), &examples[..]);
        assert_eq!(select(&examples, 10), &examples[..]);
    }

    #[test]
    fn test_most_recent_k_selected_in_order() {
        let examples: Vec<_> = (1..=5).map(example).collect();
        let picked = select(&examples, 2);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], example(4));
        assert_eq!(picked[1], example(5));
    }

    #[test]
    fn test_zero_shot() {
        let examples: Vec<_> = (1..=3).map(example).collect();
        assert!(select(&examples, 0).is_empty());
        assert!(select(&[], 0).is_empty());
        assert!(select(&[], 5).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let examples: Vec<_> = (1..=7).map(example).collect();
        assert_eq!(select(&examples, 3), select(&examples, 3));
    }
}
