/// Provider-imposed ceiling on `registration_ids` per request.
pub const MAX_RECIPIENTS_PER_REQUEST: usize = 1000;

/// # Summary
/// Splits an owned recipient list into consecutive batches.
///
/// # Invariants
/// * Order is preserved; concatenating the batches yields the input.
/// * Every batch holds at most `size` tokens, only the last may be shorter.
/// * Tokens are moved into the batches, never cloned.
///
/// # Arguments
/// * `tokens` - The full recipient list.
/// * `size` - Maximum batch size. Zero is treated as one.
///
/// # Returns
/// * An iterator over `ceil(len / size)` batches. Empty input yields none.
pub fn into_batches(tokens: Vec<String>, size: usize) -> impl Iterator<Item = Vec<String>> {
    let size = size.max(1);
    let mut tokens = tokens.into_iter().peekable();
    std::iter::from_fn(move || {
        tokens.peek()?;
        Some(tokens.by_ref().take(size).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("token-{}", i)).collect()
    }

    #[test]
    fn test_batch_sizes() {
        let sizes: Vec<usize> = into_batches(tokens(2500), MAX_RECIPIENTS_PER_REQUEST)
            .map(|b| b.len())
            .collect();
        assert_eq!(sizes, vec![1000, 1000, 500]);
    }

    #[test]
    fn test_batches_rebuild_original_list() {
        for n in [1, 999, 1000, 1001, 3000] {
            let list = tokens(n);
            let batches: Vec<Vec<String>> =
                into_batches(list.clone(), MAX_RECIPIENTS_PER_REQUEST).collect();
            assert_eq!(batches.len(), n.div_ceil(MAX_RECIPIENTS_PER_REQUEST));
            assert_eq!(batches.concat(), list);
        }
    }

    #[test]
    fn test_empty_list_has_no_batches() {
        assert_eq!(into_batches(Vec::new(), MAX_RECIPIENTS_PER_REQUEST).count(), 0);
    }

    #[test]
    fn test_zero_size_does_not_panic() {
        assert_eq!(into_batches(tokens(3), 0).count(), 3);
    }
}
