/// Characters per token assumed by [`estimate_tokens`].
pub const CHARS_PER_TOKEN: usize = 4;

/// Rough token count for a prompt: `ceil(chars / 4)`.
///
/// This is a sizing heuristic for model selection, not a tokenizer. It carries
/// no guaranteed bound against any provider's real token count, and Japanese
/// text in particular tends to tokenize denser than this suggests.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_partial_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // 5 chars, 15 bytes
        assert_eq!(estimate_tokens("船荷証券化"), 2);
    }

    #[test]
    fn matches_ceiling_formula_across_lengths() {
        for len in 1..200usize {
            let text = "x".repeat(len);
            let expected = (len as f64 / 4.0).ceil() as usize;
            assert_eq!(estimate_tokens(&text), expected, "len={}", len);
        }
    }
}
