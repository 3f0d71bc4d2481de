use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+").expect("valid regex");
}

/// Tokenize text into (term, position) using NFKC normalization, lowercasing,
/// and splitting on non-alphanumeric boundaries.
///
/// Pure and deterministic: the same input always yields the same term
/// sequence. Indexing and querying both go through this function, so every
/// term written into the index is findable by the same term in a query.
/// Empty field text yields an empty sequence.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .enumerate()
        .map(|(pos, mat)| (mat.as_str().to_string(), pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Rust ownership, model!");
        let words: Vec<&str> = t.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["rust", "ownership", "model"]);
    }

    #[test]
    fn positions_are_sequential() {
        let t = tokenize("one two three");
        assert_eq!(t[0].1, 0);
        assert_eq!(t[1].1, 1);
        assert_eq!(t[2].1, 2);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("...---...").is_empty());
    }

    #[test]
    fn numbers_are_terms() {
        let t = tokenize("http/2 shipped in 2015");
        let words: Vec<&str> = t.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["http", "2", "shipped", "in", "2015"]);
    }
}
