//! Query tokenization for client-side matching and highlighting. Tokens are
//! never sent to the backend.

const STRIPPED_CHARS: [char; 3] = ['(', ')', '"'];

/// Splits `query` on whitespace runs and normalizes each piece.
///
/// `(`, `)` and `"` are removed, and a `field:value` token keeps only
/// `value`. Pieces left empty after normalization are dropped.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .filter_map(normalize_token)
        .collect()
}

fn normalize_token(raw: &str) -> Option<String> {
    let stripped: String = raw.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    let value = match stripped.split_once(':') {
        Some((_, value)) => value.to_string(),
        None => stripped,
    };
    if value.is_empty() { None } else { Some(value) }
}

/// True if every token is a case-insensitive substring of `candidate`. An
/// empty token list matches everything.
pub fn matches<S: AsRef<str>>(tokens: &[S], candidate: &str) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let haystack = candidate.to_lowercase();
    tokens
        .iter()
        .all(|token| haystack.contains(&token.as_ref().to_lowercase()))
}
