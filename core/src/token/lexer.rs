use serde::Serialize;

/// Operators never resolve to a token, even when they sit between separators.
pub const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "<<", "+=", "-=", "~=", "|", "^", "&", "&&", "||", "{", "}", "[", "]",
];

/// Boundaries between tokens on a single line.
pub const TOKEN_SEPARATORS: &[&str] = &[" ", ".", "\n", "\r", "\r\n"];

/// Markers that open a nested construct (call arguments, index, block params).
pub const SUB_TOKENS: &[char] = &['(', '[', '|'];

/// A token found on a single line. Offsets are char indices into that line.
///
/// `end_index` is the right edge of the whole span between separators, before
/// any sub-token clipping, so callers can probe the token that follows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub name: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Extract the token enclosing (or directly following) `character` on `line`.
///
/// Returns `None` when the cursor sits on an operator, or past a sub-token
/// marker inside the enclosing span (e.g. on `bar` in `foo(bar)`).
pub fn parse_token(line: &str, character: usize) -> Option<Token> {
    let chars: Vec<char> = line.chars().collect();
    let (lhs_line, rhs_line) = chars.split_at(character.min(chars.len()));

    let lhs = TOKEN_SEPARATORS
        .iter()
        .filter_map(|sep| last_index_of(lhs_line, sep))
        .fold(0, usize::max);
    let rhs = TOKEN_SEPARATORS
        .iter()
        .filter_map(|sep| first_index_of(rhs_line, sep))
        .fold(rhs_line.len(), usize::min);

    let start_index = lhs + 1;
    let end_index = character + rhs;
    let mut name = clamped_slice(&chars, start_index, end_index);

    if let Some(pos) = name.iter().position(|c| SUB_TOKENS.contains(c)) {
        if start_index + pos < character {
            return None;
        }
        name = &name[..pos];
    }

    let name: String = name.iter().collect();
    if OPERATORS.contains(&name.as_str()) {
        return None;
    }

    Some(Token {
        name,
        start_index,
        end_index,
    })
}

fn first_index_of(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    haystack.windows(needle.len()).position(|w| w == needle.as_slice())
}

fn last_index_of(haystack: &[char], needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    haystack.windows(needle.len()).rposition(|w| w == needle.as_slice())
}

// Out-of-range or inverted bounds yield an empty slice.
fn clamped_slice(chars: &[char], start: usize, end: usize) -> &[char] {
    let end = end.min(chars.len());
    let start = start.min(end);
    &chars[start..end]
}
