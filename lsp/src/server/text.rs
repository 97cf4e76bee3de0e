use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

// Convert LSP UTF-16 position to Rope char index (scalar values), clamped to the end of the line.
pub(crate) fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            return line_start_char + target_utf16.min(s.len());
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
        if seen_utf16 == target_utf16 {
            break;
        }
    }
    line_start_char + chars_in_line
}

/// Char column for a UTF-16 column on `line`. Columns past the end of the line
/// are kept past the end, so the tokenizer sees the same overshoot the editor
/// sent.
pub fn utf16_to_char_col(line: &str, utf16_col: u32) -> usize {
    let target = utf16_col as usize;
    let mut seen_utf16 = 0usize;
    for (chars, ch) in line.chars().enumerate() {
        if seen_utf16 >= target {
            return chars;
        }
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target {
            return chars;
        }
        seen_utf16 += u16_len;
    }
    let line_chars = line.chars().count();
    line_chars + target.saturating_sub(seen_utf16)
}

/// UTF-16 column for a char column on `line`, clamped to the line.
pub fn char_to_utf16_col(line: &str, char_col: usize) -> u32 {
    line.chars().take(char_col).map(char::len_utf16).sum::<usize>() as u32
}

/// Text of the 0-based `line` without its terminator.
pub fn line_text(text: &Rope, line: u32) -> Option<String> {
    let line_idx = line as usize;
    if line_idx >= text.len_lines() {
        return None;
    }
    let mut s = text.line(line_idx).to_string();
    if s.ends_with('\n') {
        s.pop();
        if s.ends_with('\r') {
            s.pop();
        }
    }
    Some(s)
}

/// File name a trace records for the document at `uri`.
///
/// Rotoscope call sites are matched by file name only, so `file:///app/models/dog.rb`
/// becomes `dog.rb`.
pub fn trace_filepath(uri: &Url) -> String {
    if let Ok(path) = uri.to_file_path() {
        if let Some(name) = path.file_name() {
            return name.to_string_lossy().into_owned();
        }
    }
    let path = uri.path();
    path.rsplit('/').next().unwrap_or(path).to_string()
}

// Apply incremental LSP changes to a rope buffer.
pub(crate) fn apply_incremental_change_rope(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    if let Some(range) = &change.range {
        let start_char = position_to_char_idx(text, range.start);
        let end_char = position_to_char_idx(text, range.end);
        let (s, e) = if start_char <= end_char {
            (start_char, end_char)
        } else {
            (end_char, start_char)
        };
        if s != e {
            text.remove(s..e);
        }
        if !change.text.is_empty() {
            text.insert(s, &change.text);
        }
    } else {
        *text = Rope::from_str(&change.text);
    }
}
