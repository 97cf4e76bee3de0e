use rotoscope_core::{Evaluation, Resolution};
use tower_lsp::lsp_types::{Hover, HoverContents, LanguageString, MarkedString, Position, Range, Url};
use tracing::debug;

use super::state::RotoscopeLanguageServer;
use super::text::{char_to_utf16_col, line_text, trace_filepath, utf16_to_char_col};

/// Hover label for one evaluation.
pub fn render_evaluation(evaluation: &Evaluation, show_caller: bool) -> MarkedString {
    match evaluation {
        Evaluation::Class(class) => MarkedString::LanguageString(LanguageString {
            language: "ruby".to_string(),
            value: format!("class {}", class.name),
        }),
        Evaluation::Instance(instance) => MarkedString::String(format!("(instance) {}", instance.class.name)),
        Evaluation::Method(method) => {
            let mut label = format!("(method) `{}`", method.qualified_name());
            if show_caller && method.has_caller() {
                label.push_str(&format!(", called by: `{}`", method.qualified_caller()));
            }
            MarkedString::String(label)
        }
    }
}

/// Hover for a resolved cursor on the 0-based `line` whose text is `text`.
/// The range covers the token under the cursor.
pub fn hover_for(resolution: &Resolution, line: u32, text: &str, show_caller: bool) -> Option<Hover> {
    if resolution.evaluations.is_empty() {
        return None;
    }

    let contents = resolution
        .evaluations
        .iter()
        .map(|e| render_evaluation(e, show_caller))
        .collect();

    let range = resolution.token.as_ref().map(|token| {
        let end = token.start_index + token.name.chars().count();
        Range::new(
            Position::new(line, char_to_utf16_col(text, token.start_index)),
            Position::new(line, char_to_utf16_col(text, end)),
        )
    });

    Some(Hover {
        contents: HoverContents::Array(contents),
        range,
    })
}

impl RotoscopeLanguageServer {
    pub(crate) fn get_hover_info(&self, uri: &Url, position: Position) -> Option<Hover> {
        let text = {
            let doc = self.documents.get(uri)?;
            line_text(&doc.content, position.line)?
        };
        let character = utf16_to_char_col(&text, position.character);
        let filepath = trace_filepath(uri);

        let resolution = self.engine.resolve(&filepath, &text, position.line, character);
        debug!(
            filepath = %filepath,
            line = position.line,
            character,
            token = ?resolution.token.as_ref().map(|t| t.name.as_str()),
            evaluations = resolution.evaluations.len(),
            "hover"
        );
        hover_for(&resolution, position.line, &text, self.current_config().show_caller)
    }
}
