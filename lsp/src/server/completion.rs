use rotoscope_core::TraceRecord;
use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Position, Url};

use super::state::RotoscopeLanguageServer;
use super::text::trace_filepath;

/// One completion item per method the trace recorded at a call site.
pub fn call_site_completions(calls: &[TraceRecord]) -> Vec<CompletionItem> {
    calls
        .iter()
        .map(|call| CompletionItem {
            label: call.method_name.clone(),
            kind: Some(CompletionItemKind::METHOD),
            detail: Some(format!(
                "{}{}{}",
                call.entity,
                call.level().separator(),
                call.method_name
            )),
            ..Default::default()
        })
        .collect()
}

impl RotoscopeLanguageServer {
    pub(crate) fn get_completions(&self, uri: &Url, position: Position) -> Vec<CompletionItem> {
        let calls = self.engine.calls_at(&trace_filepath(uri), position.line);
        call_site_completions(&calls)
    }
}
