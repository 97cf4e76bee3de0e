use std::path::Path;

use anyhow::{anyhow, Context};
use rotoscope_core::Engine;
use serde_json::{json, Value};

const USAGE: &str = "Usage: rotoscope-lsp --evaluate <trace.csv> <source-file> <line> <character>\n  \
    <line>       0-based line in <source-file>\n  \
    <character>  0-based character offset within that line";

/// `--evaluate` probe: resolve one position against a trace and print JSON
/// instead of starting the server. Returns `Ok(None)` when not requested.
pub(crate) fn try_cli_evaluate() -> anyhow::Result<Option<String>> {
    let args: Vec<String> = std::env::args().collect();
    let Some(i) = args.iter().position(|a| a == "--evaluate") else {
        return Ok(None);
    };

    let operands: Vec<&String> = args[i + 1..].iter().filter(|a| !a.starts_with("--")).collect();
    let [trace, source, line, character] = operands.as_slice() else {
        return Err(anyhow!(USAGE));
    };
    let line: u32 = line.parse().with_context(|| format!("Invalid line '{}'\n{}", line, USAGE))?;
    let character: usize = character
        .parse()
        .with_context(|| format!("Invalid character '{}'\n{}", character, USAGE))?;

    let output = evaluate_probe(Path::new(trace.as_str()), Path::new(source.as_str()), line, character)?;
    Ok(Some(serde_json::to_string_pretty(&output)?))
}

/// Load `trace`, read `line` of `source` and resolve the cursor at `character`
/// (a char offset). The source's file name is the call-site key, as in the
/// editor.
pub fn evaluate_probe(trace: &Path, source: &Path, line: u32, character: usize) -> anyhow::Result<Value> {
    let engine = Engine::new();
    let summary = engine.seed(trace)?;

    let content =
        std::fs::read_to_string(source).with_context(|| format!("Failed to read file '{}'", source.display()))?;
    let text = content
        .split('\n')
        .nth(line as usize)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .ok_or_else(|| anyhow!("'{}' has no line {}", source.display(), line))?;
    let filepath = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow!("'{}' has no file name", source.display()))?;

    let resolution = engine.resolve(&filepath, text, line, character);
    Ok(json!({
        "filepath": filepath,
        "line": line,
        "character": character,
        "trace": summary,
        "token": resolution.token,
        "probe": resolution.probe,
        "evaluations": resolution.evaluations,
    }))
}
