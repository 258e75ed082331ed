//! Request handling: run the front end over one input and summarize it.
//!
//! This is the layer a user interface talks to. It lexes the input once for
//! display, parses it with a freshly reset [`ParseContext`], tallies tokens
//! into display buckets and builds the text shown to the user.

use crate::frontend::{
    lex, parse_with_context, Diagnostic, LexerError, ParseContext, ParseResult, ParserConfig,
    Program, Token, TokenKind,
};
use log::{debug, error, info};
use serde::Serialize;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};

/// Header of the result text when compilation succeeds.
pub const SUCCESS_HEADER: &str = "Compilation successful:";

/// Display bucket of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Bucket {
    /// Identifiers
    Id,
    /// Reserved words
    Reserved,
    /// Integer literals
    Number,
    /// Operators and punctuation
    Symbol,
}

impl Bucket {
    /// Column label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Id => "ID",
            Bucket::Reserved => "PR",
            Bucket::Number => "NUMEROS",
            Bucket::Symbol => "SIMBOLOS",
        }
    }
}

/// Put a token in exactly one bucket.
pub fn classify(token: &Token) -> Bucket {
    match token.kind {
        TokenKind::Number => Bucket::Number,
        TokenKind::Identifier => Bucket::Id,
        kind if kind.is_keyword() => Bucket::Reserved,
        _ => Bucket::Symbol,
    }
}

/// Per-bucket token counts plus the error count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "PR")]
    pub reserved: usize,
    #[serde(rename = "NUMEROS")]
    pub numbers: usize,
    #[serde(rename = "SIMBOLOS")]
    pub symbols: usize,
    #[serde(rename = "ERRORES")]
    pub errors: usize,
    /// Sum of every other field
    #[serde(rename = "TOTAL")]
    pub total: usize,
}

impl TokenCounts {
    /// Count `tokens` by bucket and add `errors`.
    pub fn tally(tokens: &[Token], errors: usize) -> Self {
        let mut counts = Self { errors, ..Self::default() };
        for token in tokens {
            match classify(token) {
                Bucket::Id => counts.id += 1,
                Bucket::Reserved => counts.reserved += 1,
                Bucket::Number => counts.numbers += 1,
                Bucket::Symbol => counts.symbols += 1,
            }
        }
        counts.total = counts.id + counts.reserved + counts.numbers + counts.symbols + counts.errors;
        counts
    }

    /// Count for one bucket.
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Id => self.id,
            Bucket::Reserved => self.reserved,
            Bucket::Number => self.numbers,
            Bucket::Symbol => self.symbols,
        }
    }

    /// `(label, count)` rows in display order, `ERRORES` and `TOTAL` last.
    pub fn rows(&self) -> [(&'static str, usize); 6] {
        [
            (Bucket::Id.label(), self.id),
            (Bucket::Reserved.label(), self.reserved),
            (Bucket::Number.label(), self.numbers),
            (Bucket::Symbol.label(), self.symbols),
            ("ERRORES", self.errors),
            ("TOTAL", self.total),
        ]
    }
}

/// Settings for one compile request.
#[derive(Debug, Clone)]
pub struct CompileConfig {
    /// Parser settings
    pub parser: ParserConfig,
    /// List every token under the success header
    pub list_tokens: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            list_tokens: true,
        }
    }
}

/// Everything a user interface needs to show for one input.
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    /// No diagnostics and no internal failure
    pub success: bool,
    /// Text shown to the user
    pub result: String,
    /// Tokens, for display
    pub tokens: Vec<Token>,
    /// Bucket counts
    pub counts: TokenCounts,
    /// Syntax, semantic and internal diagnostics, in order
    pub diagnostics: Vec<Diagnostic>,
    /// Lexical errors; these never count as diagnostics
    pub lexical_errors: Vec<LexerError>,
    /// The tree, when one was built
    pub program: Option<Program>,
}

impl CompileReport {
    /// Diagnostic messages only.
    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(Diagnostic::message).collect()
    }
}

/// Compile `source` with default settings and a fresh context.
pub fn compile(source: &str) -> CompileReport {
    let mut ctx = ParseContext::new();
    compile_with(source, &CompileConfig::default(), &mut ctx)
}

/// Compile `source`, resetting and reusing `ctx`.
pub fn compile_with(source: &str, config: &CompileConfig, ctx: &mut ParseContext) -> CompileReport {
    ctx.reset();

    let (tokens, lexical_errors) = lex(source);
    debug!("{} token(s), {} lexical error(s)", tokens.len(), lexical_errors.len());

    let outcome = guarded(|| parse_with_context(source, ctx, &config.parser));

    let (program, internal_failures) = match outcome {
        Ok(result) => (result.program, 0),
        Err(message) => {
            error!("parser failed: {}", message);
            ctx.diagnostics
                .record_error(Diagnostic::Internal(format!("An unexpected error occurred: {}", message)));
            (None, 1)
        }
    };

    let diagnostics = ctx.diagnostics.all_errors().to_vec();
    let reported = diagnostics
        .iter()
        .filter(|d| !matches!(d, Diagnostic::Internal(_)))
        .count();
    let counts = TokenCounts::tally(&tokens, reported + internal_failures);

    let success = diagnostics.is_empty();
    let result = if success {
        let mut text = SUCCESS_HEADER.to_string();
        if config.list_tokens {
            for token in &tokens {
                let _ = write!(text, "\n{}", token);
            }
        }
        text
    } else {
        diagnostics
            .iter()
            .map(Diagnostic::message)
            .collect::<Vec<_>>()
            .join("\n")
    };
    info!(
        "compiled {} token(s): {}",
        tokens.len(),
        if success { "ok" } else { "failed" }
    );

    CompileReport {
        success,
        result,
        tokens,
        counts,
        diagnostics,
        lexical_errors,
        program,
    }
}

/// Run `f`, turning a panic into its message.
fn guarded<F: FnOnce() -> ParseResult>(f: F) -> Result<ParseResult, String> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown failure".to_string()
        }
    })
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the results page: the submitted code, the result text and the
/// counts table.
pub fn render_html(source: &str, report: &CompileReport) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <title>Lexical, Syntax and Semantic Analyzer</title>\n");
    html.push_str("</head>\n<body>\n    <div class=\"container\">\n");
    html.push_str("        <div class=\"left-panel\">\n");
    html.push_str("            <form method=\"post\">\n");
    let _ = writeln!(
        html,
        "                <textarea name=\"code\" rows=\"10\">{}</textarea><br>",
        escape_html(source)
    );
    html.push_str("                <input type=\"submit\" value=\"Compile\">\n");
    html.push_str("            </form>\n        </div>\n");
    html.push_str("        <div class=\"right-panel\">\n");
    html.push_str("            <h2>Result:</h2>\n");
    let _ = writeln!(html, "            <pre>{}</pre>", escape_html(&report.result));
    html.push_str("            <table>\n                <thead>\n                    <tr>");
    for (label, _) in report.counts.rows() {
        let _ = write!(html, "<th>{}</th>", label);
    }
    html.push_str("</tr>\n                </thead>\n                <tbody>\n                    <tr>");
    for (_, count) in report.counts.rows() {
        let _ = write!(html, "<td>{}</td>", count);
    }
    html.push_str("</tr>\n                </tbody>\n            </table>\n");
    html.push_str("        </div>\n    </div>\n</body>\n</html>\n");
    html
}
