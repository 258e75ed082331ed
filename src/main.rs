//! dowhilec Command Line Interface
//!
//! Usage:
//!   dowhilec [OPTIONS] [FILE]...
//!   dowhilec --help
//!
//! Examples:
//!   dowhilec loop.dw                    # Check a program, print the report
//!   dowhilec --emit=tokens loop.dw      # Token listing with bucket names
//!   dowhilec --emit=html -o out.html    # Results page for stdin
//!   dowhilec -vv a.dw b.dw              # Several inputs, debug logging

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use dowhilec::frontend::{ParseContext, ParserConfig};
use dowhilec::report::{self, classify, CompileConfig, CompileReport};
use dowhilec::utils::SourceMap;
use log::{debug, info, warn};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

/// dowhilec - lexer, parser and declaration checker for DO/WHILE programs
#[derive(Parser, Debug)]
#[command(name = "dowhilec")]
#[command(version)]
#[command(about = "Lexer, parser and declaration checker for DO/WHILE programs", long_about = None)]
struct Cli {
    /// Source files; reads stdin when none are given
    #[arg(value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// What to emit
    #[arg(long, default_value = "report")]
    emit: EmitKind,

    /// Tokens that must be consumed after a syntax error before the next one is reported
    #[arg(long, default_value_t = 3)]
    error_window: usize,

    /// Leave the token listing out of the success text
    #[arg(long)]
    no_token_list: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (only errors are logged)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EmitKind {
    /// Result text and bucket counts
    Report,
    /// One token per line with its bucket
    Tokens,
    /// Abstract Syntax Tree
    Ast,
    /// Full report as JSON
    Json,
    /// HTML results page
    Html,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("dowhilec v{}", dowhilec::VERSION);

    let config = build_config(&cli);
    debug!("Compile config: {:?}", config);

    let inputs = read_inputs(&cli.inputs)?;
    if cli.emit == EmitKind::Html && inputs.len() > 1 {
        bail!("--emit html renders one page and takes a single input");
    }

    let mut ctx = ParseContext::new();
    let mut reports = Vec::with_capacity(inputs.len());
    for (name, source) in &inputs {
        info!("Compiling {}...", name);
        let report = report::compile_with(source, &config, &mut ctx);
        for error in &report.lexical_errors {
            debug!("{}: {}", name, SourceMap::new(source).excerpt(&error.span, &error.message));
        }
        reports.push(report);
    }
    let all_ok = reports.iter().all(|r| r.success);

    let output = render_all(cli.emit, &inputs, &reports)?;
    write_output(&cli.output, &output)?;

    if all_ok {
        Ok(ExitCode::SUCCESS)
    } else {
        warn!("compilation failed");
        Ok(ExitCode::FAILURE)
    }
}

fn build_config(cli: &Cli) -> CompileConfig {
    CompileConfig {
        parser: ParserConfig {
            error_window: cli.error_window,
        },
        list_tokens: !cli.no_token_list,
    }
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if paths.is_empty() {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read source from stdin")?;
        return Ok(vec![("<stdin>".to_string(), source)]);
    }

    paths
        .iter()
        .map(|path| {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file: {:?}", path))?;
            Ok((path.display().to_string(), source))
        })
        .collect()
}

/// Render every report. Several JSON reports become one array; text modes
/// get a `==> name <==` header per input.
fn render_all(emit: EmitKind, inputs: &[(String, String)], reports: &[CompileReport]) -> Result<String> {
    match (emit, reports) {
        (EmitKind::Json, [_, _, ..]) => {
            let mut out = serde_json::to_string_pretty(reports).context("Failed to serialize reports")?;
            out.push('\n');
            Ok(out)
        }
        (EmitKind::Html, [_, _, ..]) => bail!("--emit html renders one page and takes a single input"),
        _ => {
            let mut out = String::new();
            for ((name, source), report) in inputs.iter().zip(reports) {
                if reports.len() > 1 {
                    let _ = writeln!(out, "==> {} <==", name);
                }
                out.push_str(&render(emit, source, report)?);
            }
            Ok(out)
        }
    }
}

fn render(emit: EmitKind, source: &str, report: &CompileReport) -> Result<String> {
    let mut out = String::new();
    match emit {
        EmitKind::Report => {
            let _ = writeln!(out, "{}", report.result);
            for (label, count) in report.counts.rows() {
                let _ = writeln!(out, "{:<9}{}", label, count);
            }
        }
        EmitKind::Tokens => {
            for token in &report.tokens {
                let _ = writeln!(out, "{:<9}{}", classify(token).label(), token);
            }
        }
        EmitKind::Ast => match &report.program {
            Some(program) => {
                let _ = writeln!(out, "{:#?}", program);
            }
            None => {
                let _ = writeln!(out, "{}", report.result);
            }
        },
        EmitKind::Json => {
            out = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            out.push('\n');
        }
        EmitKind::Html => out = report::render_html(source, report),
    }
    Ok(out)
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "int x = 5; DO x = x + 1; ENDDO WHILE (int y == 10) ENDWHILE";
    const BROKEN: &str = "int x = 5; DO y = 1; ENDDO WHILE (int z == 0) ENDWHILE";

    fn compile_all(sources: &[&str]) -> (Vec<(String, String)>, Vec<CompileReport>) {
        let inputs: Vec<_> = sources
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("in{}.dw", i), s.to_string()))
            .collect();
        let reports = inputs.iter().map(|(_, s)| report::compile(s)).collect();
        (inputs, reports)
    }

    #[test]
    fn test_json_for_several_inputs_is_one_array() {
        let (inputs, reports) = compile_all(&[VALID, BROKEN]);
        let out = render_all(EmitKind::Json, &inputs, &reports).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[0]["success"], true);
        assert_eq!(array[1]["success"], false);
    }

    #[test]
    fn test_json_for_one_input_is_an_object() {
        let (inputs, reports) = compile_all(&[VALID]);
        let out = render_all(EmitKind::Json, &inputs, &reports).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.is_object());
    }

    #[test]
    fn test_html_rejects_several_inputs() {
        let (inputs, reports) = compile_all(&[VALID, BROKEN]);
        assert!(render_all(EmitKind::Html, &inputs, &reports).is_err());

        let (inputs, reports) = compile_all(&[VALID]);
        let page = render_all(EmitKind::Html, &inputs, &reports).unwrap();
        assert_eq!(page.matches("<html").count(), 1);
    }

    #[test]
    fn test_report_headers_per_input() {
        let (inputs, reports) = compile_all(&[VALID, BROKEN]);
        let out = render_all(EmitKind::Report, &inputs, &reports).unwrap();
        assert!(out.contains("==> in0.dw <=="));
        assert!(out.contains("==> in1.dw <=="));
        assert!(out.contains("Error: variable 'y' is not declared"));
    }
}
