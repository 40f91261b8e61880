use std::io::Write;

use owo_colors::OwoColorize;
use papertag_core::{ExtractionMethod, ExtractionResult, RunStats};
use papertag_parsing::{Segments, StrategyKind};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn shorten(s: &str, max: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &flat[..idx]),
        None => flat,
    }
}

/// Print one document's keywords, or its error.
pub fn print_result(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    match result.error() {
        None => {
            if color.enabled() {
                writeln!(
                    w,
                    "{} {}",
                    result.file_name().bold(),
                    format!("({})", result.method()).dimmed()
                )?;
            } else {
                writeln!(w, "{} ({})", result.file_name(), result.method())?;
            }
            writeln!(w, "  {}", result.keywords().join("; "))?;
        }
        Some(error) => {
            if color.enabled() {
                writeln!(w, "{} {} {}", result.file_name().bold(), "FAILED:".red(), error)?;
            } else {
                writeln!(w, "{} FAILED: {}", result.file_name(), error)?;
            }
        }
    }
    Ok(())
}

/// Print one result as a single JSON line.
pub fn print_json(w: &mut dyn Write, result: &ExtractionResult) -> std::io::Result<()> {
    let line = serde_json::to_string(result).map_err(std::io::Error::other)?;
    writeln!(w, "{}", line)
}

/// Print counts by method for a finished run.
pub fn print_summary(w: &mut dyn Write, stats: &RunStats, color: ColorMode) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", "=== SUMMARY ===".bold())?;
    } else {
        writeln!(w, "=== SUMMARY ===")?;
    }
    writeln!(w, "  Documents:          {}", stats.total)?;
    writeln!(w, "  Keywords section:   {}", stats.keywords_section)?;
    writeln!(w, "  Title/abstract:     {}", stats.title_abstract)?;
    if color.enabled() && stats.failed > 0 {
        writeln!(w, "  Failed:             {}", stats.failed.red())?;
    } else {
        writeln!(w, "  Failed:             {}", stats.failed)?;
    }
    Ok(())
}

/// What the heuristics see in one document, for `papertag inspect`.
pub struct Inspection<'a> {
    pub file_name: &'a str,
    pub backends: &'a [&'static str],
    pub text_chars: usize,
    pub section: Option<&'a [String]>,
    pub min_section_terms: usize,
    pub segments: &'a Segments,
    pub strategy: StrategyKind,
    pub outcome: Result<(ExtractionMethod, &'a [String]), String>,
}

pub fn print_inspection(
    w: &mut dyn Write,
    inspection: &Inspection<'_>,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} chars of text, backends: {})\n",
            "INSPECT:".bold().cyan(),
            inspection.file_name.bold(),
            inspection.text_chars,
            inspection.backends.join(", ")
        )?;
    } else {
        writeln!(
            w,
            "INSPECT: {} ({} chars of text, backends: {})\n",
            inspection.file_name,
            inspection.text_chars,
            inspection.backends.join(", ")
        )?;
    }

    match inspection.section {
        Some(terms) => {
            let verdict = if terms.len() >= inspection.min_section_terms {
                "accepted"
            } else {
                "too short"
            };
            writeln!(
                w,
                "  Keywords section: {} ({} terms, {})",
                terms.join("; "),
                terms.len(),
                verdict
            )?;
        }
        None => writeln!(w, "  Keywords section: (none)")?,
    }

    let title = inspection.segments.title.as_deref().unwrap_or("(none)");
    writeln!(w, "  Title:            {}", title)?;
    let abstract_text = inspection
        .segments
        .abstract_text
        .as_deref()
        .map(|a| shorten(a, 300))
        .unwrap_or_else(|| "(none)".to_string());
    if color.enabled() {
        writeln!(w, "  Abstract:         {}", abstract_text.dimmed())?;
    } else {
        writeln!(w, "  Abstract:         {}", abstract_text)?;
    }
    writeln!(w, "  Strategy:         {}", inspection.strategy)?;
    writeln!(w)?;

    match &inspection.outcome {
        Ok((method, keywords)) => {
            if color.enabled() {
                writeln!(w, "{} [{}] {}", "RESULT:".green(), method, keywords.join("; "))?;
            } else {
                writeln!(w, "RESULT: [{}] {}", method, keywords.join("; "))?;
            }
        }
        Err(error) => {
            if color.enabled() {
                writeln!(w, "{} {}", "RESULT:".red(), error)?;
            } else {
                writeln!(w, "RESULT: {}", error)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_success_plain() {
        let result = ExtractionResult::success(
            "paper.pdf",
            ExtractionMethod::KeywordsSection,
            vec!["graphs".into(), "spectral methods".into()],
        );
        let out = render(|w| print_result(w, &result, ColorMode(false)));
        assert_eq!(out, "paper.pdf (keywords-section)\n  graphs; spectral methods\n");
    }

    #[test]
    fn test_print_failure_plain() {
        let result = ExtractionResult::failure("scan.pdf", papertag_core::ERR_NO_TEXT);
        let out = render(|w| print_result(w, &result, ColorMode(false)));
        assert_eq!(out, "scan.pdf FAILED: Could not extract text from PDF\n");
    }

    #[test]
    fn test_json_line_shape() {
        let result = ExtractionResult::failure("scan.pdf", papertag_core::ERR_NO_TEXT);
        let out = render(|w| print_json(w, &result));
        assert_eq!(
            out,
            "{\"file\":\"scan.pdf\",\"keywords\":[],\"method\":\"none\",\"error\":\"Could not extract text from PDF\"}\n"
        );
    }

    #[test]
    fn test_summary_counts() {
        let stats = RunStats {
            total: 3,
            keywords_section: 1,
            title_abstract: 1,
            failed: 1,
        };
        let out = render(|w| print_summary(w, &stats, ColorMode(false)));
        assert!(out.contains("Documents:          3"));
        assert!(out.contains("Failed:             1"));
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("a  b\nc", 10), "a b c");
        assert_eq!(shorten("abcdef", 3), "abc...");
    }
}
