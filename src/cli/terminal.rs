//! Report painting for the terminal.

use owo_colors::OwoColorize;
use rfc_gate::Verdict;

/// Whether stdout takes colour.
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Width of the report's `=` rules: `max`, narrowed to the terminal.
pub fn rule_width(max: usize) -> usize {
    terminal_size::terminal_size().map_or(max, |(width, _)| usize::from(width.0).min(max))
}

/// Paints a report line in the colour of its verdict.
pub fn paint(text: &str, verdict: Option<Verdict>) -> String {
    paint_with(text, verdict, supports_color())
}

/// Dims secondary output such as next-step hints.
pub fn dim(text: &str) -> String {
    if supports_color() {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

fn paint_with(text: &str, verdict: Option<Verdict>, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match verdict {
        Some(Verdict::Pass) => text.green().to_string(),
        Some(Verdict::Warn) => text.yellow().to_string(),
        Some(Verdict::Fail) => text.red().bold().to_string(),
        None => text.to_string(),
    }
}
