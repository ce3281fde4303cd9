//! cli.rs
//!
//! The command-line surface, a `clap` derive struct. Two invocation shapes:
//! `dround [OPTIONS] DATE DURATION…` for point mode, `dround [OPTIONS]
//! DURATION…` reading dates from stdin for stream mode. `driver.rs`
//! distinguishes the two at runtime by whether the first positional
//! argument parses as a date; `clap` only sees "one or more trailing
//! strings".

use clap::Parser;

/// Round embedded or standalone date/time values to a duration boundary.
#[derive(Debug, Parser)]
#[command(name = "dround", about = "Round date/time values to a rounding-duration boundary")]
pub struct Cli {
    /// Output format (strftime-like); default mirrors the matched input.
    #[arg(short = 'f', long = "format")]
    pub format: Option<String>,

    /// Input format, tried in order; repeatable.
    #[arg(short = 'i', long = "input-format")]
    pub input_format: Vec<String>,

    /// Sed mode: rewrite every match on a line, copying unmatched text verbatim.
    #[arg(short = 'S', long = "sed-mode")]
    pub sed_mode: bool,

    /// Suppress stderr diagnostics; exit-code biasing still happens.
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Force advance even when a value is already on a boundary.
    #[arg(short = 'n', long = "next")]
    pub next: bool,

    /// Source zone, attached to a parsed value before rounding.
    #[arg(long = "from-zone")]
    pub from_zone: Option<String>,

    /// Target zone, attached after rounding.
    #[arg(short = 'z', long = "zone")]
    pub zone: Option<String>,

    /// Fallback date used by the parser for underspecified input.
    #[arg(long = "base")]
    pub base: Option<String>,

    /// Unescape `\n`, `\t`, … in `-f`/`-i` format strings.
    #[arg(long = "backslash-escapes")]
    pub backslash_escapes: bool,

    /// Either `DATE DURATION…` (point mode) or `DURATION…` (stream mode).
    #[arg(required = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_point_mode_invocation() {
        let cli = Cli::parse_from(["dround", "2012-03-01", "+d31"]);
        assert_eq!(cli.args, vec!["2012-03-01", "+d31"]);
        assert!(!cli.next);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "dround", "-n", "-S", "-q", "--base", "2012-01-01", "Sun",
        ]);
        assert!(cli.next);
        assert!(cli.sed_mode);
        assert!(cli.quiet);
        assert_eq!(cli.base.as_deref(), Some("2012-01-01"));
        assert_eq!(cli.args, vec!["Sun"]);
    }

    #[test]
    fn repeatable_input_format() {
        let cli = Cli::parse_from([
            "dround", "-i", "%Y-%m-%d", "-i", "%H:%M:%S", "12:00:00",
        ]);
        assert_eq!(cli.input_format, vec!["%Y-%m-%d", "%H:%M:%S"]);
    }
}
