//! Human-readable import and export of operations and forecasts.
//!
//! One record per blank-line-delimited block:
//!
//! ```text
//! 2015-12-05 / 98042 km
//! Oil change
//! Every 1 year(s) or 10000 km
//! Price: 4000 RUR
//! ```
//!
//! The first line is present only for completed records. Blank lines inside
//! comments are dropped on export.

use std::{fmt::Write as _, fs, path::Path};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    operation::Operation,
    types::{Span, ValidationError, parse_date, parse_number},
};

static DONE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}[-.]\d{2}[-.]\d{2})\s*/\s*(\S+)\s*km$").expect("valid done-line regex")
});
static INTERVAL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Every\s+(\S+)\s+(\S+)\s+or\s+(\S+)\s*km$").expect("valid interval regex")
});

/// Import failure with the offending line for diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Interval line names a unit other than years or months.
    #[error("line {line_no}: unknown interval unit in `{line}`")]
    UnknownUnit {
        /// 1-based line number.
        line_no: usize,
        /// Line content.
        line: String,
    },
    /// Line does not have the expected shape.
    #[error("line {line_no}: malformed record line `{line}`")]
    Malformed {
        /// 1-based line number.
        line_no: usize,
        /// Line content.
        line: String,
    },
    /// Line has the right shape but carries an invalid value.
    #[error("line {line_no}: {source}")]
    Invalid {
        /// 1-based line number.
        line_no: usize,
        /// Rejected value.
        #[source]
        source: ValidationError,
    },
}

/// File-level import/export failure.
#[derive(Debug, Error)]
pub enum TextError {
    /// Reading or writing the file failed.
    #[error("text file I/O: {0}")]
    Io(#[from] std::io::Error),
    /// File content did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Renders operations as text blocks.
pub fn write_operations(ops: &[Operation]) -> String {
    let mut out = String::new();
    for (idx, op) in ops.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let comment = match op.completion() {
            Some(done) => {
                let _ = writeln!(
                    out,
                    "{} / {} km",
                    done.on.format("%Y-%m-%d"),
                    format_number(done.at_km)
                );
                done.comment.as_str()
            }
            None => op.comment(),
        };
        let _ = writeln!(out, "{}", op.label().trim());
        let _ = writeln!(out, "{}", interval_line(op));
        for line in comment.lines().map(str::trim_end).filter(|l| !l.trim().is_empty()) {
            let _ = writeln!(out, "{line}");
        }
    }
    out
}

/// Parses text blocks back into operations.
pub fn read_operations(text: &str) -> Result<Vec<Operation>, ParseError> {
    let mut ops = Vec::new();
    let mut block: Vec<(usize, &str)> = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !block.is_empty() {
                ops.push(parse_block(&block)?);
                block.clear();
            }
            continue;
        }
        block.push((idx + 1, line.trim_end()));
    }
    if !block.is_empty() {
        ops.push(parse_block(&block)?);
    }
    Ok(ops)
}

/// Renders a forecast, one block per entry.
///
/// With `relative` the distance reads as kilometres remaining, or overdue
/// when negative.
pub fn write_plan(plan: &[Operation], relative: bool) -> String {
    let mut out = String::new();
    for (idx, op) in plan.iter().enumerate() {
        if idx > 0 {
            out.push('\n');
        }
        let Some(due) = op.completion() else {
            continue;
        };
        let date = due.on.format("%Y-%m-%d");
        let km = due.at_km;
        if !relative {
            let _ = writeln!(out, "{date} / {} km", format_number(km));
        } else if km < 0.0 {
            let _ = writeln!(out, "{date} / overdue by {} km", format_number(-km));
        } else {
            let _ = writeln!(out, "{date} / in {} km", format_number(km));
        }
        let _ = writeln!(out, "{}", op.label().trim());
    }
    out
}

/// Writes operations to `path`, replacing its content.
pub fn export_to_path(path: impl AsRef<Path>, ops: &[Operation]) -> Result<(), TextError> {
    fs::write(path, write_operations(ops))?;
    Ok(())
}

/// Reads operations from `path`.
pub fn import_from_path(path: impl AsRef<Path>) -> Result<Vec<Operation>, TextError> {
    let text = fs::read_to_string(path)?;
    Ok(read_operations(&text)?)
}

fn parse_block(block: &[(usize, &str)]) -> Result<Operation, ParseError> {
    let (first_no, first) = block[0];
    let done = match DONE_LINE.captures(first.trim()) {
        Some(caps) => {
            let on = parse_date(&caps[1]).map_err(|source| invalid(first_no, source))?;
            let km = parse_number(&caps[2]).map_err(|source| invalid(first_no, source))?;
            Some((on, km))
        }
        None => None,
    };

    let rest = if done.is_some() { &block[1..] } else { block };
    let [(label_no, label), (interval_no, interval), comment @ ..] = rest else {
        let (line_no, line) = block[block.len() - 1];
        return Err(ParseError::Malformed {
            line_no,
            line: line.to_string(),
        });
    };

    let (span, km) = parse_interval(*interval_no, interval)?;
    let comment = comment
        .iter()
        .map(|(_, line)| *line)
        .collect::<Vec<_>>()
        .join("\n");
    let op = Operation::new(label.trim(), km, span).map_err(|source| {
        let line_no = match source {
            ValidationError::EmptyLabel => *label_no,
            _ => *interval_no,
        };
        invalid(line_no, source)
    })?;

    match done {
        Some((on, done_km)) => op
            .complete(done_km, on, comment)
            .map_err(|source| invalid(first_no, source)),
        None => Ok(op.with_comment(comment)),
    }
}

fn parse_interval(line_no: usize, line: &str) -> Result<(Span, f64), ParseError> {
    let Some(caps) = INTERVAL_LINE.captures(line.trim()) else {
        return Err(ParseError::Malformed {
            line_no,
            line: line.to_string(),
        });
    };
    let amount = parse_number(&caps[1]).map_err(|source| invalid(line_no, source))?;
    let span = match &caps[2] {
        "year(s)" | "years" | "year" => Span::from_years(amount),
        "month(s)" | "months" | "month" => Span::from_months(amount),
        _ => {
            return Err(ParseError::UnknownUnit {
                line_no,
                line: line.to_string(),
            });
        }
    }
    .map_err(|source| invalid(line_no, source))?;
    let km = parse_number(&caps[3]).map_err(|source| invalid(line_no, source))?;
    Ok((span, km))
}

fn interval_line(op: &Operation) -> String {
    let span = op.interval_time();
    let km = format_number(op.interval_km());
    if span.is_whole_years() {
        format!("Every {} year(s) or {km} km", format_number(span.years()))
    } else {
        format!("Every {} month(s) or {km} km", format_number(span.months()))
    }
}

/// Six decimals at most; integral values print without a fraction.
fn format_number(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == 0.0 {
        return "0".to_string();
    }
    format!("{rounded}")
}

fn invalid(line_no: usize, source: ValidationError) -> ParseError {
    ParseError::Invalid { line_no, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_float_noise() {
        assert_eq!(format_number(10_000.0), "10000");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(5.999_999_999_9), "6");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn unknown_unit_reports_line() {
        let err = read_operations("Wipers\nEvery 2 weeks or 0 km\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownUnit {
                line_no: 2,
                line: "Every 2 weeks or 0 km".to_string(),
            }
        );
    }

    #[test]
    fn label_without_interval_is_malformed() {
        let err = read_operations("\n\nJust a label\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line_no: 3, .. }));
    }
}
