//! Diagnostic rendering for parse errors.

use std::ops::Range;

use aedt_lines::{Cursor, Lines};
use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::{ParseError, ParseErrorKind};

impl ParseError {
    /// Render this error with ariadne.
    ///
    /// `lines` must be the buffer the error came from; the report quotes the
    /// logical lines, not the raw file.
    pub fn render(&self, filename: &str, lines: &Lines) -> String {
        let mut output = Vec::new();
        self.write_report(filename, lines, &mut output);
        String::from_utf8(output).unwrap_or_else(|_| format!("{}", self))
    }

    /// Write the error report to a writer.
    pub fn write_report<W: std::io::Write>(&self, filename: &str, lines: &Lines, writer: W) {
        let source = lines.to_text();
        let report = self.build_report(filename, lines);
        let _ = report
            .finish()
            .write((filename, Source::from(source.as_str())), writer);
    }

    fn build_report<'a>(
        &self,
        filename: &'a str,
        lines: &Lines,
    ) -> ariadne::ReportBuilder<'static, (&'a str, Range<usize>)> {
        let range = line_range(lines, self.at);

        match &self.kind {
            ParseErrorKind::UnexpectedEof { block } => {
                let opened = self.opened_at.map_or_else(|| range.clone(), |c| line_range(lines, c));
                let last = line_range(lines, Cursor::at(lines.len().saturating_sub(1)));
                Report::build(ReportKind::Error, (filename, opened.clone()))
                    .with_message(format!("unexpected end of input while parsing block `{block}`"))
                    .with_label(
                        Label::new((filename, opened))
                            .with_message("block opened here")
                            .with_color(Color::Blue),
                    )
                    .with_label(
                        Label::new((filename, last))
                            .with_message("input ends here")
                            .with_color(Color::Red),
                    )
                    .with_help(format!("add `$end '{block}'`"))
            }

            ParseErrorKind::MismatchedEnd { expected, found } => {
                let mut report = Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!("`$end '{found}'` does not close block `{expected}`"))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("mismatched end")
                            .with_color(Color::Red),
                    )
                    .with_help(format!("expected `$end '{expected}'`"));
                if let Some(opened) = self.opened_at {
                    report = report.with_label(
                        Label::new((filename, line_range(lines, opened)))
                            .with_message("block opened here")
                            .with_color(Color::Blue),
                    );
                }
                report
            }

            ParseErrorKind::UnmatchedEnd { name } => {
                Report::build(ReportKind::Error, (filename, range.clone()))
                    .with_message(format!("`$end '{name}'` without a matching `$begin`"))
                    .with_label(
                        Label::new((filename, range))
                            .with_message("nothing to close")
                            .with_color(Color::Red),
                    )
            }
        }
    }
}

/// Byte range of the line at `cursor` in [`Lines::to_text`].
fn line_range(lines: &Lines, cursor: Cursor) -> Range<usize> {
    let start = lines.line_offset(cursor);
    let len = lines.get(cursor).map_or(0, str::len);
    start..start + len
}
