//! Line and field tokenizer shared by the three input streams.

use ariadne::{Label, Report, ReportKind, Source};
use chumsky::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{PathwayError, Result};

/// The input stream a line comes from, used to label errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stream {
    InteractionMap,
    CentralDogma,
    Pathway,
}

impl std::fmt::Display for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Stream::InteractionMap => "interaction map",
            Stream::CentralDogma => "central dogma",
            Stream::Pathway => "pathway",
        })
    }
}

/// A non-blank input line.
#[derive(Debug, Clone)]
pub(crate) struct Line {
    /// 1-based line number in its stream.
    pub(crate) number: usize,
    pub(crate) fields: Vec<String>,
}

impl Line {
    pub(crate) fn malformed(&self, stream: Stream, expected: &'static str) -> PathwayError {
        PathwayError::MalformedInput {
            stream,
            line: self.number,
            expected,
            found: self.fields.len(),
        }
    }
}

fn parser() -> impl Parser<char, Vec<Vec<String>>, Error = Simple<char>> {
    // Tab and non-control whitespace. Other control characters are
    // rejected, line breaks excepted.
    let pad = filter(|c: &char| *c == '\t' || (c.is_whitespace() && !c.is_control())).repeated();
    let field = filter(|c: &char| !c.is_whitespace() && !c.is_control())
        .repeated()
        .at_least(1)
        .collect::<String>();
    let line = pad
        .clone()
        .ignore_then(field.then_ignore(pad).repeated());
    line.separated_by(text::newline()).then_ignore(end())
}

/// Split `src` into whitespace-delimited fields, one `Line` per non-blank
/// line.
pub(crate) fn tokenize(src: &str, stream: Stream) -> Result<Vec<Line>> {
    let raw = parser().parse(src).map_err(|errs| PathwayError::Parse {
        stream,
        report: render_errors(src, &errs),
    })?;
    Ok(raw
        .into_iter()
        .enumerate()
        .filter(|(_, fields)| !fields.is_empty())
        .map(|(i, fields)| Line {
            number: i + 1,
            fields,
        })
        .collect())
}

fn render_errors(src: &str, errs: &[Simple<char>]) -> String {
    let mut out = Vec::new();
    for e in errs {
        let report = Report::build(ReportKind::Error, (), e.span().start)
            .with_config(ariadne::Config::default().with_color(false))
            .with_message(e.to_string())
            .with_label(Label::new(e.span()).with_message(match e.found() {
                Some(c) => format!("Unexpected character {:?}", c),
                None => "Unexpected end of input".to_owned(),
            }))
            .finish();
        if report.write(Source::from(src), &mut out).is_err() {
            // Fall back to the bare message if the report cannot be rendered.
            out.extend_from_slice(e.to_string().as_bytes());
            out.push(b'\n');
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}
