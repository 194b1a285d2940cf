// Copyright 2023 RisingWave Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Golden path tokenizer.

use std::str::FromStr;
use std::sync::LazyLock;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_until},
    character::complete::char,
    combinator::{cut, eof, map, peek, value},
    error::{context, ErrorKind, ParseError as _, VerboseError, VerboseErrorKind},
    multi::{fold_many1, many0, many1},
    sequence::{preceded, terminated, tuple},
    Finish, IResult, Offset,
};
use regex::Regex;
use serde_json::Number;

use crate::node::*;

/// Everything between two markers is taken verbatim.
pub const ESCAPE_MARKER: &str = "##";

const KEY_STOPS: &str = ".[]*!=<>";
const PROPERTY_STOPS: &str = "[]!=<>";
const LITERAL_STOPS: &str = "[]";

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$").expect("valid regex")
});

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

impl GoldenPath {
    /// Parse a golden path from string.
    pub fn new(s: &str) -> Result<Self, Error> {
        let (rest, segments) = segments(s)
            .finish()
            .map_err(|e| Error::from_verbose_error(s, e))?;
        if !rest.is_empty() {
            let message = if rest.starts_with(']') {
                "unbalanced brackets"
            } else {
                "unexpected character"
            };
            return Err(Error {
                position: s.offset(rest),
                message: message.into(),
            });
        }
        Ok(GoldenPath {
            segments,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }
}

impl FromStr for GoldenPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoldenPath::new(s)
    }
}

/// Wraps `value` in escape markers so it can be embedded in a query verbatim.
///
/// `value` must not itself contain [`ESCAPE_MARKER`].
pub fn escape(value: &str) -> String {
    format!("{ESCAPE_MARKER}{value}{ESCAPE_MARKER}")
}

/// The error type returned when parsing a golden path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("at position {position}, {message}")]
pub struct Error {
    position: usize,
    message: Box<str>,
}

impl Error {
    /// The byte offset in the query where parsing failed.
    pub fn position(&self) -> usize {
        self.position
    }

    /// A short description of what was malformed.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_verbose_error(input: &str, err: VerboseError<&str>) -> Self {
        // the innermost context is the most specific one
        let (at, message) = err
            .errors
            .iter()
            .find_map(|(at, kind)| match kind {
                VerboseErrorKind::Context(ctx) => Some((*at, *ctx)),
                _ => None,
            })
            .unwrap_or_else(|| {
                let at = err.errors.first().map_or(input, |(at, _)| *at);
                (at, "invalid query")
            });
        Self {
            position: input.offset(at),
            message: message.into(),
        }
    }
}

fn segments(input: &str) -> Res<'_, Vec<Segment>> {
    map(
        many0(alt((
            value(None, char('.')),
            map(greedy, Some),
            map(conditions, |conditions| {
                Some(Segment::Filter {
                    greedy: false,
                    conditions,
                })
            }),
            map(key, Some),
        ))),
        |segments| segments.into_iter().flatten().collect(),
    )(input)
}

fn greedy(input: &str) -> Res<'_, Segment> {
    preceded(
        char('*'),
        cut(context(
            "unexpected character",
            alt((
                map(conditions, |conditions| Segment::Filter {
                    greedy: true,
                    conditions,
                }),
                value(Segment::Wildcard, peek(alt((tag("."), eof)))),
            )),
        )),
    )(input)
}

fn key(input: &str) -> Res<'_, Segment> {
    map(word(KEY_STOPS), |key| Segment::Key(PathKey::normalize(key)))(input)
}

fn conditions(input: &str) -> Res<'_, Vec<Condition>> {
    many1(condition)(input)
}

fn condition(input: &str) -> Res<'_, Condition> {
    map(
        preceded(
            char('['),
            cut(terminated(
                tuple((
                    context("missing property", word(PROPERTY_STOPS)),
                    context("unrecognized operator", compare_op),
                    context("missing literal", word(LITERAL_STOPS)),
                )),
                context("unbalanced brackets", char(']')),
            )),
        ),
        |(property, op, literal)| Condition {
            property,
            op,
            literal: Literal::parse(&literal),
        },
    )(input)
}

fn compare_op(input: &str) -> Res<'_, CompareOp> {
    alt((
        value(CompareOp::Ge, tag(">=")),
        value(CompareOp::Le, tag("<=")),
        value(CompareOp::Ne, tag("!=")),
        value(CompareOp::Gt, char('>')),
        value(CompareOp::Lt, char('<')),
        value(CompareOp::Eq, char('=')),
    ))(input)
}

/// Plain characters and escaped spans, concatenated.
fn word<'a>(stops: &'static str) -> impl FnMut(&'a str) -> Res<'a, String> {
    fold_many1(
        alt((escaped, plain(stops))),
        String::new,
        |mut acc, part| {
            acc.push_str(part);
            acc
        },
    )
}

fn escaped(input: &str) -> Res<'_, &str> {
    preceded(
        tag(ESCAPE_MARKER),
        cut(context(
            "unterminated escape",
            terminated(take_until(ESCAPE_MARKER), tag(ESCAPE_MARKER)),
        )),
    )(input)
}

fn plain<'a>(stops: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    move |input: &'a str| {
        let end = input
            .char_indices()
            .find(|&(i, c)| stops.contains(c) || input[i..].starts_with(ESCAPE_MARKER))
            .map_or(input.len(), |(i, _)| i);
        if end == 0 {
            return Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                ErrorKind::TakeWhile1,
            )));
        }
        Ok((&input[end..], &input[..end]))
    }
}

impl Literal {
    /// Types a condition literal.
    ///
    /// Anything that is not a boolean, a number or a quoted string is taken as a
    /// bare string, so `[sex=male]` compares against `"male"`.
    pub(crate) fn parse(raw: &str) -> Self {
        match raw {
            "true" => return Literal::Bool(true),
            "false" => return Literal::Bool(false),
            _ => {}
        }
        if NUMBER.is_match(raw) {
            let number = raw
                .parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| raw.parse::<f64>().ok().and_then(Number::from_f64));
            if let Some(number) = number {
                return Literal::Number(number);
            }
        }
        let mut chars = raw.chars();
        if let (Some(first), Some(last)) = (chars.next(), chars.next_back()) {
            if first == last && matches!(first, '\'' | '"' | '`') {
                return Literal::String(raw[1..raw.len() - 1].to_owned());
            }
        }
        Literal::String(raw.to_owned())
    }
}
