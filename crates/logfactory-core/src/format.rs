//! Record format templates
//!
//! A template is plain text with `{field}` placeholders. Supported fields:
//!
//! | Field        | Alias        | Value                                  |
//! |--------------|--------------|----------------------------------------|
//! | `module`     |              | source unit that emitted the record     |
//! | `timestamp`  | `asctime`    | local time, `2024-05-01 13:45:10,123`  |
//! | `logger`     | `name`       | logger name                            |
//! | `level`      | `levelname`  | severity label                         |
//! | `function`   | `funcName`   | calling function                       |
//! | `line`       | `lineno`     | calling line number                    |
//! | `message`    |              | message text                           |
//!
//! `{{` and `}}` produce literal braces.

use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::error::{LogError, LogResult};
use crate::severity::Severity;

/// Template used when a logger is built without an explicit format
pub const DEFAULT_FORMAT: &str =
    "{module} - {timestamp} — {logger} — {level} - {function}:{line} — {message}";

/// `asctime`-style timestamp layout
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Function name used when the caller's function is not known
pub const UNKNOWN_FUNCTION: &str = "?";

/// Where a record was emitted from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callsite {
    pub module: String,
    pub function: String,
    pub line: u32,
}

impl Callsite {
    pub fn new(module: impl Into<String>, function: impl Into<String>, line: u32) -> Self {
        Self {
            module: module.into(),
            function: function.into(),
            line,
        }
    }

    /// Callsite of whoever called the `#[track_caller]` chain leading here
    ///
    /// The module is the caller's file stem; the function is unknown.
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self::from_file(location.file(), location.line())
    }

    /// Build a callsite from a source path and line
    pub fn from_file(file: &str, line: u32) -> Self {
        let module = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file);
        Self::new(module, UNKNOWN_FUNCTION, line)
    }
}

/// One log event, ready to render
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub logger: &'a str,
    pub level: Severity,
    pub message: &'a str,
    pub callsite: &'a Callsite,
    pub time: DateTime<Local>,
}

impl<'a> Record<'a> {
    /// Create a record stamped with the current local time
    pub fn now(logger: &'a str, level: Severity, message: &'a str, callsite: &'a Callsite) -> Self {
        Self {
            logger,
            level,
            message,
            callsite,
            time: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Module,
    Timestamp,
    Logger,
    Level,
    Function,
    Line,
    Message,
}

impl Field {
    fn parse(name: &str) -> Option<Field> {
        match name {
            "module" => Some(Field::Module),
            "timestamp" | "asctime" => Some(Field::Timestamp),
            "logger" | "name" => Some(Field::Logger),
            "level" | "levelname" => Some(Field::Level),
            "function" | "funcName" => Some(Field::Function),
            "line" | "lineno" => Some(Field::Line),
            "message" => Some(Field::Message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// A parsed format template
///
/// Parsing happens once at logger construction; rendering never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTemplate {
    source: String,
    segments: Vec<Segment>,
}

/// Templates are shared by every destination of a logger
pub type SharedFormat = Arc<FormatTemplate>;

impl Default for FormatTemplate {
    fn default() -> Self {
        Self::default_format()
    }
}

impl FormatTemplate {
    /// Parse a template
    ///
    /// # Errors
    /// `LogError::InvalidFormat` for unknown fields, unclosed `{` or a stray `}`.
    pub fn parse(source: impl Into<String>) -> LogResult<Self> {
        let source = source.into();
        let segments = parse_segments(&source)?;
        Ok(Self { source, segments })
    }

    /// A fresh copy of the default template
    pub fn default_format() -> Self {
        Self {
            source: DEFAULT_FORMAT.to_string(),
            segments: parse_segments(DEFAULT_FORMAT).unwrap_or_default(),
        }
    }

    /// The template text as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render a record, without a trailing newline
    pub fn render(&self, record: &Record<'_>) -> String {
        let mut out = String::with_capacity(self.source.len() + record.message.len() + 32);
        // Writing into a String cannot fail
        let _ = self.render_into(&mut out, record);
        out
    }

    fn render_into(&self, out: &mut String, record: &Record<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Module) => out.push_str(&record.callsite.module),
                Segment::Field(Field::Timestamp) => {
                    write!(out, "{}", record.time.format(TIMESTAMP_FORMAT))?
                }
                Segment::Field(Field::Logger) => out.push_str(record.logger),
                Segment::Field(Field::Level) => out.push_str(record.level.as_str()),
                Segment::Field(Field::Function) => out.push_str(&record.callsite.function),
                Segment::Field(Field::Line) => write!(out, "{}", record.callsite.line)?,
                Segment::Field(Field::Message) => out.push_str(record.message),
            }
        }
        Ok(())
    }
}

impl fmt::Display for FormatTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for FormatTemplate {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_segments(source: &str) -> LogResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                literal.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                if !closed {
                    return Err(LogError::invalid_format(format!(
                        "unclosed '{{' at byte {pos} in {source:?}"
                    )));
                }
                let field = Field::parse(name.trim()).ok_or_else(|| {
                    LogError::invalid_format(format!("unknown field '{{{name}}}' in {source:?}"))
                })?;
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Field(field));
            }
            '}' => {
                return Err(LogError::invalid_format(format!(
                    "unmatched '}}' at byte {pos} in {source:?}"
                )));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_record<'a>(callsite: &'a Callsite, message: &'a str) -> Record<'a> {
        Record {
            logger: "logger1",
            level: Severity::Debug,
            message,
            callsite,
            time: Local.with_ymd_and_hms(2024, 5, 1, 13, 45, 10).unwrap(),
        }
    }

    #[test]
    fn test_default_format_field_order() {
        let callsite = Callsite::new("main", "run", 42);
        let line = FormatTemplate::default_format().render(&fixed_record(&callsite, "Hello World"));
        assert_eq!(
            line,
            "main - 2024-05-01 13:45:10,000 — logger1 — DEBUG - run:42 — Hello World"
        );
    }

    #[test]
    fn test_aliases_and_escapes() {
        let callsite = Callsite::new("m", "f", 7);
        let template = FormatTemplate::parse("{{{levelname}}} {name}:{lineno} {funcName} {message}").unwrap();
        assert_eq!(
            template.render(&fixed_record(&callsite, "hi")),
            "{DEBUG} logger1:7 f hi"
        );
    }

    #[test]
    fn test_rejects_malformed_templates() {
        assert!(matches!(FormatTemplate::parse("{message"), Err(LogError::InvalidFormat(_))));
        assert!(matches!(FormatTemplate::parse("oops}"), Err(LogError::InvalidFormat(_))));
        let err = FormatTemplate::parse("{thread} {message}").unwrap_err();
        assert!(err.to_string().contains("thread"));
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: FormatTemplate = "{level} {message}".parse().unwrap();
        assert_eq!(parsed, FormatTemplate::parse("{level} {message}").unwrap());
        assert_eq!(FormatTemplate::default(), FormatTemplate::default_format());
    }

    #[test]
    fn test_plain_text_template() {
        let callsite = Callsite::new("m", "f", 1);
        let template = FormatTemplate::parse("static").unwrap();
        assert_eq!(template.render(&fixed_record(&callsite, "ignored")), "static");
        assert_eq!(template.to_string(), "static");
    }

    #[test]
    fn test_callsite_from_file() {
        let callsite = Callsite::from_file("src/bin/worker.rs", 12);
        assert_eq!(callsite.module, "worker");
        assert_eq!(callsite.function, UNKNOWN_FUNCTION);
        assert_eq!(callsite.line, 12);

        let here = Callsite::caller();
        assert_eq!(here.module, "format");
    }
}
