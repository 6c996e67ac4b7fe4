//! Console logger: one colored line per event.
//!
//! ```text
//! \x1b[32;1m [SUCCESS] 2026-02-22 06:10:03 Epidemic report submitted \x1b[0m
//! ```
//!
//! `ERROR`/`WARN` render as `[ERROR]`, events carrying `success = true`
//! (see `yqfk_core::success!`) as `[SUCCESS]`, everything else as `[INFO]`.

use std::fmt::{self, Write as _};

use chrono::Utc;
use chrono_tz::Tz;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Success,
    Error,
    Info,
}

impl Tag {
    fn for_event(level: &Level, success: bool) -> Self {
        if *level <= Level::WARN {
            Tag::Error
        } else if success {
            Tag::Success
        } else {
            Tag::Info
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tag::Success => "[SUCCESS]",
            Tag::Error => "[ERROR]",
            Tag::Info => "[INFO]",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Tag::Success => "\x1b[32;1m",
            Tag::Error => "\x1b[31;1m",
            Tag::Info => "\x1b[36;1m",
        }
    }
}

pub fn render_line(tag: Tag, timestamp: &str, message: &str) -> String {
    format!(
        "{} {} {} {} {}",
        tag.color(),
        tag.label(),
        timestamp,
        message,
        RESET
    )
}

/// Collects the message and the `success` flag; other fields are appended
/// as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    extra: String,
    success: bool,
}

impl LineVisitor {
    fn line(&self) -> String {
        if self.extra.is_empty() {
            self.message.clone()
        } else {
            format!("{}{}", self.message, self.extra)
        }
    }
}

impl Visit for LineVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "success" {
            self.success = value;
        } else {
            let _ = write!(self.extra, " {}={}", field.name(), value);
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            let _ = write!(self.extra, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            let _ = write!(self.extra, " {}={:?}", field.name(), value);
        }
    }
}

/// `tracing-subscriber` event formatter producing [`render_line`] output.
pub struct ConsoleFormat {
    tz: Tz,
}

impl ConsoleFormat {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let tag = Tag::for_event(event.metadata().level(), visitor.success);
        let timestamp = Utc::now()
            .with_timezone(&self.tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        writeln!(writer, "{}", render_line(tag, &timestamp, &visitor.line()))
    }
}

/// Install the console logger. `RUST_LOG` overrides the default filter.
pub fn init(tz: Tz, verbose: bool) {
    let filter = if verbose {
        "debug,hyper_util=info,reqwest=info"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .event_format(ConsoleFormat::new(tz))
        .init();
}
