use std::fmt;

use colored::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::terminal::print::PRINT_TARGET;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `verbosity`. With `to_stderr` stdout is left to the
/// caller, which is what `--json` needs.
pub fn init_logging(verbosity: u8, to_stderr: bool) -> anyhow::Result<()> {
    let level: &str = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let indicatif_layer = IndicatifLayer::new();
    let writer: BoxMakeWriter = if to_stderr {
        BoxMakeWriter::new(indicatif_layer.get_stderr_writer())
    } else {
        BoxMakeWriter::new(indicatif_layer.get_stdout_writer())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(RigscanFormatter)
                .with_writer(writer),
        )
        .with(indicatif_layer)
        .try_init()?;

    Ok(())
}

pub struct RigscanFormatter;

impl<S, N> FormatEvent<S, N> for RigscanFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let mut fields = EventFields::default();
        event.record(&mut fields);

        if meta.target() == PRINT_TARGET {
            return writeln!(writer, "{}", fields.raw_msg.unwrap_or(fields.message));
        }

        let (symbol, color_func): (&str, fn(ColoredString) -> ColoredString) = match *meta.level() {
            Level::TRACE => ("[ ]", |s| s.dimmed()),
            Level::DEBUG => ("[?]", |s| s.blue()),
            Level::INFO if fields.success => ("[+]", |s| s.bright_green().bold()),
            Level::INFO => ("[+]", |s| s.green()),
            Level::WARN => ("[*]", |s| s.yellow().bold()),
            Level::ERROR => ("[-]", |s| s.red().bold()),
        };

        write!(writer, "{} {}", color_func(symbol.into()), fields.message)?;
        for (name, value) in &fields.extra {
            write!(writer, " {}", format!("{name}={value}").dimmed())?;
        }
        writeln!(writer)
    }
}

/// The fields of one event, split into the message, the raw print payload,
/// the `success` flag and everything else.
#[derive(Default)]
struct EventFields {
    message: String,
    raw_msg: Option<String>,
    success: bool,
    extra: Vec<(&'static str, String)>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "raw_msg" => self.raw_msg = Some(value.to_string()),
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "success" => self.success = value,
            name => self.extra.push((name, value.to_string())),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            name => self.extra.push((name, format!("{value:?}"))),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        colored::control::set_override(false);
        let out = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .event_format(RigscanFormatter)
            .with_writer(out.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        let bytes = out.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn levels_get_symbols() {
        let output = capture(|| {
            rigscan_common::success!("found {} rigs", 2);
            rigscan_common::warn!("slow network");
            rigscan_common::error!("gave up");
        });
        assert_eq!(output, "[+] found 2 rigs\n[*] slow network\n[-] gave up\n");
    }

    #[test]
    fn print_target_is_verbatim() {
        let output = capture(|| crate::terminal::print::print("  ├─ raw line"));
        assert_eq!(output, "  ├─ raw line\n");
    }

    #[test]
    fn extra_fields_follow_the_message() {
        let output = capture(|| tracing::info!(port = 4028, "open"));
        assert_eq!(output, "[+] open port=4028\n");
    }
}
