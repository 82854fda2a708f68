use colored::*;
use indicatif::ProgressStyle;
use rigscan_common::scan::{ScanPhase, ScanProgress};
use tracing::Span;
use tracing_indicatif::span_ext::IndicatifSpanExt;

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

const TIP: &str = "press 'q' to finish early";

fn progress_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.blue} {msg} {wide_bar:.green/black} {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS)
}

/// Turns `span` into the scan's progress bar.
pub fn attach(span: &Span, show_tip: bool) {
    span.pb_set_style(&progress_style());
    span.pb_set_message(&phase_message(ScanPhase::Discovery, show_tip));
}

/// Progress callback handed to the scanner.
pub fn reporter(span: Span, show_tip: bool) -> impl Fn(ScanProgress) + Send + Sync + 'static {
    move |progress: ScanProgress| {
        if progress.completed <= 1 {
            span.pb_set_message(&phase_message(progress.phase, show_tip));
        }
        span.pb_set_length(progress.total as u64);
        span.pb_set_position(progress.completed as u64);
    }
}

fn phase_message(phase: ScanPhase, show_tip: bool) -> String {
    let phase: String = match phase {
        ScanPhase::Discovery => "Discovering hosts".to_string(),
        ScanPhase::PortScan => "Probing ports".to_string(),
    };
    if show_tip {
        format!("{} {}", phase.bold(), format!("({TIP})").italic().bright_black())
    } else {
        phase.bold().to_string()
    }
}
