use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Wraps each field in brackets.
/// Format: [TIMESTAMP] [LEVEL] [COMMAND:MODULE] [TARGET: FILE:LINE]: MESSAGE
///
/// COMMAND is the innermost span, normally the running subcommand. Events
/// outside any span show the module alone.
pub struct BracketedFormatter;

impl<S, N> FormatEvent<S, N> for BracketedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        let now = chrono::Local::now();
        write!(writer, "[{}]  ", now.format("%Y-%m-%dT%H:%M:%S%.6f%:z"))?;
        write!(writer, "[{:5}] ", metadata.level())?;

        let span_name = ctx
            .event_scope()
            .and_then(|scope| scope.from_root().last().map(|span| span.name()));
        write!(writer, "[{}] ", scope_label(span_name, metadata.target()))?;

        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            write!(writer, "[{}: {}:{}]: ", metadata.target(), file, line)?;
        } else {
            write!(writer, "[{}]: ", metadata.target())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn module_name(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or("unknown")
}

fn scope_label(span_name: Option<&str>, target: &str) -> String {
    match span_name {
        Some(span) => format!("{}:{}", span, module_name(target)),
        None => module_name(target).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name_takes_last_segment() {
        assert_eq!(
            module_name("yolo_dataset_tools::core::partition::splitter"),
            "splitter"
        );
        assert_eq!(module_name("main"), "main");
    }

    #[test]
    fn test_scope_label_prefixes_command_span() {
        let target = "yolo_dataset_tools::core::partition::merger";
        assert_eq!(scope_label(Some("merge"), target), "merge:merger");
        assert_eq!(scope_label(None, target), "merger");
    }
}
