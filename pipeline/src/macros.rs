
/// Logs a line tagged with the pipeline component that emitted it.
/// Usage:
/// ```ignore
/// pipeline_log!(Level::Info, "ingest", "Indexed {} record(s)", n);
/// pipeline_log!(Level::Error, "detect", "search failed: {}", err);
/// ```
/// The component becomes the log target, so the binary's formatter prints:
/// [2026-04-25T16:32:10+02:00][INFO ][ingest][pid=4568][tid=ThreadId(1)] Indexed 3 record(s)
#[macro_export]
macro_rules! pipeline_log {
    ($level:expr, $component:expr, $fmt:expr $(, $($arg:tt)+)?) => {
        log::log!(
            target: $component,
            $level,
            $fmt
            $(, $($arg)+)?
        )
    };
}
