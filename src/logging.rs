use slog::{Discard, Logger};
use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::types::Severity;
use sloggers::Build;

/// Logger that throws everything away, used when the host doesn't hand the emulator one
pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Terminal logger writing to stderr at `severity` and above, for hosts that want to see what
/// the interpreter is doing
pub fn terminal_logger(severity: Severity) -> sloggers::Result<Logger> {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(severity);
    builder.destination(Destination::Stderr);
    builder.build()
}
