use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::{IsTerminal, Write};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Logger that prints colored, timestamped lines to stderr
struct CliLogger;

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let start = START_TIME.get_or_init(Instant::now);
        let module = record.module_path().unwrap_or("unknown");
        let line = format_line(start.elapsed(), record.level(), module, &record.args().to_string());

        // Ignore write errors: a closed stderr must not abort an upload
        let _ = writeln!(std::io::stderr().lock(), "{}", colorize(record.level(), line));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: CliLogger = CliLogger;

fn compact_timestamp(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let millis = elapsed.subsec_millis();
    if seconds < 60 {
        format!("{:>3}.{:03}s", seconds, millis)
    } else if seconds < 3600 {
        format!("{:>2}m{:02}s", seconds / 60, seconds % 60)
    } else {
        format!("{:>2}h{:02}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

/// Render one log line without colors: `  1.250s [I]       stager | message`
pub fn format_line(elapsed: Duration, level: Level, module_path: &str, message: &str) -> String {
    let level_char = match level {
        Level::Error => 'E',
        Level::Warn => 'W',
        Level::Info => 'I',
        Level::Debug => 'D',
        Level::Trace => 'T',
    };
    let module = module_path.rsplit("::").next().unwrap_or("unknown");
    let module_display = if module.len() > 12 { &module[..12] } else { module };

    format!(
        "{} [{}] {:>12} | {}",
        compact_timestamp(elapsed),
        level_char,
        module_display,
        message
    )
}

fn colorize(level: Level, line: String) -> ColoredString {
    match level {
        Level::Error => line.bright_red(),
        Level::Warn => line.bright_yellow(),
        Level::Info => line.bright_green(),
        Level::Debug => line.bright_blue(),
        Level::Trace => line.bright_black(),
    }
}

/// Map `-q` / `-v` counts to a level filter. Quiet wins over verbose.
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the logger. Colors are dropped when stderr is not a terminal.
pub fn init_logger(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let _ = START_TIME.set(Instant::now());
    if !std::io::stderr().is_terminal() {
        colored::control::set_override(false);
    }
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
