use crate::severity::LogSeverity;
use crate::systime::now;
use once_cell::sync::OnceCell;

static MAX_SEVERITY: OnceCell<LogSeverity> = OnceCell::new();

/// Sets the lowest severity that gets printed. Only the first call wins;
/// returns false if the level was already fixed.
pub fn init(min: LogSeverity) -> bool {
    MAX_SEVERITY.set(min).is_ok()
}

/// The active threshold: the `init` value, else `SKYSCHEM_LOG`, else `Info`.
pub fn max_severity() -> LogSeverity {
    *MAX_SEVERITY.get_or_init(|| {
        std::env::var("SKYSCHEM_LOG")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LogSeverity::Info)
    })
}

pub fn log(msg: String, log_severity: LogSeverity) {
    if log_severity < max_severity() {
        return;
    }
    if log_severity >= LogSeverity::Warning {
        eprintln!("[{}] {} {}", log_severity, now(), msg);
    } else {
        println!("[{}] {} {}", log_severity, now(), msg);
    }
}
