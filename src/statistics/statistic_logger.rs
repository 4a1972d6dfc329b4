use std::fmt::Display;

use once_cell::sync::OnceCell;

#[derive(Debug, Clone, Copy)]
struct StatisticOptions {
    log_statistics: bool,
    statistics_prefix: &'static str,
    after_statistics: Option<&'static str>,
}

static STATISTIC_OPTIONS: OnceCell<StatisticOptions> = OnceCell::new();

/// Configures the logging of the statistics.
///
/// It specifies the (optional) prefix and a closing line (postfix) which can be written after all
/// of the statistics have been logged. The options can only be set once; later calls are ignored.
pub fn configure(log_statistics: bool, prefix: &'static str, after: Option<&'static str>) {
    let _ = STATISTIC_OPTIONS.set(StatisticOptions {
        log_statistics,
        statistics_prefix: prefix,
        after_statistics: after,
    });
}

/// Logs the provided statistic with name `name` and value `value`. At the moment it will log in
/// the format `prefix name=value`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    if let Some(options) = STATISTIC_OPTIONS.get() {
        if options.log_statistics {
            println!("{}{name}={value}", options.statistics_prefix)
        }
    }
}

/// Logs the postfix of the statistics (if it has been set).
pub fn log_statistic_postfix() {
    if let Some(options) = STATISTIC_OPTIONS.get() {
        if let Some(post_fix) = options.after_statistics {
            if options.log_statistics {
                println!("{post_fix}")
            }
        }
    }
}

/// Returns whether or not statistics should be logged by determining whether the
/// [`StatisticOptions`] have been set.
pub fn should_log_statistics() -> bool {
    STATISTIC_OPTIONS
        .get()
        .is_some_and(|options| options.log_statistics)
}
