//! Statistics are written as `<prefix>name=value` lines on standard out, one per counter, when
//! enabled through [`configure`].
mod statistic_logger;

pub use statistic_logger::configure;
pub use statistic_logger::log_statistic;
pub use statistic_logger::log_statistic_postfix;
pub use statistic_logger::should_log_statistics;
