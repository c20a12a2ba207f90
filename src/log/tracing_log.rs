use std::fmt;
use std::time::Duration;

use tracing::Level;

use super::targets::{AUDIT, CONNECTION, RESULT_SET, RESULT_TABLE, SQL_ONLY, SQL_TIMING};
use super::{SpyContext, SpyKind, SpyLog, SqlFormatter};
use crate::collector::RowCollector;
use crate::config::{Config, ResultSetConfig, TimingConfig};
use crate::error::DbError;
use crate::render::render_collected;
use crate::spy::ConnectionRegistry;

/// [`SpyLog`] writing to `tracing`, one target per event kind.
#[derive(Debug, Clone, Default)]
pub struct TracingSpyLog {
    sql: SqlFormatter,
    timing: TimingConfig,
    result_set: ResultSetConfig,
}

impl TracingSpyLog {
    pub fn new(config: &Config) -> Self {
        Self {
            sql: SqlFormatter::new(config.sql.clone()),
            timing: config.timing.clone(),
            result_set: config.result_set.clone(),
        }
    }

    /// Level for a statement that took `elapsed`.
    pub fn timing_level(&self, elapsed: Duration) -> Level {
        let ms = elapsed.as_millis();
        match (self.timing.warn_threshold_ms, self.timing.error_threshold_ms) {
            (_, Some(error)) if ms >= u128::from(error) => Level::ERROR,
            (Some(warn), _) if ms >= u128::from(warn) => Level::WARN,
            _ => Level::INFO,
        }
    }

    fn registry_dump(&self, registry: &ConnectionRegistry) {
        if tracing::enabled!(target: CONNECTION, Level::DEBUG) {
            tracing::debug!(target: CONNECTION, "{}", registry.dump());
        }
    }
}

impl SpyLog for TracingSpyLog {
    fn exception_occurred(
        &self,
        spy: &SpyContext,
        call: &dyn fmt::Display,
        error: &DbError,
        sql: Option<&str>,
        elapsed: Option<Duration>,
    ) {
        match sql {
            None => {
                tracing::error!(target: AUDIT, "{}.{} failed: {}", spy, call, error);
            }
            Some(sql) => {
                let sql = self.sql.format(sql);
                let ms = elapsed.map(|e| e.as_millis()).unwrap_or_default();
                tracing::error!(target: AUDIT, "{}.{} failed: {}", spy, call, error);
                tracing::error!(target: SQL_ONLY, "{}. {}", spy.connection_number.unwrap_or_default(), sql);
                tracing::error!(
                    target: SQL_TIMING,
                    "{}. {} {{FAILED after {} msec}}: {}",
                    spy.connection_number.unwrap_or_default(),
                    sql,
                    ms,
                    error
                );
            }
        }
    }

    fn method_returned(&self, spy: &SpyContext, call: &dyn fmt::Display, returned: &dyn fmt::Display) {
        if spy.kind == SpyKind::Cursor {
            tracing::info!(target: RESULT_SET, "{}.{} returned {}", spy, call, returned);
        } else {
            tracing::info!(target: AUDIT, "{}.{} returned {}", spy, call, returned);
        }
    }

    fn sql_occurred(&self, spy: &SpyContext, call: &dyn fmt::Display, sql: &str) {
        if !tracing::enabled!(target: SQL_ONLY, Level::INFO) || !self.sql.should_log(sql) {
            return;
        }
        let sql = self.sql.format(sql);
        tracing::debug!(target: SQL_ONLY, "{}.{}", spy, call);
        tracing::info!(target: SQL_ONLY, "{}. {}", spy.connection_number.unwrap_or_default(), sql);
    }

    fn sql_timing_occurred(
        &self,
        spy: &SpyContext,
        elapsed: Duration,
        call: &dyn fmt::Display,
        sql: &str,
    ) {
        if !tracing::enabled!(target: SQL_TIMING, Level::ERROR) || !self.sql.should_log(sql) {
            return;
        }
        let conn = spy.connection_number.unwrap_or_default();
        let ms = elapsed.as_millis();
        let level = self.timing_level(elapsed);
        if level == Level::ERROR {
            let sql = self.sql.format(sql);
            tracing::error!(target: SQL_TIMING, "{}. {} {{executed in {} msec}}", conn, sql, ms);
        } else if level == Level::WARN {
            let sql = self.sql.format(sql);
            tracing::warn!(target: SQL_TIMING, "{}. {} {{executed in {} msec}}", conn, sql, ms);
        } else if tracing::enabled!(target: SQL_TIMING, Level::INFO) {
            let sql = self.sql.format(sql);
            tracing::debug!(target: SQL_TIMING, "{}.{}", spy, call);
            tracing::info!(target: SQL_TIMING, "{}. {} {{executed in {} msec}}", conn, sql, ms);
        }
    }

    fn connection_opened(&self, spy: &SpyContext, elapsed: Duration, registry: &ConnectionRegistry) {
        tracing::info!(
            target: CONNECTION,
            "{}. Connection opened in {} msec",
            spy.connection_number.unwrap_or_default(),
            elapsed.as_millis()
        );
        self.registry_dump(registry);
    }

    fn connection_closed(&self, spy: &SpyContext, elapsed: Duration, registry: &ConnectionRegistry) {
        tracing::info!(
            target: CONNECTION,
            "{}. Connection closed after {} msec",
            spy.connection_number.unwrap_or_default(),
            elapsed.as_millis()
        );
        self.registry_dump(registry);
    }

    fn is_collection_enabled(&self) -> bool {
        self.result_set
            .collect
            .unwrap_or_else(|| tracing::enabled!(target: RESULT_TABLE, Level::INFO))
    }

    fn is_fill_in_enabled(&self) -> bool {
        self.result_set
            .fill_in_unread
            .unwrap_or_else(|| tracing::enabled!(target: RESULT_TABLE, Level::DEBUG))
    }

    fn is_statement_warn_enabled(&self) -> bool {
        self.sql.config().statement_warn
    }

    fn result_set_collected(&self, spy: &SpyContext, collector: &RowCollector) {
        if tracing::enabled!(target: RESULT_TABLE, Level::INFO) {
            tracing::info!(target: RESULT_TABLE, "{}\n{}", spy, render_collected(collector));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_thresholds(warn: Option<u64>, error: Option<u64>) -> TracingSpyLog {
        let mut config = Config::default();
        config.timing.warn_threshold_ms = warn;
        config.timing.error_threshold_ms = error;
        TracingSpyLog::new(&config)
    }

    #[test]
    fn test_timing_level_without_thresholds() {
        let log = with_thresholds(None, None);
        assert_eq!(log.timing_level(Duration::from_secs(60)), Level::INFO);
    }

    #[test]
    fn test_timing_level_thresholds() {
        let log = with_thresholds(Some(100), Some(1000));
        assert_eq!(log.timing_level(Duration::from_millis(99)), Level::INFO);
        assert_eq!(log.timing_level(Duration::from_millis(100)), Level::WARN);
        assert_eq!(log.timing_level(Duration::from_millis(999)), Level::WARN);
        assert_eq!(log.timing_level(Duration::from_millis(1000)), Level::ERROR);
    }

    #[test]
    fn test_error_threshold_alone() {
        let log = with_thresholds(None, Some(50));
        assert_eq!(log.timing_level(Duration::from_millis(10)), Level::INFO);
        assert_eq!(log.timing_level(Duration::from_millis(50)), Level::ERROR);
    }

    #[test]
    fn test_explicit_collection_switches() {
        let mut config = Config::default();
        config.result_set.collect = Some(true);
        config.result_set.fill_in_unread = Some(false);
        let log = TracingSpyLog::new(&config);
        assert!(log.is_collection_enabled());
        assert!(!log.is_fill_in_enabled());

        config.result_set.collect = Some(false);
        assert!(!TracingSpyLog::new(&config).is_collection_enabled());
    }

    #[test]
    fn test_statement_warn_follows_config() {
        let mut config = Config::default();
        assert!(!TracingSpyLog::new(&config).is_statement_warn_enabled());
        config.sql.statement_warn = true;
        assert!(TracingSpyLog::new(&config).is_statement_warn_enabled());
    }
}
