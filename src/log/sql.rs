//! SQL text preparation for dumps.

use crate::config::SqlDumpConfig;

/// Formats and filters SQL text according to [`SqlDumpConfig`].
#[derive(Debug, Clone, Default)]
pub struct SqlFormatter {
    config: SqlDumpConfig,
}

impl SqlFormatter {
    pub fn new(config: SqlDumpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SqlDumpConfig {
        &self.config
    }

    /// Whether SQL of this kind should be dumped at all.
    ///
    /// Only applies once some kind is switched off; the kind is taken from the
    /// first six characters, so anything shorter is dropped while filtering.
    pub fn should_log(&self, sql: &str) -> bool {
        let filter = &self.config.dump;
        if !filter.is_filtering() {
            return true;
        }
        let prefix: String = sql.trim().chars().take(6).collect();
        if prefix.chars().count() < 6 {
            return false;
        }
        match prefix.to_lowercase().as_str() {
            "select" => filter.select,
            "insert" => filter.insert,
            "update" => filter.update,
            "delete" => filter.delete,
            "create" => filter.create,
            _ => false,
        }
    }

    /// Prepare SQL for a log line.
    pub fn format(&self, sql: &str) -> String {
        let sql = if self.config.trim { sql.trim() } else { sql };
        let mut out = if self.config.max_line_length > 0 {
            reflow(sql, self.config.max_line_length)
        } else {
            sql.to_string()
        };
        if self.config.add_semicolon {
            out.push(';');
        }
        if self.config.trim_extra_blank_lines {
            out = collapse_blank_lines(&out);
        }
        out
    }
}

/// Re-flow whitespace separated tokens, breaking once a line reaches `max` chars.
fn reflow(sql: &str, max: usize) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut line_len = 0;
    for token in sql.split_whitespace() {
        if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token.chars().count();
        if line_len >= max {
            out.push('\n');
            line_len = 0;
        }
    }
    if out.ends_with('\n') {
        out.pop();
    }
    out
}

/// Keep at most one blank line in a row.
fn collapse_blank_lines(text: &str) -> String {
    let mut lines = Vec::new();
    let mut blank_run = 0;
    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            lines.push("");
        } else {
            blank_run = 0;
            lines.push(line);
        }
    }
    lines.join("\n")
}
