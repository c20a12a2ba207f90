//! dbspy - replay a query fixture through the logging layer
//!
//! Runs the fixture's query against an in-memory data source wrapped in spies,
//! reads the selected columns of each row and closes everything, so the
//! resulting SQL, timing, connection and result table logs can be inspected.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use dbspy::config;
use dbspy::log::{SpyLog, TracingSpyLog};
use dbspy::memory::Fixture;
use dbspy::{DataSourceSpy, Result, SpyError};

#[derive(Parser)]
#[command(name = "dbspy")]
#[command(version)]
#[command(about = "Replay a query fixture through the dbspy logging layer")]
struct Cli {
    /// Path to JSON fixture (query, columns and rows)
    #[arg(short, long)]
    fixture: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Columns to read from each row, 1-based and comma separated (default: all)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<usize>,

    /// Close the cursor after this many rows
    #[arg(long)]
    limit: Option<usize>,

    /// Fill in the columns that were not read
    #[arg(long)]
    fill_in: bool,

    /// Enable verbose/debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_config_from_str("")?,
    };
    if cli.fill_in {
        config.result_set.fill_in_unread = Some(true);
    }
    if config.result_set.collect.is_none() {
        config.result_set.collect = Some(true);
    }

    // Initialize logging
    // Priority: --verbose flag, then RUST_LOG env var, then configured level
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone())
    };
    tracing_subscriber::fmt().with_env_filter(&log_level).init();

    info!("Starting dbspy v{}", env!("CARGO_PKG_VERSION"));

    let fixture = Fixture::load(&cli.fixture)?;
    info!("Loaded fixture from {:?}", cli.fixture);

    let width = fixture.columns.len();
    let columns: Vec<usize> = if cli.columns.is_empty() {
        (1..=width).collect()
    } else {
        cli.columns.clone()
    };
    if let Some(bad) = columns.iter().find(|&&c| c == 0 || c > width) {
        return Err(SpyError::Config(format!(
            "--columns: {} is not a column of the fixture (1..={})",
            bad, width
        )));
    }

    let log: Arc<dyn SpyLog> = Arc::new(TracingSpyLog::new(&config));
    let source = DataSourceSpy::new(fixture.data_source()?, log);

    let mut conn = source.connection()?;
    let mut stmt = conn.create_statement()?;
    let mut cursor = stmt.execute_query(&fixture.sql)?;

    let mut read = 0;
    while cli.limit.map_or(true, |limit| read < limit) && cursor.next()? {
        for &ordinal in &columns {
            cursor.get_object(ordinal)?;
            cursor.was_null()?;
        }
        read += 1;
    }

    cursor.close()?;
    stmt.close()?;
    conn.close()?;

    info!("Replayed {} rows", read);
    Ok(())
}
