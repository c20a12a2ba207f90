use std::sync::Arc;
use std::time::Instant;

use super::{ConnectionRegistry, ConnectionSpy};
use crate::api::DataSource;
use crate::error::{Result, SpyError};
use crate::log::{SpyContext, SpyKind, SpyLog};

/// Wraps a data source so every connection it hands out is spied on.
pub struct DataSourceSpy<D: DataSource> {
    inner: D,
    log: Arc<dyn SpyLog>,
    registry: Arc<ConnectionRegistry>,
}

impl<D: DataSource> DataSourceSpy<D> {
    /// Spy registering connections in the process-wide registry.
    pub fn new(inner: D, log: Arc<dyn SpyLog>) -> Self {
        Self::with_registry(inner, log, ConnectionRegistry::global())
    }

    pub fn with_registry(inner: D, log: Arc<dyn SpyLog>, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            inner,
            log,
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn connection(&self) -> Result<ConnectionSpy<D::Connection>> {
        let start = Instant::now();
        match self.inner.connection() {
            Ok(conn) => Ok(ConnectionSpy::new(
                conn,
                Arc::clone(&self.log),
                Arc::clone(&self.registry),
                start.elapsed(),
            )),
            Err(e) => {
                let context = SpyContext::new(SpyKind::DataSource, None);
                self.log
                    .exception_occurred(&context, &"connection()", &e, None, None);
                Err(SpyError::Database(e))
            }
        }
    }
}
