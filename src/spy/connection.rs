use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{ConnectionRegistry, StatementSpy};
use crate::api::Connection;
use crate::error::{DbError, Result, SpyError};
use crate::log::{SpyContext, SpyKind, SpyLog};

/// Wraps a connection. Registered in a [`ConnectionRegistry`] from creation
/// until it is closed or dropped.
pub struct ConnectionSpy<C: Connection> {
    inner: C,
    log: Arc<dyn SpyLog>,
    registry: Arc<ConnectionRegistry>,
    context: SpyContext,
    number: u64,
    opened_at: Instant,
    registered: bool,
}

impl<C: Connection> ConnectionSpy<C> {
    /// Wrap a connection that took `open_time` to establish.
    pub fn new(
        inner: C,
        log: Arc<dyn SpyLog>,
        registry: Arc<ConnectionRegistry>,
        open_time: Duration,
    ) -> Self {
        let number = registry.register();
        let context = SpyContext::new(SpyKind::Connection, Some(number));
        log.connection_opened(&context, open_time, &registry);
        Self {
            inner,
            log,
            registry,
            context,
            number,
            opened_at: Instant::now(),
            registered: true,
        }
    }

    /// Number assigned by the registry.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn create_statement(&mut self) -> Result<StatementSpy<C::Statement>> {
        match self.inner.create_statement() {
            Ok(statement) => {
                self.log
                    .method_returned(&self.context, &"create_statement()", &"Statement");
                Ok(StatementSpy::new(
                    statement,
                    Arc::clone(&self.log),
                    Some(self.number),
                ))
            }
            Err(e) => Err(self.fail(&"create_statement()", e)),
        }
    }

    pub fn commit(&mut self) -> Result<()> {
        match self.inner.commit() {
            Ok(()) => {
                self.log.method_returned(&self.context, &"commit()", &"void");
                Ok(())
            }
            Err(e) => Err(self.fail(&"commit()", e)),
        }
    }

    pub fn rollback(&mut self) -> Result<()> {
        match self.inner.rollback() {
            Ok(()) => {
                self.log.method_returned(&self.context, &"rollback()", &"void");
                Ok(())
            }
            Err(e) => Err(self.fail(&"rollback()", e)),
        }
    }

    /// Close the connection. It leaves the registry even if the close fails.
    pub fn close(&mut self) -> Result<()> {
        let result = self.inner.close();
        self.release();
        match result {
            Ok(()) => {
                self.log.method_returned(&self.context, &"close()", &"void");
                Ok(())
            }
            Err(e) => Err(self.fail(&"close()", e)),
        }
    }

    pub fn is_closed(&self) -> Result<bool> {
        match self.inner.is_closed() {
            Ok(closed) => {
                self.log
                    .method_returned(&self.context, &"is_closed()", &closed);
                Ok(closed)
            }
            Err(e) => Err(self.fail(&"is_closed()", e)),
        }
    }

    fn release(&mut self) {
        if !self.registered {
            return;
        }
        self.registered = false;
        self.registry.unregister(self.number);
        self.log
            .connection_closed(&self.context, self.opened_at.elapsed(), &self.registry);
    }

    fn fail(&self, call: &dyn fmt::Display, error: DbError) -> SpyError {
        self.log
            .exception_occurred(&self.context, call, &error, None, None);
        SpyError::Database(error)
    }
}

impl<C: Connection> Drop for ConnectionSpy<C> {
    fn drop(&mut self) {
        if self.registered {
            debug!(connection = self.number, "Connection spy dropped without close");
            self.release();
        }
    }
}

impl<C: Connection> fmt::Debug for ConnectionSpy<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSpy")
            .field("number", &self.number)
            .field("registered", &self.registered)
            .finish()
    }
}
