//! Row consumer contract.
//!
//! A [`RowConsumer`] receives zero or more rows followed by exactly one
//! terminal signal. The terminal call consumes the boxed consumer, so a
//! second terminal signal cannot be expressed.
//!
//! [`row_channel`] pairs a consumer with a [`RowReceiver`]. Dropping or
//! closing the receiver closes the consumer, which producers treat as a
//! cancellation request.

use std::fmt;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tokio::sync::mpsc;

use common_error::{TesseraError, TesseraResult};

use crate::types::Row;

/// Sink for the result of one execution.
pub trait RowConsumer: Send + 'static {
    /// Deliver one row.
    fn accept(&mut self, row: Row);

    /// Deliver the terminal signal: the row count on success, or the failure.
    fn complete(self: Box<Self>, result: TesseraResult<u64>);

    /// Whether the consumer no longer wants results.
    fn is_closed(&self) -> bool {
        false
    }

    /// A future resolving once the consumer closes.
    ///
    /// The default never resolves; producers then only observe closing
    /// through [`is_closed`](Self::is_closed).
    fn closed(&self) -> BoxFuture<'static, ()> {
        future::pending().boxed()
    }
}

/// Boxed consumer passed through dispatch.
pub type BoxedRowConsumer = Box<dyn RowConsumer>;

/// Row delivered for a single acknowledgement: `1` if acknowledged, `0` otherwise.
pub fn acknowledgement_row(acknowledged: bool) -> Row {
    Row::single(i64::from(acknowledged))
}

/// A synchronous rejection that hands the untouched consumer back.
///
/// The consumer has not been signaled yet; whoever receives the rejection
/// owns the terminal signal.
pub struct Rejection {
    /// Why dispatch was refused.
    pub error: TesseraError,
    /// The consumer that was passed in.
    pub consumer: BoxedRowConsumer,
}

impl Rejection {
    /// Create a rejection.
    pub fn new(error: TesseraError, consumer: BoxedRowConsumer) -> Self {
        Self { error, consumer }
    }

    /// Route the error to the consumer's failure path.
    pub fn fail_consumer(self) {
        self.consumer.complete(Err(self.error));
    }

    /// Split into error and consumer.
    pub fn into_parts(self) -> (TesseraError, BoxedRowConsumer) {
        (self.error, self.consumer)
    }
}

impl fmt::Debug for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejection")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Channel consumer
// ============================================================================

/// Something delivered through a [`row_channel`].
#[derive(Debug)]
pub enum RowEvent {
    /// A result row.
    Row(Row),
    /// The terminal signal.
    Completed(TesseraResult<u64>),
}

/// Create a consumer and the receiver observing it.
pub fn row_channel() -> (ChannelConsumer, RowReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelConsumer { tx }, RowReceiver { rx })
}

/// Consumer half of a [`row_channel`].
#[derive(Debug)]
pub struct ChannelConsumer {
    tx: mpsc::UnboundedSender<RowEvent>,
}

impl ChannelConsumer {
    /// Box the consumer for dispatch.
    pub fn boxed(self) -> BoxedRowConsumer {
        Box::new(self)
    }
}

impl RowConsumer for ChannelConsumer {
    fn accept(&mut self, row: Row) {
        // A closed receiver discards rows.
        let _ = self.tx.send(RowEvent::Row(row));
    }

    fn complete(self: Box<Self>, result: TesseraResult<u64>) {
        let _ = self.tx.send(RowEvent::Completed(result));
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn closed(&self) -> BoxFuture<'static, ()> {
        let tx = self.tx.clone();
        async move { tx.closed().await }.boxed()
    }
}

/// Receiver half of a [`row_channel`].
#[derive(Debug)]
pub struct RowReceiver {
    rx: mpsc::UnboundedReceiver<RowEvent>,
}

impl RowReceiver {
    /// Next row or terminal signal; `None` once the consumer is gone.
    pub async fn next(&mut self) -> Option<RowEvent> {
        self.rx.recv().await
    }

    /// Stop accepting results; the producer sees a closed consumer.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Drain rows until the terminal signal.
    ///
    /// A consumer dropped without a terminal signal yields an internal error.
    pub async fn collect(mut self) -> Collected {
        let mut rows = Vec::new();
        while let Some(event) = self.rx.recv().await {
            match event {
                RowEvent::Row(row) => rows.push(row),
                RowEvent::Completed(outcome) => return Collected { rows, outcome },
            }
        }
        Collected {
            rows,
            outcome: Err(TesseraError::internal(
                "row consumer dropped without a terminal signal",
            )),
        }
    }
}

/// Everything a [`RowReceiver`] observed.
#[derive(Debug)]
pub struct Collected {
    /// Rows in delivery order.
    pub rows: Vec<Row>,
    /// The terminal signal.
    pub outcome: TesseraResult<u64>,
}

impl Collected {
    /// Rows if the execution succeeded.
    pub fn into_result(self) -> TesseraResult<Vec<Row>> {
        self.outcome.map(|_| self.rows)
    }
}
