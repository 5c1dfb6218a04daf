//! Single-acknowledgement adapter.
//!
//! Management actions answer with one response instead of a row stream.
//! [`OneRowListener`] turns that response into exactly one row followed by a
//! success terminal with count 1, or forwards the action's failure unchanged.

use std::future::Future;

use log::debug;
use tokio::task::JoinHandle;

use common_error::{TesseraError, TesseraResult};
use tessera_core::{BoxedRowConsumer, Row};

/// Completes a consumer from a single action response.
pub struct OneRowListener<F> {
    consumer: BoxedRowConsumer,
    to_row: F,
}

impl<F> OneRowListener<F> {
    /// Create a listener mapping the response with `to_row`.
    pub fn new(consumer: BoxedRowConsumer, to_row: F) -> Self {
        Self { consumer, to_row }
    }

    /// Deliver the outcome of the action.
    ///
    /// A closed consumer receives no row, only a cancellation terminal.
    pub fn on_response<T>(self, result: TesseraResult<T>)
    where
        F: FnOnce(T) -> Row,
    {
        let Self {
            mut consumer,
            to_row,
        } = self;

        match result {
            Ok(_) if consumer.is_closed() => {
                debug!("consumer closed before the response arrived, dropping it");
                consumer.complete(Err(TesseraError::cancelled("consumer closed")));
            }
            Ok(response) => {
                consumer.accept(to_row(response));
                consumer.complete(Ok(1));
            }
            Err(e) => consumer.complete(Err(e)),
        }
    }

    /// Await `action` on a new task and deliver its outcome.
    pub fn attach<T, A>(self, action: A) -> JoinHandle<()>
    where
        A: Future<Output = TesseraResult<T>> + Send + 'static,
        T: Send + 'static,
        F: FnOnce(T) -> Row + Send + 'static,
    {
        common_runtime::spawn(async move {
            let result = action.await;
            self.on_response(result);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::{acknowledgement_row, row_channel};

    #[tokio::test]
    async fn test_acknowledged() {
        let (consumer, receiver) = row_channel();
        OneRowListener::new(consumer.boxed(), acknowledgement_row).on_response(Ok(true));

        let collected = receiver.collect().await;
        assert_eq!(collected.rows, vec![Row::single(1i64)]);
        assert_eq!(collected.outcome.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_not_acknowledged_is_not_a_failure() {
        let (consumer, receiver) = row_channel();
        OneRowListener::new(consumer.boxed(), acknowledgement_row).on_response(Ok(false));

        let collected = receiver.collect().await;
        assert_eq!(collected.rows, vec![Row::single(0i64)]);
        assert_eq!(collected.outcome.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failure_forwarded_without_row() {
        let (consumer, receiver) = row_channel();
        OneRowListener::new(consumer.boxed(), acknowledgement_row)
            .on_response::<bool>(Err(TesseraError::remote("master not discovered")));

        let collected = receiver.collect().await;
        assert!(collected.rows.is_empty());
        match collected.outcome {
            Err(TesseraError::RemoteError(msg)) => assert_eq!(msg, "master not discovered"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_attach() {
        let (consumer, receiver) = row_channel();
        OneRowListener::new(consumer.boxed(), acknowledgement_row)
            .attach(async { Ok(true) })
            .await
            .unwrap();

        assert_eq!(receiver.collect().await.into_result().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_closed_consumer_gets_no_row() {
        let (consumer, mut receiver) = row_channel();
        receiver.close();
        OneRowListener::new(consumer.boxed(), acknowledgement_row).on_response(Ok(true));

        assert!(receiver.next().await.is_none());
    }
}
