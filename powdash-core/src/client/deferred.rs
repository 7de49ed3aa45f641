use super::ClientError;
use crate::call::{CallError, Cancelable, MisuseError, Writable};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Completion callback handed to a call started through [`Deferred::new`].
pub type Callback<T> = Box<dyn FnOnce(Result<T, ClientError>) + Send>;

/// A call whose completion callback resolves a future.
///
/// `Deferred` keeps the call handle, so writes can still go through [`Deferred::call`] before the
/// result is awaited. Dropping an unresolved `Deferred` cancels the call.
#[must_use = "dropping a Deferred cancels its call"]
pub struct Deferred<T, H: Cancelable> {
    rx: oneshot::Receiver<Result<T, ClientError>>,
    call: H,
}

impl<T, H> Deferred<T, H>
where
    T: Send + 'static,
    H: Cancelable,
{
    /// Starts a call through `start`, wiring its completion callback to this future.
    pub fn new<F>(start: F) -> Result<Self, ClientError>
    where
        F: FnOnce(Callback<T>) -> Result<H, ClientError>,
    {
        let (tx, rx) = oneshot::channel();
        let call = start(Box::new(move |result| {
            // The receiver is gone only when the Deferred was dropped.
            let _ = tx.send(result);
        }))?;
        Ok(Self { rx, call })
    }

    pub fn call(&self) -> &H {
        &self.call
    }
}

impl<T, H> Deferred<T, H>
where
    T: Send + 'static,
    H: Cancelable + Writable + Unpin,
{
    /// Writes every request of `requests`, half-closes, and resolves with the call's result.
    ///
    /// A call that ends while requests are still being written stops the writes and resolves
    /// with the result it ended with.
    pub async fn send_all<I>(mut self, requests: I) -> Result<T, ClientError>
    where
        I: IntoIterator<Item = H::Request>,
    {
        for request in requests {
            if let Err(err) = self.call.write(&request) {
                return self.settle(err);
            }
        }
        if let Err(err) = self.call.end() {
            return self.settle(err);
        }
        self.await
    }

    /// The result the call already completed with, or `err` when it never completed.
    fn settle(&mut self, err: MisuseError) -> Result<T, ClientError> {
        match self.rx.try_recv() {
            Ok(result) => result,
            Err(_) => Err(err.into()),
        }
    }
}

impl<T, H> Future for Deferred<T, H>
where
    H: Cancelable + Unpin,
{
    type Output = Result<T, ClientError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(ClientError::Call(CallError::Cancelled))))
    }
}

impl<T, H: Cancelable> Drop for Deferred<T, H> {
    fn drop(&mut self) {
        self.call.cancel();
    }
}
