use super::ClientError;
use crate::call::{Cancelable, Listeners, ServerStreamCall};
use crate::ServiceError;
use futures_util::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Responses of a server streaming call as a [`Stream`].
///
/// The stream ends when the call ends. A non-OK status or an undecodable frame is yielded as a
/// final error item. Dropping the stream cancels the call.
pub struct ResponseStream<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    inner: UnboundedReceiverStream<Result<Res, ClientError>>,
    call: ServerStreamCall<Req, Res>,
}

impl<Req, Res> ResponseStream<Req, Res>
where
    Req: Send + 'static,
    Res: Clone + Send + 'static,
{
    /// Starts a call through `start` with listeners that feed this stream.
    pub(crate) fn start<F>(start: F) -> Result<Self, ClientError>
    where
        F: FnOnce(Listeners<Res>) -> Result<ServerStreamCall<Req, Res>, ClientError>,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let data_tx = tx.clone();
        let status_tx = tx.clone();

        // The senders live in the listeners, which the engine drops once the call is closed.
        // That closes the channel and ends the stream.
        let listeners = Listeners::new()
            .on_data(move |message: &Res| {
                let _ = data_tx.send(Ok(message.clone()));
            })
            .on_status(move |status| {
                if !status.is_ok() {
                    let err = ServiceError::from(status.clone());
                    let _ = status_tx.send(Err(ClientError::from(err)));
                }
            })
            .on_error(move |err| {
                let _ = tx.send(Err(ClientError::Call(err.clone())));
            });

        let call = start(listeners)?;
        Ok(Self {
            inner: UnboundedReceiverStream::new(rx),
            call,
        })
    }

    pub fn call(&self) -> &ServerStreamCall<Req, Res> {
        &self.call
    }
}

impl<Req, Res> Stream for ResponseStream<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    type Item = Result<Res, ClientError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

impl<Req, Res> Drop for ResponseStream<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn drop(&mut self) {
        self.call.cancel();
    }
}
