use ola_rpc_client::Transport;
use tokio::{runtime, sync::oneshot, task::JoinHandle, time::Instant};

use crate::poll::PollEngine;

/// Runs poll cycles on a fixed interval until dropped.
///
/// The first cycle runs immediately. Cycles do not wait for the lookups of
/// the previous cycle.
pub struct Poller {
    inner: Option<Inner>,
}

/// Inner type for polling on a separate task, required for implementation
/// of `Drop`.
struct Inner {
    cancellation_sender: oneshot::Sender<()>,
    background_task: JoinHandle<()>,
}

impl Poller {
    pub fn new<TransportT: Transport>(
        runtime: &runtime::Handle,
        engine: PollEngine<TransportT>,
    ) -> Self {
        let (cancellation_sender, cancellation_receiver) = oneshot::channel();
        let background_task =
            runtime.spawn(async move { polling_loop(engine, cancellation_receiver).await });

        Self {
            inner: Some(Inner {
                cancellation_sender,
                background_task,
            }),
        }
    }

    /// Whether the polling task is still running.
    pub fn is_running(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|inner| !inner.background_task.is_finished())
    }
}

#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
async fn polling_loop<TransportT: Transport>(
    engine: PollEngine<TransportT>,
    mut cancellation_receiver: oneshot::Receiver<()>,
) {
    let interval = engine.config().polling_interval;
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            _ = &mut cancellation_receiver => return,
            () = tokio::time::sleep_until(deadline) => {
                deadline = Instant::now() + interval;

                tokio::select! {
                    // Stop without waiting for the chain head
                    _ = &mut cancellation_receiver => return,
                    tick = engine.poll() => {
                        log::trace!("Started poll cycle {}", tick.poll_id());
                    }
                }
            },
        }
    }
}

impl Drop for Poller {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    fn drop(&mut self) {
        if let Some(Inner {
            cancellation_sender,
            background_task,
        }) = self.inner.take()
        {
            if cancellation_sender.send(()).is_err() {
                log::debug!("Polling task already stopped");
                background_task.abort();
            }
        }
    }
}
