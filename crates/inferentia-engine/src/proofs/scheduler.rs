//! The concurrency harness: a dedicated background thread running a private
//! `tokio` runtime, used to bridge async proof streams into the synchronous
//! `prove` entry point, plus `multiplex`, which fans several proof streams
//! into one.

use std::cell::Cell;
use std::sync::Arc;
use std::thread;

use futures::StreamExt;
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{EngineError, Result};
use crate::proofs::proof::Proof;
use crate::proofs::prover::ProofStream;

thread_local! {
    static INSIDE_SCHEDULER_TASK: Cell<bool> = const { Cell::new(false) };
}

/// True when called from code already running as a task on a `Scheduler`'s
/// background thread. `KnowledgeBase::prove` uses this to refuse a
/// re-entrant call instead of deadlocking the scheduler thread against
/// itself.
pub fn is_inside_scheduler_task() -> bool {
    INSIDE_SCHEDULER_TASK.with(Cell::get)
}

struct StreamJob {
    stream: ProofStream,
    sender: mpsc::Sender<Arc<Proof>>,
}

/// Fans `streams` into a single stream. Each input stream is driven by its
/// own spawned task; the combined stream ends once every input has ended.
///
/// The fan-out is deferred until the returned stream is first polled (rather
/// than spawning eagerly here), so it's safe to build this stream on one
/// thread and only ever drive it on another — exactly what happens when
/// `KnowledgeBase::prove` constructs a stream on the caller's thread and
/// hands it to the scheduler to actually run.
pub fn multiplex(streams: Vec<ProofStream>, buffer_size: usize) -> ProofStream {
    Box::pin(async_stream::stream! {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        for mut stream in streams {
            let tx = tx.clone();
            tokio::spawn(async move {
                while let Some(item) = stream.next().await {
                    if tx.send(item).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);
        let mut rx = ReceiverStream::new(rx);
        while let Some(item) = rx.next().await {
            yield item;
        }
    })
}

/// Dedicated background thread hosting a private, single-threaded `tokio`
/// runtime. `KnowledgeBase::prove` (the synchronous entry point) submits an
/// async proof stream here and gets back a blocking iterator; everything the
/// stream touches — provers, listeners, storage — runs as tasks on this one
/// thread, which is what makes the re-entrancy check in
/// [`is_inside_scheduler_task`] reliable: a single-threaded runtime never
/// migrates a task to another OS thread mid-flight.
pub struct Scheduler {
    job_tx: mpsc::UnboundedSender<StreamJob>,
}

impl Scheduler {
    pub fn spawn() -> Self {
        let (job_tx, mut job_rx) = mpsc::unbounded_channel::<StreamJob>();
        thread::Builder::new()
            .name("inferentia-scheduler".into())
            .spawn(move || {
                let runtime = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("failed to build scheduler runtime");
                runtime.block_on(async move {
                    while let Some(StreamJob { mut stream, sender }) = job_rx.recv().await {
                        tokio::spawn(async move {
                            INSIDE_SCHEDULER_TASK.with(|flag| flag.set(true));
                            while let Some(item) = stream.next().await {
                                if sender.send(item).await.is_err() {
                                    break;
                                }
                            }
                        });
                    }
                });
            })
            .expect("failed to spawn scheduler thread");
        Self { job_tx }
    }

    /// Bridges `stream` into a blocking iterator driven on the scheduler's
    /// background thread. Returns [`EngineError::ReentrantProve`] if called
    /// from a task already running on that thread — use
    /// `KnowledgeBase::async_prove` there instead.
    pub fn run_to_iterator(&self, stream: ProofStream, buffer_size: usize) -> Result<impl Iterator<Item = Arc<Proof>>> {
        if is_inside_scheduler_task() {
            return Err(EngineError::ReentrantProve);
        }
        let (tx, mut rx) = mpsc::channel(buffer_size.max(1));
        self.job_tx
            .send(StreamJob { stream, sender: tx })
            .map_err(|_| EngineError::ReentrantProve)?;
        Ok(std::iter::from_fn(move || rx.blocking_recv()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;
    use crate::logic::Substitution;
    use crate::proofs::proof::InferenceRule;

    fn proof_stream_of(terms: Vec<crate::logic::Term>) -> ProofStream {
        Box::pin(futures::stream::iter(
            terms
                .into_iter()
                .map(|t| Proof::new(InferenceRule::Given, t, Substitution::empty(), Vec::new())),
        ))
    }

    #[test]
    fn run_to_iterator_yields_every_item() {
        let lang = Language::new();
        let scheduler = Scheduler::spawn();
        let stream = proof_stream_of(vec![lang.constant("a"), lang.constant("b")]);
        let items: Vec<_> = scheduler.run_to_iterator(stream, 1).unwrap().collect();
        assert_eq!(items.len(), 2);
    }
}
