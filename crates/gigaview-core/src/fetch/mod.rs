//! Asynchronous, cancellable pixel fetches.
//!
//! A single named worker thread serves [`FetchJob`]s in submission order and
//! returns [`FetchCompletion`]s on a second channel. Only the most recent
//! request per image is live: submitting again cancels the older token, the
//! worker drops jobs whose token is already cancelled, and
//! [`FetchScheduler::accept`] rejects completions that are no longer current.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::debug;

use crate::consts::FETCH_THREAD_NAME;
use crate::error::Result;
use crate::source::{PixelBuffer, RasterDataset};
use crate::viewport::{ImageId, ImagePlacement, ViewState};

/// Shared flag polled by datasets while they read.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Monotonic request identifier, unique within one scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

/// What to read and where the result will be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub placement: ImagePlacement,
    /// View the placement was computed for.
    pub view: ViewState,
}

/// A request bound to its dataset and token, as queued to the worker.
pub struct FetchJob {
    pub id: RequestId,
    pub request: FetchRequest,
    pub dataset: Arc<dyn RasterDataset>,
    pub cancel: CancellationToken,
}

/// Result of one fetch, successful or not.
pub struct FetchCompletion {
    pub id: RequestId,
    pub request: FetchRequest,
    pub outcome: Result<PixelBuffer>,
}

impl FetchCompletion {
    pub fn image(&self) -> ImageId {
        self.request.placement.image
    }
}

enum FetchCommand {
    Fetch(FetchJob),
    Shutdown,
}

struct Pending {
    id: RequestId,
    cancel: CancellationToken,
}

/// Owner of the fetch worker thread and the per-image latest-request table.
pub struct FetchScheduler {
    commands: mpsc::Sender<FetchCommand>,
    completions: mpsc::Receiver<FetchCompletion>,
    latest: HashMap<ImageId, Pending>,
    next_id: u64,
    worker: Option<JoinHandle<()>>,
}

impl FetchScheduler {
    /// Start the worker thread.
    pub fn spawn() -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<FetchCommand>();
        let (done_tx, done_rx) = mpsc::channel::<FetchCompletion>();
        let worker = std::thread::Builder::new()
            .name(FETCH_THREAD_NAME.into())
            .spawn(move || worker_loop(cmd_rx, done_tx))?;
        Ok(Self {
            commands: cmd_tx,
            completions: done_rx,
            latest: HashMap::new(),
            next_id: 0,
            worker: Some(worker),
        })
    }

    /// Queue a fetch, superseding any outstanding request for the same image.
    pub fn submit(&mut self, dataset: Arc<dyn RasterDataset>, request: FetchRequest) -> RequestId {
        let image = request.placement.image;
        self.next_id += 1;
        let id = RequestId(self.next_id);
        let cancel = CancellationToken::new();
        if let Some(previous) = self.latest.insert(
            image,
            Pending {
                id,
                cancel: cancel.clone(),
            },
        ) {
            previous.cancel.cancel();
            debug!(image = %image, superseded = previous.id.0, "Cancelled stale fetch");
        }
        debug!(
            image = %image,
            request = id.0,
            level = request.placement.window.level_index,
            rect = %request.placement.window.rect,
            "Fetch submitted"
        );
        let job = FetchJob {
            id,
            request,
            dataset,
            cancel,
        };
        if self.commands.send(FetchCommand::Fetch(job)).is_err() {
            // Worker is gone; nothing will ever complete this request.
            self.latest.remove(&image);
        }
        id
    }

    /// Cancel the outstanding request for `image`, if any.
    pub fn cancel(&mut self, image: ImageId) {
        if let Some(pending) = self.latest.remove(&image) {
            pending.cancel.cancel();
        }
    }

    pub fn is_current(&self, image: ImageId, id: RequestId) -> bool {
        self.latest.get(&image).is_some_and(|p| p.id == id)
    }

    /// Number of images still waiting for their latest request.
    pub fn pending(&self) -> usize {
        self.latest.len()
    }

    /// Mark `completion` as consumed if it is the latest for its image.
    /// Returns `false` for stale completions, which must be discarded.
    pub fn accept(&mut self, completion: &FetchCompletion) -> bool {
        let image = completion.image();
        if self.is_current(image, completion.id) {
            self.latest.remove(&image);
            true
        } else {
            debug!(image = %image, request = completion.id.0, "Discarded stale fetch");
            false
        }
    }

    /// Next completion, without blocking.
    pub fn try_recv(&self) -> Option<FetchCompletion> {
        self.completions.try_recv().ok()
    }

    /// Next completion, blocking. `None` once the worker has exited.
    pub fn recv(&self) -> Option<FetchCompletion> {
        self.completions.recv().ok()
    }

    /// Forget every outstanding request after the worker disappeared.
    pub(crate) fn abandon_pending(&mut self) {
        for (_, pending) in self.latest.drain() {
            pending.cancel.cancel();
        }
    }
}

impl Drop for FetchScheduler {
    fn drop(&mut self) {
        for pending in self.latest.values() {
            pending.cancel.cancel();
        }
        let _ = self.commands.send(FetchCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn worker_loop(rx: mpsc::Receiver<FetchCommand>, tx: mpsc::Sender<FetchCompletion>) {
    while let Ok(cmd) = rx.recv() {
        let job = match cmd {
            FetchCommand::Fetch(job) => job,
            FetchCommand::Shutdown => break,
        };
        if job.cancel.is_cancelled() {
            continue;
        }
        let p = &job.request.placement;
        let outcome = job.dataset.fetch_pixels(
            p.window.level_index,
            p.window.rect,
            p.target_width,
            p.target_height,
            &job.cancel,
        );
        if job.cancel.is_cancelled() {
            continue;
        }
        let _ = tx.send(FetchCompletion {
            id: job.id,
            request: job.request,
            outcome,
        });
    }
}
