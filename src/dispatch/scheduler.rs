//! Run-later task queues.

use crate::error::Result;
use crossbeam_channel::{bounded, unbounded, Sender};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle, ThreadId};
use tracing::{debug, error, warn};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks later, in submission order, without blocking the caller.
pub trait Scheduler: Send + Sync {
    /// Queue a task. Must never run it before returning.
    fn schedule(&self, task: Task);

    /// Block until every task scheduled so far has run.
    fn flush(&self);
}

/// Run one task, containing a panic so later tasks still run.
fn run_task(task: Task) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
        error!(panic = %panic_message(&*payload), "subscriber callback panicked");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

enum Job {
    Run(Task),
    Barrier(Sender<()>),
}

/// Scheduler backed by a single named worker thread.
///
/// Tasks travel over an unbounded FIFO channel, so `schedule` never blocks
/// and tasks run one at a time in submission order.
pub struct ThreadScheduler {
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl ThreadScheduler {
    /// Spawn the worker thread.
    pub fn new(thread_name: &str) -> Result<Self> {
        let (sender, receiver) = unbounded::<Job>();

        let worker = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || {
                for job in receiver.iter() {
                    match job {
                        Job::Run(task) => run_task(task),
                        Job::Barrier(done) => {
                            let _ = done.send(());
                        }
                    }
                }
            })?;

        debug!(thread = thread_name, "dispatch worker started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker_id: worker.thread().id(),
            worker: Mutex::new(Some(worker)),
        })
    }

    fn on_worker(&self) -> bool {
        thread::current().id() == self.worker_id
    }

    fn send(&self, job: Job) -> bool {
        match self.sender.lock().as_ref() {
            Some(sender) => sender.send(job).is_ok(),
            None => false,
        }
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, task: Task) {
        if !self.send(Job::Run(task)) {
            warn!("dispatch worker is gone, dropping task");
        }
    }

    fn flush(&self) {
        if self.on_worker() {
            warn!("flush called from a delivery, skipping");
            return;
        }

        let (done_tx, done_rx) = bounded(1);
        if self.send(Job::Barrier(done_tx)) {
            let _ = done_rx.recv();
        }
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.sender.lock().take();

        if let Some(worker) = self.worker.lock().take() {
            if !self.on_worker() && worker.join().is_err() {
                warn!("dispatch worker exited abnormally");
            }
        }
    }
}

/// Single-threaded deferred queue.
///
/// Nothing runs until the owner calls `run_pending` (or `flush`), which
/// drains the queue on the calling thread. Tasks scheduled while draining
/// run in the same drain, after everything queued before them.
pub struct DeferredScheduler {
    queue: Mutex<VecDeque<Task>>,
}

impl DeferredScheduler {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Run queued tasks until the queue is empty. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            // The lock is released before running so tasks can schedule more.
            let next = self.queue.lock().pop_front();
            match next {
                Some(task) => {
                    run_task(task);
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }
}

impl Default for DeferredScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for DeferredScheduler {
    fn schedule(&self, task: Task) {
        self.queue.lock().push_back(task);
    }

    fn flush(&self) {
        self.run_pending();
    }
}
