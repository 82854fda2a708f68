//! Bounded dispatch shared by both phases.
//!
//! A permit is taken from the phase semaphore before a probe task is spawned and
//! is released when the task ends, so the number of probes in flight never
//! exceeds the cap. Results travel back through the [`JoinSet`].

use std::future::Future;
use std::sync::Arc;

use rigscan_common::error::ProbeError;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// How a phase ended.
#[derive(Debug)]
pub(crate) enum PhaseEnd {
    Finished,
    /// Dispatch stopped because the token was cancelled.
    Cancelled,
    /// Dispatch stopped on the first fatal probe error.
    Aborted(ProbeError),
}

#[derive(Debug)]
pub(crate) struct PhaseOutcome<T> {
    /// Results of every probe that ran, in completion order.
    pub collected: Vec<T>,
    pub end: PhaseEnd,
}

struct Collector<T, P> {
    collected: Vec<T>,
    failure: Option<ProbeError>,
    completed: usize,
    on_progress: P,
}

impl<T, P: FnMut(usize)> Collector<T, P> {
    fn accept(&mut self, joined: Result<Result<T, ProbeError>, JoinError>) {
        self.completed += 1;
        match joined {
            Ok(Ok(value)) => self.collected.push(value),
            Ok(Err(e)) => match self.failure {
                None => self.failure = Some(e),
                Some(_) => debug!(error = %e, "Fatal probe error after abort"),
            },
            Err(e) => error!("Probe task did not finish: {e}"),
        }
        (self.on_progress)(self.completed);
    }

    fn reap(&mut self, tasks: &mut JoinSet<Result<T, ProbeError>>)
    where
        T: 'static,
    {
        while let Some(joined) = tasks.try_join_next() {
            self.accept(joined);
        }
    }
}

/// Runs `probe` for every job with at most `limit` probes in flight.
///
/// `probe` must fold per-target failures into a value; any `Err` it yields is
/// treated as fatal and stops further dispatch. In-flight probes always finish
/// and their results are kept. `on_progress` receives the number of finished
/// probes after each one.
pub(crate) async fn run_bounded<J, T, F, Fut>(
    jobs: Vec<J>,
    limit: usize,
    cancel: &CancellationToken,
    on_progress: impl FnMut(usize),
    mut probe: F,
) -> PhaseOutcome<T>
where
    F: FnMut(J) -> Fut,
    Fut: Future<Output = Result<T, ProbeError>> + Send + 'static,
    T: Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.clamp(1, Semaphore::MAX_PERMITS)));
    let mut tasks: JoinSet<Result<T, ProbeError>> = JoinSet::new();
    let mut collector = Collector {
        collected: Vec::with_capacity(jobs.len()),
        failure: None,
        completed: 0,
        on_progress,
    };
    let mut cancelled = false;

    for job in jobs {
        collector.reap(&mut tasks);
        if collector.failure.is_some() {
            break;
        }

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                cancelled = true;
                break;
            }
            permit = Arc::clone(&semaphore).acquire_owned() => permit,
        };
        // the semaphore is never closed
        let Ok(permit) = permit else { break };

        // a probe may have failed while we were waiting
        collector.reap(&mut tasks);
        if collector.failure.is_some() {
            break;
        }

        let fut = probe(job);
        tasks.spawn(async move {
            let _permit = permit;
            fut.await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        collector.accept(joined);
    }

    let end = match collector.failure {
        Some(e) => PhaseEnd::Aborted(e),
        None if cancelled => PhaseEnd::Cancelled,
        None => PhaseEnd::Finished,
    };

    PhaseOutcome {
        collected: collector.collected,
        end,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
