//! Asynchronous aggregation strategies
//!
//! Validators never join futures themselves. They ask an [`AsyncRuntime`]
//! for two things only: an already-settled outcome, and an "all succeed or
//! report a failure" combinator. Swapping the strategy changes how
//! concurrent evaluations are driven, never which ones are started.
//!
//! | Strategy | Settles on | Pending evaluations after settling |
//! |---|---|---|
//! | [`Spawned`] (default) | first failure | keep running as detached tasks |
//! | [`DrainAll`] | last evaluation | none left |
//! | [`FailFast`] | first failure | dropped |

use std::fmt;

use futures::future::{self, BoxFuture};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use tokio::runtime::Handle;
use tracing::debug;

use crate::error::Outcome;

/// The asynchronous primitives validation is built from.
pub trait AsyncRuntime: Send + Sync + fmt::Debug {
    /// An outcome that is already known.
    fn settled(&self, outcome: Outcome) -> BoxFuture<'static, Outcome>;

    /// Succeeds when every evaluation succeeds, fails with one of the
    /// failures otherwise. An empty list succeeds.
    fn all(&self, evaluations: Vec<BoxFuture<'static, Outcome>>) -> BoxFuture<'static, Outcome>;
}

/// Drives every evaluation to completion and reports the first failure to
/// settle.
///
/// Nothing is cancelled: side effects of every started evaluation happen.
#[derive(Debug, Clone, Copy, Default)]
pub struct DrainAll;

impl AsyncRuntime for DrainAll {
    fn settled(&self, outcome: Outcome) -> BoxFuture<'static, Outcome> {
        future::ready(outcome).boxed()
    }

    fn all(&self, evaluations: Vec<BoxFuture<'static, Outcome>>) -> BoxFuture<'static, Outcome> {
        async move {
            let mut pending: FuturesUnordered<_> = evaluations.into_iter().collect();
            let mut first_failure = None;
            while let Some(outcome) = pending.next().await {
                if let Err(rejection) = outcome {
                    first_failure.get_or_insert(rejection);
                }
            }
            first_failure.map_or(Ok(()), Err)
        }
        .boxed()
    }
}

/// Settles on the first failure while the remaining evaluations keep running.
///
/// Every evaluation is spawned as a tokio task, so a slow or stuck rule
/// cannot hold back a failure that is already known. Tasks still pending when
/// the aggregate settles are detached, not aborted. A panic inside an
/// evaluation is resumed on the awaiting task.
///
/// Evaluations run on the handle given to [`Spawned::on`], or on the runtime
/// polling the aggregate. With neither available they are driven in place
/// like [`DrainAll`].
#[derive(Debug, Clone, Default)]
pub struct Spawned {
    handle: Option<Handle>,
}

impl Spawned {
    /// Spawns on the runtime that polls the aggregate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns on a specific runtime.
    #[must_use]
    pub fn on(handle: Handle) -> Self {
        Self { handle: Some(handle) }
    }
}

impl AsyncRuntime for Spawned {
    fn settled(&self, outcome: Outcome) -> BoxFuture<'static, Outcome> {
        future::ready(outcome).boxed()
    }

    fn all(&self, evaluations: Vec<BoxFuture<'static, Outcome>>) -> BoxFuture<'static, Outcome> {
        let handle = self.handle.clone();
        async move {
            let Some(handle) = handle.or_else(|| Handle::try_current().ok()) else {
                debug!("no tokio runtime available, draining evaluations in place");
                return DrainAll.all(evaluations).await;
            };

            let mut running: FuturesUnordered<_> =
                evaluations.into_iter().map(|evaluation| handle.spawn(evaluation)).collect();
            while let Some(joined) = running.next().await {
                match joined {
                    Ok(Ok(())) => {}
                    Ok(Err(rejection)) => return Err(rejection),
                    Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
                    Err(error) => debug!(%error, "evaluation task cancelled"),
                }
            }
            Ok(())
        }
        .boxed()
    }
}

/// Settles on the first failure and drops the evaluations still pending.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailFast;

impl AsyncRuntime for FailFast {
    fn settled(&self, outcome: Outcome) -> BoxFuture<'static, Outcome> {
        future::ready(outcome).boxed()
    }

    fn all(&self, evaluations: Vec<BoxFuture<'static, Outcome>>) -> BoxFuture<'static, Outcome> {
        future::try_join_all(evaluations).map(|joined| joined.map(drop)).boxed()
    }
}
