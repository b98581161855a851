//! Engine-level error taxonomy. Storage failures live in `inferentia-storage`
//! and are wrapped here rather than merged into this enum, so a caller can
//! tell "the proof search went wrong" apart from "the disk went wrong".

use thiserror::Error;

use inferentia_storage::StorageError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A listener was registered as [`crate::proofs::listener::Safety::Safe`]
    /// but its handler attempted something only a totally-unsafe listener is
    /// allowed to do (currently: raising a formula with free variables when
    /// the argument mode requires ground arguments).
    #[error("listener {listener} attempted an unsafe operation: {reason}")]
    UnsafeOperation { listener: String, reason: String },

    /// A handler's `ArgumentMode` required a shape the triggering proof did
    /// not have (e.g. `MapUnwrappedRequired` on a non-expression conclusion).
    #[error("handler for listener {listener} received a value incompatible with its argument mode: {reason}")]
    InvalidHandlerShape { listener: String, reason: String },

    /// A handler returned a value that doesn't fit any of the accepted
    /// `HandlerItem` shapes.
    #[error("handler for listener {listener} returned an unusable value: {reason}")]
    InvalidHandlerReturn { listener: String, reason: String },

    /// `prove` (the synchronous entry point) was called from inside a task
    /// already running on the scheduler's runtime; use `async_prove` instead.
    #[error("prove() was called re-entrantly from inside the scheduler; use async_prove() instead")]
    ReentrantProve,

    /// A handler panicked while running; the panic was caught at the task
    /// boundary so one misbehaving listener can't take down the scheduler.
    #[error("handler for listener {listener} panicked: {message}")]
    HandlerPanic { listener: String, message: String },

    /// `Ponder::Hypothetically` was requested; hypothetical reasoning over a
    /// scoped, rolled-back transaction is not implemented yet.
    #[error("hypothetical pondering is not implemented")]
    NotImplemented,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
