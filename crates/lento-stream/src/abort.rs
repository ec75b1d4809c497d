//! Cooperative cancellation for long synthesis loops.
//!
//! Draining a deeply buffered stretcher can emit many chunks from a single
//! call, so the stretcher polls an externally supplied signal between
//! synchronized steps and cuts the loop short when it fires.

use std::sync::atomic::{AtomicBool, Ordering};

/// Polled between synchronized steps to cut long loops short.
pub trait AbortSignal {
    /// Whether the caller wants the current loop abandoned.
    fn is_aborting(&self) -> bool;
}

/// A signal that never fires, for callers without a cancellation source.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverAbort;

impl AbortSignal for NeverAbort {
    fn is_aborting(&self) -> bool {
        false
    }
}

impl AbortSignal for AtomicBool {
    fn is_aborting(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: AbortSignal + ?Sized> AbortSignal for &T {
    fn is_aborting(&self) -> bool {
        (**self).is_aborting()
    }
}
