//! Lock shim used by the wake-up primitives.
//!
//! Native builds use `parking_lot`; the `loom` feature swaps in loom's mutex
//! so model tests can explore every interleaving of `set`/`wait`.

#[cfg(not(feature = "loom"))]
pub(crate) use parking_lot::Mutex;

#[cfg(feature = "loom")]
pub(crate) use self::model::Mutex;

#[cfg(feature = "loom")]
mod model {
    use std::sync::PoisonError;

    use loom::sync::MutexGuard;

    pub(crate) struct Mutex<T>(loom::sync::Mutex<T>);

    impl<T> Mutex<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(loom::sync::Mutex::new(value))
        }

        pub(crate) fn lock(&self) -> MutexGuard<'_, T> {
            // A panicking model thread already fails the test; keep the state reachable.
            self.0.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }
}
