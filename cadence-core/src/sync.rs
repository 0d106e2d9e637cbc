//! State shared between the tick handler and foreground code
//!
//! The tick handler preempts the foreground, so any update that spans more
//! than one memory write (a queue index plus its length, a task's countdown
//! plus its period) must happen with the tick masked. [`Shared`] does that
//! with a scoped critical section; the section is released on every exit
//! path, including unwinding in host tests.

use core::cell::RefCell;

use critical_section::Mutex;

/// Interior-mutable cell guarded by a critical section
///
/// Usable in a `static` since construction is `const`:
///
/// ```
/// use cadence_core::Shared;
///
/// static COUNTER: Shared<u32> = Shared::new(0);
///
/// COUNTER.with_mut(|c| *c += 1);
/// assert_eq!(COUNTER.with(|c| *c), 1);
/// ```
///
/// Closures must stay short; interrupts are masked for their whole duration.
/// Locking the same cell again from inside the closure panics. Use
/// [`try_with_mut`](Self::try_with_mut) where re-entry is possible, for
/// example from an event handler invoked by the engine being locked.
pub struct Shared<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> Shared<T> {
    /// Wrap `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Access the value immutably
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| f(&self.inner.borrow_ref(cs)))
    }

    /// Access the value mutably
    pub fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Access the value mutably unless it is already borrowed
    pub fn try_with_mut<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow(cs).try_borrow_mut().ok()?;
            Some(f(&mut guard))
        })
    }

    /// Consume the cell and return the value
    pub fn into_inner(self) -> T {
        self.inner.into_inner().into_inner()
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
