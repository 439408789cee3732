use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe shared mutable cell.
///
/// Poisoning is ignored: every critical section in this crate leaves the
/// guarded state consistent before it can unwind into user code.
#[derive(Default)]
pub struct MutArc<T>(Arc<Mutex<T>>);

impl<T> MutArc<T> {
  pub fn own(t: T) -> Self { Self(Arc::new(Mutex::new(t))) }

  /// Returns `true` if both handles point at the same cell.
  pub fn ptr_eq(&self, other: &Self) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  #[inline]
  pub fn lock(&self) -> MutexGuard<'_, T> { lock(&self.0) }
}

impl<T> Clone for MutArc<T> {
  #[inline]
  fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> From<T> for MutArc<T> {
  fn from(t: T) -> Self { Self::own(t) }
}

#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_the_cell() {
    let a = MutArc::own(1);
    let b = a.clone();
    *b.lock() += 1;
    assert_eq!(*a.lock(), 2);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&MutArc::own(2)));
  }

  #[test]
  fn poisoned_cell_is_still_usable() {
    let cell = MutArc::own(vec![1]);
    let c_cell = cell.clone();
    let _ = std::thread::spawn(move || {
      let _guard = c_cell.lock();
      panic!("poison the lock");
    })
    .join();
    cell.lock().push(2);
    assert_eq!(*cell.lock(), vec![1, 2]);
  }
}
