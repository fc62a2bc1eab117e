//! Lazily evaluated, memoizing value holder.
//!
//! The first successful read stores the produced value; every later read on the
//! same holder returns it. A failed read stores nothing, so the next read
//! evaluates the thunk again.

use std::fmt;
use std::sync::OnceLock;

pub struct Memoized<T, E, F>
where
    F: Fn() -> Result<T, E>,
{
    value: OnceLock<T>,
    thunk: F,
}

impl<T, E, F> Memoized<T, E, F>
where
    F: Fn() -> Result<T, E>,
{
    pub fn new(thunk: F) -> Self {
        Self { value: OnceLock::new(), thunk }
    }

    /// Return the cached value, evaluating the thunk if no value is cached yet.
    ///
    /// Two threads racing on an empty holder may both evaluate the thunk; only
    /// the first stored value is ever returned.
    pub fn get(&self) -> Result<&T, E> {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }
        let produced = (self.thunk)()?;
        Ok(self.value.get_or_init(|| produced))
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T, E, F> fmt::Debug for Memoized<T, E, F>
where
    T: fmt::Debug,
    F: Fn() -> Result<T, E>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized").field("value", &self.value.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_evaluates_once() {
        let calls = Cell::new(0);
        let memo = Memoized::new(|| -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Ok(42)
        });

        assert!(!memo.is_evaluated());
        assert_eq!(*memo.get().unwrap(), 42);
        assert_eq!(*memo.get().unwrap(), 42);
        assert_eq!(calls.get(), 1);
        assert!(memo.is_evaluated());
    }

    #[test]
    fn test_failure_is_not_cached() {
        let calls = Cell::new(0);
        let memo = Memoized::new(|| -> Result<u32, String> {
            calls.set(calls.get() + 1);
            if calls.get() == 1 {
                Err("first attempt fails".to_string())
            } else {
                Ok(7)
            }
        });

        assert!(memo.get().is_err());
        assert!(!memo.is_evaluated());
        assert_eq!(*memo.get().unwrap(), 7);
        assert_eq!(*memo.get().unwrap(), 7);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_never_read_never_evaluated() {
        let calls = Cell::new(0);
        let _memo = Memoized::new(|| -> Result<u32, String> {
            calls.set(calls.get() + 1);
            Ok(1)
        });
        assert_eq!(calls.get(), 0);
    }
}
