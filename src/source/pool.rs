//! Small pool of read-only connections shared by table workers

use crate::error::Result;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

type Opener<C> = Box<dyn Fn() -> Result<C> + Send + Sync>;

/// Hands out one connection per concurrent user, reusing idle ones.
///
/// At most `max_idle` connections are kept after being returned; the number of
/// live connections is bounded by the number of concurrent borrowers.
pub struct HandlePool<C> {
    open: Opener<C>,
    idle: Mutex<Vec<C>>,
    max_idle: usize,
}

impl<C: Send> HandlePool<C> {
    pub fn new(open: impl Fn() -> Result<C> + Send + Sync + 'static, max_idle: usize) -> Self {
        Self {
            open: Box::new(open),
            idle: Mutex::new(Vec::new()),
            max_idle: max_idle.max(1),
        }
    }

    pub fn checkout(&self) -> Result<PooledHandle<'_, C>> {
        let reused = self.lock_idle().pop();
        let handle = match reused {
            Some(handle) => handle,
            None => (self.open)()?,
        };
        Ok(PooledHandle {
            pool: self,
            handle: Some(handle),
        })
    }

    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn give_back(&self, handle: C) {
        let mut idle = self.lock_idle();
        if idle.len() < self.max_idle {
            idle.push(handle);
        }
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<C>> {
        // A panicking worker cannot leave the Vec half-updated
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A connection borrowed from a [`HandlePool`], returned on drop
pub struct PooledHandle<'a, C: Send> {
    pool: &'a HandlePool<C>,
    handle: Option<C>,
}

impl<C: Send> Deref for PooledHandle<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.handle.as_ref().expect("handle present until drop")
    }
}

impl<C: Send> DerefMut for PooledHandle<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.handle.as_mut().expect("handle present until drop")
    }
}

impl<C: Send> Drop for PooledHandle<'_, C> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.pool.give_back(handle);
        }
    }
}
