//! Poison-tolerant lock helpers.  A poisoned lock is logged and recovered;
//! no command in this crate leaves state half-written across a panic point.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::warn;

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|p| {
        warn!("recovering poisoned mutex");
        PoisonError::into_inner(p)
    })
}

pub(crate) fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(|p| {
        warn!("recovering poisoned rwlock (read)");
        PoisonError::into_inner(p)
    })
}

pub(crate) fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(|p| {
        warn!("recovering poisoned rwlock (write)");
        PoisonError::into_inner(p)
    })
}
