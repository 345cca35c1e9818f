use agenda_domain::{Entity, ID};
use std::sync::{Mutex, MutexGuard};

/// Useful functions for creating inmemory repositories

fn lock<T>(collection: &Mutex<Vec<T>>) -> anyhow::Result<MutexGuard<'_, Vec<T>>> {
    collection
        .lock()
        .map_err(|_| anyhow::anyhow!("Inmemory collection lock was poisoned"))
}

pub fn insert<T: Clone>(val: &T, collection: &Mutex<Vec<T>>) -> anyhow::Result<()> {
    lock(collection)?.push(val.clone());
    Ok(())
}

/// Replaces the stored item with the same id as `val`. Returns `None` if there was none.
pub fn save<T: Clone + Entity>(val: &T, collection: &Mutex<Vec<T>>) -> anyhow::Result<Option<T>> {
    let mut collection = lock(collection)?;
    Ok(collection
        .iter_mut()
        .find(|item| item.id() == val.id())
        .map(|existing| {
            *existing = val.clone();
            existing.clone()
        }))
}

pub fn find<T: Clone + Entity>(
    val_id: &ID,
    collection: &Mutex<Vec<T>>,
) -> anyhow::Result<Option<T>> {
    Ok(lock(collection)?
        .iter()
        .find(|item| item.id() == val_id)
        .cloned())
}

pub fn find_by<T: Clone, F: FnMut(&T) -> bool>(
    collection: &Mutex<Vec<T>>,
    mut compare: F,
) -> anyhow::Result<Vec<T>> {
    Ok(lock(collection)?
        .iter()
        .filter(|item| compare(item))
        .cloned()
        .collect())
}

pub fn delete<T: Clone + Entity>(
    val_id: &ID,
    collection: &Mutex<Vec<T>>,
) -> anyhow::Result<Option<T>> {
    let mut collection = lock(collection)?;
    Ok(collection
        .iter()
        .position(|item| item.id() == val_id)
        .map(|index| collection.remove(index)))
}
