use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Lazily-built, process-lifetime value with a single-flight guard.
///
/// The first caller runs the initializer; concurrent callers await that same
/// run instead of starting their own. A failed run leaves the memo empty so
/// the next call tries again. [`Memo::clear`] drops the value (test/dev hook).
pub struct Memo<T> {
    cell: Mutex<Arc<OnceCell<Arc<T>>>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self {
            cell: Mutex::new(Arc::new(OnceCell::new())),
        }
    }
}

impl<T> Memo<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_try_init<E, F, Fut>(&self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let cell = self.current();
        let value = cell
            .get_or_try_init(move || async move { init().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(value))
    }

    /// Value if already built.
    pub fn get(&self) -> Option<Arc<T>> {
        self.current().get().cloned()
    }

    pub fn clear(&self) {
        let mut guard = match self.cell.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(OnceCell::new());
    }

    fn current(&self) -> Arc<OnceCell<Arc<T>>> {
        match self.cell.lock() {
            Ok(g) => Arc::clone(&g),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }
}
