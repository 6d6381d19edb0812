use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// held from trigger to completion of one submission; re-entry is refused.
#[derive(Clone, Default, Debug)]
pub(crate) struct SubmissionLock {
    held: Arc<AtomicBool>,
}

impl SubmissionLock {
    pub(crate) fn try_acquire(&self) -> Option<SubmissionGuard> {
        self.held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SubmissionGuard {
                held: self.held.clone(),
            })
    }
}

/// released on drop, whichever way the submission ended.
#[derive(Debug)]
pub(crate) struct SubmissionGuard {
    held: Arc<AtomicBool>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.held.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::SubmissionLock;

    #[test]
    fn second_acquire_rejected_until_release() {
        let lock = SubmissionLock::default();
        let guard = lock.try_acquire().unwrap();
        assert!(lock.try_acquire().is_none());
        drop(guard);
        assert!(lock.try_acquire().is_some());
    }

    #[test]
    fn clones_share_state() {
        let lock = SubmissionLock::default();
        let other = lock.clone();
        let _guard = lock.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }
}
