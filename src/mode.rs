use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared away/home flag.
///
/// An open door is only alert-worthy while away. The polling thread reads
/// the flag every tick; the HTTP mode endpoint is the single writer.
#[derive(Clone)]
pub struct AwayMode {
    flag: Arc<AtomicBool>,
}

impl AwayMode {
    pub fn new(away: bool) -> Self {
        AwayMode {
            flag: Arc::new(AtomicBool::new(away)),
        }
    }

    pub fn away(&self) {
        self.set(true)
    }

    pub fn home(&self) {
        self.set(false)
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn set(&self, away: bool) {
        self.flag.store(away, Ordering::SeqCst)
    }
}
