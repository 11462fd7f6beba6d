//! Bookkeeping of [`Buffer`](super::Buffer) allocations.
//!
//! Every allocation and release of buffer memory is recorded both for the current thread and for the whole process.
//! The per-thread numbers are exact for code that doesn't move buffers between threads, which makes them usable to
//! check that a container releases every block it acquired exactly once.
//!
//! Tracking can be compiled out by disabling the `memory_tracking` feature, in which case all stats stay zeroed.

use core::alloc::Layout;

/// Allocation statistics
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct AllocStats {
    /// Number of blocks allocated
    pub allocs:     usize,
    /// Number of blocks released
    pub deallocs:   usize,
    /// Bytes currently allocated
    pub live_bytes: usize,
    /// Highest value `live_bytes` has reached
    pub peak_bytes: usize,
}

impl AllocStats {
    pub const fn new() -> Self {
        Self { allocs: 0, deallocs: 0, live_bytes: 0, peak_bytes: 0 }
    }

    /// Number of blocks that are currently allocated.
    pub const fn live_allocs(&self) -> usize {
        self.allocs - self.deallocs
    }

    /// Get the allocations and releases that happened since `earlier` was captured.
    ///
    /// `live_bytes` and `peak_bytes` are taken from `self`, as they are not cumulative.
    pub const fn since(&self, earlier: &AllocStats) -> AllocStats {
        AllocStats {
            allocs: self.allocs - earlier.allocs,
            deallocs: self.deallocs - earlier.deallocs,
            live_bytes: self.live_bytes,
            peak_bytes: self.peak_bytes,
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "memory_tracking")] {
        use core::{
            cell::Cell,
            sync::atomic::{AtomicUsize, Ordering},
        };

        thread_local! {
            static THREAD_STATS: Cell<AllocStats> = const { Cell::new(AllocStats::new()) };
        }

        static GLOBAL_ALLOCS     : AtomicUsize = AtomicUsize::new(0);
        static GLOBAL_DEALLOCS   : AtomicUsize = AtomicUsize::new(0);
        static GLOBAL_LIVE_BYTES : AtomicUsize = AtomicUsize::new(0);
        static GLOBAL_PEAK_BYTES : AtomicUsize = AtomicUsize::new(0);

        pub(crate) fn track_alloc(layout: Layout) {
            GLOBAL_ALLOCS.fetch_add(1, Ordering::Relaxed);
            let live = GLOBAL_LIVE_BYTES.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
            GLOBAL_PEAK_BYTES.fetch_max(live, Ordering::Relaxed);

            // Buffers can be dropped while thread locals are being destroyed, so the thread local may already be gone
            _ = THREAD_STATS.try_with(|stats| {
                let mut cur = stats.get();
                cur.allocs += 1;
                cur.live_bytes += layout.size();
                cur.peak_bytes = cur.peak_bytes.max(cur.live_bytes);
                stats.set(cur);
            });
        }

        pub(crate) fn track_dealloc(layout: Layout) {
            GLOBAL_DEALLOCS.fetch_add(1, Ordering::Relaxed);
            GLOBAL_LIVE_BYTES.fetch_sub(layout.size(), Ordering::Relaxed);

            _ = THREAD_STATS.try_with(|stats| {
                let mut cur = stats.get();
                cur.deallocs += 1;
                // A buffer allocated on another thread may be released here
                cur.live_bytes = cur.live_bytes.saturating_sub(layout.size());
                stats.set(cur);
            });
        }

        /// Get the allocation statistics of the current thread.
        pub fn thread_alloc_stats() -> AllocStats {
            THREAD_STATS.try_with(Cell::get).unwrap_or_default()
        }

        /// Get the allocation statistics of the whole process.
        pub fn global_alloc_stats() -> AllocStats {
            AllocStats {
                allocs: GLOBAL_ALLOCS.load(Ordering::Relaxed),
                deallocs: GLOBAL_DEALLOCS.load(Ordering::Relaxed),
                live_bytes: GLOBAL_LIVE_BYTES.load(Ordering::Relaxed),
                peak_bytes: GLOBAL_PEAK_BYTES.load(Ordering::Relaxed),
            }
        }
    } else {
        #[inline(always)]
        pub(crate) fn track_alloc(_layout: Layout) {}

        #[inline(always)]
        pub(crate) fn track_dealloc(_layout: Layout) {}

        /// Get the allocation statistics of the current thread, always zeroed without the `memory_tracking` feature.
        pub fn thread_alloc_stats() -> AllocStats {
            AllocStats::new()
        }

        /// Get the allocation statistics of the whole process, always zeroed without the `memory_tracking` feature.
        pub fn global_alloc_stats() -> AllocStats {
            AllocStats::new()
        }
    }
}

#[cfg(all(test, feature = "memory_tracking"))]
mod tests {
    use super::*;

    #[test]
    fn thread_stats_follow_alloc_and_dealloc() {
        let before = thread_alloc_stats();
        let layout = Layout::array::<u64>(4).unwrap();

        track_alloc(layout);
        let mid = thread_alloc_stats().since(&before);
        assert_eq!(mid.allocs, 1);
        assert_eq!(mid.deallocs, 0);
        assert_eq!(mid.live_allocs(), 1);
        assert_eq!(mid.live_bytes, before.live_bytes + 32);
        assert!(mid.peak_bytes >= mid.live_bytes);

        track_dealloc(layout);
        let after = thread_alloc_stats().since(&before);
        assert_eq!(after.allocs, 1);
        assert_eq!(after.deallocs, 1);
        assert_eq!(after.live_allocs(), 0);
        assert_eq!(after.live_bytes, before.live_bytes);
    }

    #[test]
    fn stats_are_per_thread() {
        let before = thread_alloc_stats();
        std::thread::spawn(|| {
            let layout = Layout::new::<u32>();
            track_alloc(layout);
            track_dealloc(layout);
            assert_eq!(thread_alloc_stats().allocs, 1);
        }).join().unwrap();
        assert_eq!(thread_alloc_stats(), before);
        assert!(global_alloc_stats().allocs >= 1);
    }
}
