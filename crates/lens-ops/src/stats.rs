//! Region cache statistics and the observer hook.
//!
//! [`CacheStats`] counters are always maintained by the cache; they are a
//! handful of integer increments per lookup. Finer-grained instrumentation
//! (per-slot hit histograms, fault traces) plugs in through
//! [`CacheObserver`], which the cache calls on every hit and fault.
//!
//! ```rust,ignore
//! let mut cache = RegionCache::new(source, CacheConfig::default())?
//!     .with_observer(SlotHistogram::default());
//! // ... render ...
//! println!("{}", cache.stats());
//! println!("{:?}", cache.observer().hits());
//! ```

use std::fmt;

use lens_core::PixelRect;

/// How a faulted region was refilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    /// Region entirely inside the image: one fetch straight into the buffer.
    Full,
    /// Region straddles an image edge: zero-filled, overlap fetched.
    Partial,
    /// Region entirely outside the image: zero-filled, nothing fetched.
    Empty,
}

/// Counters describing cache behaviour over a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Neighbourhood lookups served.
    pub lookups: u64,
    /// Lookups answered by the most recently used region.
    pub hits_fast: u64,
    /// Lookups answered by another resident region (promoted to front).
    pub hits_warm: u64,
    /// Lookups that evicted and refilled a region.
    pub faults: u64,
    /// Faults whose region straddled an image edge.
    pub edge_fills: u64,
    /// Faults whose region lay entirely outside the image.
    pub empty_fills: u64,
    /// Bytes copied out of the source provider.
    pub bytes_fetched: u64,
}

impl CacheStats {
    /// Total hits (fast + warm).
    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits_fast + self.hits_warm
    }

    /// Hit rate as percentage.
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            (self.hits() as f64 / self.lookups as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} lookups, {} fast hits, {} warm hits, {} faults ({} edge, {} empty), {} bytes fetched, {:.2}% hit rate",
            self.lookups,
            self.hits_fast,
            self.hits_warm,
            self.faults,
            self.edge_fills,
            self.empty_fills,
            self.bytes_fetched,
            self.hit_rate()
        )
    }
}

/// Hook called by the region cache on every lookup outcome.
///
/// All methods default to no-ops.
pub trait CacheObserver {
    /// A lookup was served by the region at MRU position `slot` (0 = front).
    fn on_hit(&mut self, slot: usize) {
        let _ = slot;
    }

    /// A lookup faulted; the LRU region now covers `buffer` (absolute coordinates).
    fn on_fault(&mut self, buffer: PixelRect, kind: FillKind) {
        let _ = (buffer, kind);
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoObserver;

impl CacheObserver for NoObserver {}

/// Observer counting hits per MRU slot.
///
/// A healthy scan shows almost all hits at slot 0; a long tail means the
/// working set is close to the number of regions.
#[derive(Debug, Clone, Default)]
pub struct SlotHistogram {
    hits: Vec<u64>,
    faults: u64,
}

impl SlotHistogram {
    /// Hits per slot, index 0 = most recently used.
    pub fn hits(&self) -> &[u64] {
        &self.hits
    }

    /// Number of faults observed.
    pub fn faults(&self) -> u64 {
        self.faults
    }
}

impl CacheObserver for SlotHistogram {
    fn on_hit(&mut self, slot: usize) {
        if self.hits.len() <= slot {
            self.hits.resize(slot + 1, 0);
        }
        self.hits[slot] += 1;
    }

    fn on_fault(&mut self, _buffer: PixelRect, _kind: FillKind) {
        self.faults += 1;
    }
}

impl<O: CacheObserver + ?Sized> CacheObserver for &mut O {
    fn on_hit(&mut self, slot: usize) {
        (**self).on_hit(slot)
    }

    fn on_fault(&mut self, buffer: PixelRect, kind: FillKind) {
        (**self).on_fault(buffer, kind)
    }
}

impl<O: CacheObserver + ?Sized> CacheObserver for Box<O> {
    fn on_hit(&mut self, slot: usize) {
        (**self).on_hit(slot)
    }

    fn on_fault(&mut self, buffer: PixelRect, kind: FillKind) {
        (**self).on_fault(buffer, kind)
    }
}
