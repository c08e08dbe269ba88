//! Handle-addressed buffer registry.
//!
//! Hosts that cannot hold Rust values directly address buffers through
//! [`BufferHandle`] tokens. The registry owns every buffer; a handle is an
//! index plus a generation, so a released or reused slot never resolves
//! through a stale handle. Pure queries on an invalid handle return `0` or
//! `None`; operations return [`MatchError::InvalidHandle`].

use crate::image::{Mat, PixelFormat};
use crate::kernel::Method;
use crate::search::extremum::{min_max_loc, MinMaxLoc};
use crate::search::scan::match_template;
use crate::search::{find_matches, Match};
use crate::util::{MatchError, MatchResult};

/// Opaque token addressing a buffer inside a [`Registry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle {
    index: u32,
    generation: u32,
}

impl BufferHandle {
    /// A handle that never resolves.
    pub const NULL: BufferHandle = BufferHandle {
        index: u32::MAX,
        generation: 0,
    };

    /// Returns true for [`BufferHandle::NULL`].
    pub fn is_null(self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for BufferHandle {
    fn default() -> Self {
        Self::NULL
    }
}

struct Slot {
    generation: u32,
    mat: Option<Mat>,
}

/// Generational arena of owned buffers.
#[derive(Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live buffers.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns true when no buffer is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Creates a zero-initialized buffer.
    pub fn create(
        &mut self,
        rows: usize,
        cols: usize,
        format: PixelFormat,
    ) -> MatchResult<BufferHandle> {
        let mat = Mat::zeros(rows, cols, format)?;
        self.insert(mat)
    }

    /// Creates a buffer holding a copy of caller data with `stride` bytes per
    /// row (`0` for tightly packed). The caller may reuse `data` immediately.
    pub fn create_from_data(
        &mut self,
        rows: usize,
        cols: usize,
        format: PixelFormat,
        data: &[u8],
        stride: usize,
    ) -> MatchResult<BufferHandle> {
        let mat = Mat::from_data(rows, cols, format, data, stride)?;
        self.insert(mat)
    }

    /// Takes ownership of an existing buffer.
    pub fn insert(&mut self, mat: Mat) -> MatchResult<BufferHandle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.mat = Some(mat);
            self.live += 1;
            return Ok(BufferHandle {
                index,
                generation: slot.generation,
            });
        }

        let index = u32::try_from(self.slots.len())
            .ok()
            .filter(|&idx| idx != u32::MAX)
            .ok_or(MatchError::AllocationFailure {
                bytes: std::mem::size_of::<Slot>(),
            })?;
        self.slots.push(Slot {
            generation: 0,
            mat: Some(mat),
        });
        self.live += 1;
        Ok(BufferHandle {
            index,
            generation: 0,
        })
    }

    /// Releases a buffer. Null, stale and already released handles are
    /// ignored.
    pub fn release(&mut self, handle: BufferHandle) {
        let Some(slot) = self.slot_mut(handle) else {
            return;
        };
        slot.mat = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
    }

    /// Removes a buffer from the registry and returns it.
    pub fn take(&mut self, handle: BufferHandle) -> MatchResult<Mat> {
        let slot = self.slot_mut(handle).ok_or(MatchError::InvalidHandle)?;
        let mat = slot.mat.take().ok_or(MatchError::InvalidHandle)?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Ok(mat)
    }

    /// Resolves a handle.
    pub fn get(&self, handle: BufferHandle) -> MatchResult<&Mat> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.mat.as_ref())
            .ok_or(MatchError::InvalidHandle)
    }

    /// Resolves a handle for mutation.
    pub fn get_mut(&mut self, handle: BufferHandle) -> MatchResult<&mut Mat> {
        self.slot_mut(handle)
            .and_then(|slot| slot.mat.as_mut())
            .ok_or(MatchError::InvalidHandle)
    }

    /// Row count, or `0` for an invalid handle.
    pub fn rows(&self, handle: BufferHandle) -> usize {
        self.get(handle).map_or(0, Mat::rows)
    }

    /// Column count, or `0` for an invalid handle.
    pub fn cols(&self, handle: BufferHandle) -> usize {
        self.get(handle).map_or(0, Mat::cols)
    }

    /// Row stride in bytes, or `0` for an invalid handle.
    pub fn stride(&self, handle: BufferHandle) -> usize {
        self.get(handle).map_or(0, Mat::stride)
    }

    /// Raw bytes, or `None` for an invalid handle.
    pub fn data(&self, handle: BufferHandle) -> Option<&[u8]> {
        self.get(handle).ok().map(Mat::as_bytes)
    }

    /// Raw bytes for writing, or `None` for an invalid handle.
    pub fn data_mut(&mut self, handle: BufferHandle) -> Option<&mut [u8]> {
        self.get_mut(handle).ok().map(Mat::as_bytes_mut)
    }

    /// Scores `templ` against `scene` and registers the surface.
    pub fn match_template(
        &mut self,
        scene: BufferHandle,
        templ: BufferHandle,
        method: Method,
    ) -> MatchResult<BufferHandle> {
        let surface = match_template(self.get(scene)?, self.get(templ)?, method)?;
        self.insert(surface)
    }

    /// Scores `templ` against `scene` and stores the surface in `result`,
    /// replacing its previous contents. `result` is untouched on failure.
    pub fn match_template_into(
        &mut self,
        scene: BufferHandle,
        templ: BufferHandle,
        result: BufferHandle,
        method: Method,
    ) -> MatchResult<()> {
        self.get(result)?;
        let surface = match_template(self.get(scene)?, self.get(templ)?, method)?;
        *self.get_mut(result)? = surface;
        Ok(())
    }

    /// Global extrema of a single-channel buffer.
    pub fn min_max_loc(&self, handle: BufferHandle) -> MatchResult<MinMaxLoc> {
        min_max_loc(self.get(handle)?)
    }

    /// Fills a rectangle of a buffer with `value`.
    pub fn set_region(
        &mut self,
        handle: BufferHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        value: f64,
    ) -> MatchResult<()> {
        self.get_mut(handle)?
            .set_region(x as i64, y as i64, width as i64, height as i64, value)
    }

    /// Finds up to `max_matches` non-overlapping matches of `templ` in `scene`.
    pub fn find_matches(
        &self,
        scene: BufferHandle,
        templ: BufferHandle,
        method: Method,
        threshold: f64,
        max_matches: usize,
    ) -> MatchResult<Vec<Match>> {
        find_matches(
            self.get(scene)?,
            self.get(templ)?,
            method,
            threshold,
            max_matches,
        )
    }

    fn slot_mut(&mut self, handle: BufferHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.mat.is_some())
    }
}
