//! Device buffers.
//!
//! Typed transfers go through `bytemuck` so any plain-old-data element type
//! can be moved to and from a buffer as raw bytes. All transfers are blocking.

use crate::driver::Driver;
use crate::error::{Result, StatusExt};
use crate::handle::{ContextId, MemId, QueueId};
use crate::types::MemFlags;
use bytemuck::Pod;

/// Allocates an uninitialised buffer of `size` bytes.
pub fn create_buffer(
    driver: &dyn Driver,
    context: ContextId,
    size: usize,
    flags: MemFlags,
) -> Result<MemId> {
    context.check()?;
    driver
        .create_buffer(context, flags, size, None)
        .or_runtime("clCreateBuffer")
}

/// Allocates a buffer sized for `data` and initialises it with a copy.
pub fn create_buffer_from<T: Pod>(
    driver: &dyn Driver,
    context: ContextId,
    data: &[T],
    flags: MemFlags,
) -> Result<MemId> {
    context.check()?;
    let bytes: &[u8] = bytemuck::cast_slice(data);
    driver
        .create_buffer(context, flags | MemFlags::COPY_HOST_PTR, bytes.len(), Some(bytes))
        .or_runtime("clCreateBuffer")
}

/// Copies `data` to the start of `buffer`, waiting for completion.
pub fn write_buffer<T: Pod>(
    driver: &dyn Driver,
    queue: QueueId,
    buffer: MemId,
    data: &[T],
) -> Result<()> {
    queue.check()?;
    buffer.check()?;
    driver
        .enqueue_write_buffer(queue, buffer, bytemuck::cast_slice(data))
        .or_runtime("clEnqueueWriteBuffer")
}

/// Fills `data` from the start of `buffer`, waiting for completion.
pub fn read_buffer<T: Pod>(
    driver: &dyn Driver,
    queue: QueueId,
    buffer: MemId,
    data: &mut [T],
) -> Result<()> {
    queue.check()?;
    buffer.check()?;
    driver
        .enqueue_read_buffer(queue, buffer, bytemuck::cast_slice_mut(data))
        .or_runtime("clEnqueueReadBuffer")
}

pub fn release_buffer(driver: &dyn Driver, buffer: MemId) -> Result<()> {
    buffer.check()?;
    driver.release_mem_object(buffer).or_runtime("clReleaseMemObject")
}
