//! The native driver seam.
//!
//! [`Driver`] has one method per native entry point used by this crate. Each
//! method takes and returns raw handles and reports failure as the bare
//! [`Status`] the native call produced. Argument validation and translation
//! into [`ClError`](crate::error::ClError) happen one layer up, in the
//! `platform`, `context`, `buffer` and `program` modules, so every driver
//! implementation gets the same checks.
//!
//! # Implementations
//!
//! - [`OpenClDriver`](opencl::OpenClDriver): the system OpenCL ICD loader
//!   (requires the `opencl` feature)
//! - [`Unavailable`]: stands in when the crate is built without `opencl`
//! - [`MockDriver`](mock::MockDriver): an in-memory simulated driver for tests
//!   (requires `cfg(test)` or the `test-utils` feature)

#[cfg(feature = "opencl")]
pub mod opencl;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

use crate::handle::{ContextId, DeviceId, KernelId, MemId, PlatformId, ProgramId, QueueId};
use crate::status::Status;
use crate::types::{DeviceParam, DeviceType, InfoValue, MemFlags, PlatformParam};

/// Result of a single native call.
pub type DriverResult<T> = std::result::Result<T, Status>;

/// Native entry points used by the wrappers.
///
/// Implementations must not validate arguments beyond what the native call
/// itself does; they forward and report the status.
pub trait Driver {
    /// Short name of the implementation, for logging.
    fn name(&self) -> &str;

    /// `clGetPlatformIDs`
    fn platform_ids(&self) -> DriverResult<Vec<PlatformId>>;

    /// `clGetDeviceIDs`
    fn device_ids(&self, platform: PlatformId, device_type: DeviceType)
        -> DriverResult<Vec<DeviceId>>;

    /// `clGetPlatformInfo`; every platform parameter is a string.
    fn platform_info(&self, platform: PlatformId, param: PlatformParam) -> DriverResult<String>;

    /// `clGetDeviceInfo`
    fn device_info(&self, device: DeviceId, param: DeviceParam) -> DriverResult<InfoValue>;

    /// `clCreateContext`
    fn create_context(&self, devices: &[DeviceId]) -> DriverResult<ContextId>;

    /// `clCreateCommandQueueWithProperties` with no properties.
    fn create_command_queue(&self, context: ContextId, device: DeviceId) -> DriverResult<QueueId>;

    /// `clReleaseContext`
    fn release_context(&self, context: ContextId) -> DriverResult<()>;

    /// `clReleaseCommandQueue`
    fn release_command_queue(&self, queue: QueueId) -> DriverResult<()>;

    /// `clCreateBuffer`. When `host_data` is given, `flags` already carries
    /// `COPY_HOST_PTR` and `size` equals its length.
    fn create_buffer(
        &self,
        context: ContextId,
        flags: MemFlags,
        size: usize,
        host_data: Option<&[u8]>,
    ) -> DriverResult<MemId>;

    /// Blocking `clEnqueueWriteBuffer` at offset zero.
    fn enqueue_write_buffer(&self, queue: QueueId, buffer: MemId, data: &[u8]) -> DriverResult<()>;

    /// Blocking `clEnqueueReadBuffer` at offset zero.
    fn enqueue_read_buffer(
        &self,
        queue: QueueId,
        buffer: MemId,
        data: &mut [u8],
    ) -> DriverResult<()>;

    /// `clReleaseMemObject`
    fn release_mem_object(&self, buffer: MemId) -> DriverResult<()>;

    /// `clCreateProgramWithSource` with a single source string.
    fn create_program_with_source(&self, context: ContextId, source: &str)
        -> DriverResult<ProgramId>;

    /// `clBuildProgram`, synchronous.
    fn build_program(
        &self,
        program: ProgramId,
        devices: &[DeviceId],
        options: &str,
    ) -> DriverResult<()>;

    /// `clGetProgramBuildInfo` with `CL_PROGRAM_BUILD_LOG`.
    fn program_build_log(&self, program: ProgramId, device: DeviceId) -> DriverResult<String>;

    /// `clCreateKernel`
    fn create_kernel(&self, program: ProgramId, name: &str) -> DriverResult<KernelId>;

    /// `clReleaseProgram`
    fn release_program(&self, program: ProgramId) -> DriverResult<()>;

    /// `clReleaseKernel`
    fn release_kernel(&self, kernel: KernelId) -> DriverResult<()>;
}

/// Driver used when no native backend was compiled in.
///
/// Platform enumeration reports `CL_PLATFORM_NOT_FOUND_KHR`, which is what the
/// ICD loader returns on a host with no vendor drivers installed. Every other
/// call reports `CL_INVALID_OPERATION`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl Driver for Unavailable {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn platform_ids(&self) -> DriverResult<Vec<PlatformId>> {
        Err(Status::PLATFORM_NOT_FOUND_KHR)
    }

    fn device_ids(&self, _: PlatformId, _: DeviceType) -> DriverResult<Vec<DeviceId>> {
        Err(Status::INVALID_OPERATION)
    }

    fn platform_info(&self, _: PlatformId, _: PlatformParam) -> DriverResult<String> {
        Err(Status::INVALID_OPERATION)
    }

    fn device_info(&self, _: DeviceId, _: DeviceParam) -> DriverResult<InfoValue> {
        Err(Status::INVALID_OPERATION)
    }

    fn create_context(&self, _: &[DeviceId]) -> DriverResult<ContextId> {
        Err(Status::INVALID_OPERATION)
    }

    fn create_command_queue(&self, _: ContextId, _: DeviceId) -> DriverResult<QueueId> {
        Err(Status::INVALID_OPERATION)
    }

    fn release_context(&self, _: ContextId) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn release_command_queue(&self, _: QueueId) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn create_buffer(
        &self,
        _: ContextId,
        _: MemFlags,
        _: usize,
        _: Option<&[u8]>,
    ) -> DriverResult<MemId> {
        Err(Status::INVALID_OPERATION)
    }

    fn enqueue_write_buffer(&self, _: QueueId, _: MemId, _: &[u8]) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn enqueue_read_buffer(&self, _: QueueId, _: MemId, _: &mut [u8]) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn release_mem_object(&self, _: MemId) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn create_program_with_source(&self, _: ContextId, _: &str) -> DriverResult<ProgramId> {
        Err(Status::INVALID_OPERATION)
    }

    fn build_program(&self, _: ProgramId, _: &[DeviceId], _: &str) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn program_build_log(&self, _: ProgramId, _: DeviceId) -> DriverResult<String> {
        Err(Status::INVALID_OPERATION)
    }

    fn create_kernel(&self, _: ProgramId, _: &str) -> DriverResult<KernelId> {
        Err(Status::INVALID_OPERATION)
    }

    fn release_program(&self, _: ProgramId) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }

    fn release_kernel(&self, _: KernelId) -> DriverResult<()> {
        Err(Status::INVALID_OPERATION)
    }
}

/// Returns the native driver compiled into this build.
pub fn system() -> Box<dyn Driver> {
    #[cfg(feature = "opencl")]
    {
        Box::new(opencl::OpenClDriver::new())
    }
    #[cfg(not(feature = "opencl"))]
    {
        log::warn!("built without the `opencl` feature; no native driver is available");
        Box::new(Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_reports_no_platforms() {
        let driver = Unavailable;
        assert_eq!(driver.platform_ids(), Err(Status::PLATFORM_NOT_FOUND_KHR));
        assert_eq!(
            driver.device_ids(PlatformId::null(), DeviceType::ALL),
            Err(Status::INVALID_OPERATION)
        );
    }

    #[test]
    fn test_system_driver_has_a_name() {
        let driver = system();
        assert!(!driver.name().is_empty());
    }
}
