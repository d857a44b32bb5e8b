//! System OpenCL driver.
//!
//! Forwards each call to the installed ICD loader through `cl3`. Handles are
//! passed through untouched; the only conversion is between the crate's
//! handle newtypes and the raw `cl_*` pointer types.

use super::{Driver, DriverResult};
use crate::handle::{ContextId, DeviceId, KernelId, MemId, PlatformId, ProgramId, QueueId};
use crate::status::Status;
use crate::types::{DeviceParam, DeviceType, InfoValue, MemFlags, PlatformParam};
use cl3::info_type::InfoType;
use cl3::types::{cl_device_id, cl_int, CL_BLOCKING};
use log::trace;
use std::ffi::{c_void, CString};
use std::ptr;

fn status(code: cl_int) -> Status {
    Status(code)
}

/// Decodes a `char[]` info value up to its NUL terminator.
fn text(info: InfoType) -> DriverResult<String> {
    match info {
        InfoType::VecUchar(bytes) => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
        }
        _ => Err(Status::INVALID_VALUE),
    }
}

/// Maps a raw device info value onto the shape `param` is documented to have.
fn device_value(param: DeviceParam, info: InfoType) -> DriverResult<InfoValue> {
    match (param, info) {
        (
            DeviceParam::Type | DeviceParam::GlobalMemSize | DeviceParam::LocalMemSize,
            InfoType::Ulong(value),
        ) => Ok(InfoValue::Ulong(value)),
        (DeviceParam::MaxComputeUnits | DeviceParam::MaxClockFrequency, InfoType::Uint(value)) => {
            Ok(InfoValue::Uint(value))
        }
        (DeviceParam::MaxWorkGroupSize, InfoType::Size(value)) => Ok(InfoValue::Size(value)),
        (
            DeviceParam::Vendor | DeviceParam::Name | DeviceParam::Version | DeviceParam::DriverVersion,
            info @ InfoType::VecUchar(_),
        ) => text(info).map(InfoValue::Text),
        _ => Err(Status::INVALID_VALUE),
    }
}

fn raw_devices(devices: &[DeviceId]) -> Vec<cl_device_id> {
    devices.iter().map(|d| d.as_raw().cast()).collect()
}

/// Driver backed by the system OpenCL runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenClDriver;

impl OpenClDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for OpenClDriver {
    fn name(&self) -> &str {
        "opencl"
    }

    fn platform_ids(&self) -> DriverResult<Vec<PlatformId>> {
        trace!("clGetPlatformIDs");
        let ids = cl3::platform::get_platform_ids().map_err(status)?;
        Ok(ids.into_iter().map(|id| PlatformId::from_raw(id.cast())).collect())
    }

    fn device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
    ) -> DriverResult<Vec<DeviceId>> {
        trace!("clGetDeviceIDs({platform:?}, {device_type})");
        let ids = cl3::device::get_device_ids(platform.as_raw().cast(), device_type.bits())
            .map_err(status)?;
        Ok(ids.into_iter().map(|id| DeviceId::from_raw(id.cast())).collect())
    }

    fn platform_info(&self, platform: PlatformId, param: PlatformParam) -> DriverResult<String> {
        trace!("clGetPlatformInfo({platform:?}, {param:?})");
        let info =
            cl3::platform::get_platform_info(platform.as_raw().cast(), param.raw()).map_err(status)?;
        text(info)
    }

    fn device_info(&self, device: DeviceId, param: DeviceParam) -> DriverResult<InfoValue> {
        trace!("clGetDeviceInfo({device:?}, {param:?})");
        let info =
            cl3::device::get_device_info(device.as_raw().cast(), param.raw()).map_err(status)?;
        device_value(param, info)
    }

    fn create_context(&self, devices: &[DeviceId]) -> DriverResult<ContextId> {
        trace!("clCreateContext({} device(s))", devices.len());
        let ids = raw_devices(devices);
        let context = cl3::context::create_context(&ids, ptr::null(), None, ptr::null_mut())
            .map_err(status)?;
        Ok(ContextId::from_raw(context.cast()))
    }

    fn create_command_queue(&self, context: ContextId, device: DeviceId) -> DriverResult<QueueId> {
        trace!("clCreateCommandQueueWithProperties({context:?}, {device:?})");
        let queue = unsafe {
            cl3::command_queue::create_command_queue_with_properties(
                context.as_raw().cast(),
                device.as_raw().cast(),
                ptr::null(),
            )
        }
        .map_err(status)?;
        Ok(QueueId::from_raw(queue.cast()))
    }

    fn release_context(&self, context: ContextId) -> DriverResult<()> {
        trace!("clReleaseContext({context:?})");
        unsafe { cl3::context::release_context(context.as_raw().cast()) }.map_err(status)
    }

    fn release_command_queue(&self, queue: QueueId) -> DriverResult<()> {
        trace!("clReleaseCommandQueue({queue:?})");
        unsafe { cl3::command_queue::release_command_queue(queue.as_raw().cast()) }
            .map_err(status)
    }

    fn create_buffer(
        &self,
        context: ContextId,
        flags: MemFlags,
        size: usize,
        host_data: Option<&[u8]>,
    ) -> DriverResult<MemId> {
        trace!("clCreateBuffer({context:?}, {:#x}, {size})", flags.bits());
        // COPY_HOST_PTR only reads through the pointer.
        let host_ptr = host_data.map_or(ptr::null_mut(), |data| data.as_ptr() as *mut c_void);
        let buffer = unsafe {
            cl3::memory::create_buffer(context.as_raw().cast(), flags.bits(), size, host_ptr)
        }
        .map_err(status)?;
        Ok(MemId::from_raw(buffer.cast()))
    }

    fn enqueue_write_buffer(&self, queue: QueueId, buffer: MemId, data: &[u8]) -> DriverResult<()> {
        trace!("clEnqueueWriteBuffer({queue:?}, {buffer:?}, {} bytes)", data.len());
        let event = unsafe {
            cl3::command_queue::enqueue_write_buffer(
                queue.as_raw().cast(),
                buffer.as_raw().cast(),
                CL_BLOCKING,
                0,
                data.len(),
                data.as_ptr().cast(),
                0,
                ptr::null(),
            )
        }
        .map_err(status)?;
        unsafe { cl3::event::release_event(event) }.map_err(status)
    }

    fn enqueue_read_buffer(
        &self,
        queue: QueueId,
        buffer: MemId,
        data: &mut [u8],
    ) -> DriverResult<()> {
        trace!("clEnqueueReadBuffer({queue:?}, {buffer:?}, {} bytes)", data.len());
        let event = unsafe {
            cl3::command_queue::enqueue_read_buffer(
                queue.as_raw().cast(),
                buffer.as_raw().cast(),
                CL_BLOCKING,
                0,
                data.len(),
                data.as_mut_ptr().cast(),
                0,
                ptr::null(),
            )
        }
        .map_err(status)?;
        unsafe { cl3::event::release_event(event) }.map_err(status)
    }

    fn release_mem_object(&self, buffer: MemId) -> DriverResult<()> {
        trace!("clReleaseMemObject({buffer:?})");
        unsafe { cl3::memory::release_mem_object(buffer.as_raw().cast()) }.map_err(status)
    }

    fn create_program_with_source(
        &self,
        context: ContextId,
        source: &str,
    ) -> DriverResult<ProgramId> {
        trace!("clCreateProgramWithSource({context:?}, {} bytes)", source.len());
        let program = cl3::program::create_program_with_source(context.as_raw().cast(), &[source])
            .map_err(status)?;
        Ok(ProgramId::from_raw(program.cast()))
    }

    fn build_program(
        &self,
        program: ProgramId,
        devices: &[DeviceId],
        options: &str,
    ) -> DriverResult<()> {
        trace!("clBuildProgram({program:?}, {} device(s), {options:?})", devices.len());
        let options = CString::new(options).map_err(|_| Status::INVALID_BUILD_OPTIONS)?;
        let ids = raw_devices(devices);
        cl3::program::build_program(program.as_raw().cast(), &ids, &options, None, ptr::null_mut())
            .map_err(status)
    }

    fn program_build_log(&self, program: ProgramId, device: DeviceId) -> DriverResult<String> {
        trace!("clGetProgramBuildInfo({program:?}, {device:?})");
        let info = cl3::program::get_program_build_info(
            program.as_raw().cast(),
            device.as_raw().cast(),
            cl3::program::CL_PROGRAM_BUILD_LOG,
        )
        .map_err(status)?;
        text(info)
    }

    fn create_kernel(&self, program: ProgramId, name: &str) -> DriverResult<KernelId> {
        trace!("clCreateKernel({program:?}, {name:?})");
        let name = CString::new(name).map_err(|_| Status::INVALID_VALUE)?;
        let kernel =
            cl3::kernel::create_kernel(program.as_raw().cast(), &name).map_err(status)?;
        Ok(KernelId::from_raw(kernel.cast()))
    }

    fn release_program(&self, program: ProgramId) -> DriverResult<()> {
        trace!("clReleaseProgram({program:?})");
        unsafe { cl3::program::release_program(program.as_raw().cast()) }.map_err(status)
    }

    fn release_kernel(&self, kernel: KernelId) -> DriverResult<()> {
        trace!("clReleaseKernel({kernel:?})");
        unsafe { cl3::kernel::release_kernel(kernel.as_raw().cast()) }.map_err(status)
    }
}
