//! In-memory simulated driver.
//!
//! `MockDriver` behaves like a small OpenCL implementation: it owns a fixed
//! set of platforms and devices, keeps object tables for everything created
//! through it, and returns the same status codes a conforming driver would for
//! unknown handles. Failures can be injected per call name or per handle, and
//! every call is logged so tests can assert which native calls were reached.

use super::{Driver, DriverResult};
use crate::handle::{ContextId, DeviceId, KernelId, MemId, PlatformId, ProgramId, QueueId};
use crate::status::Status;
use crate::types::{DeviceParam, DeviceType, InfoValue, MemFlags, PlatformParam};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;

const HANDLE_STRIDE: usize = 0x100;
const OBJECT_BASE: usize = 0x10_0000;

/// A simulated device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub driver_version: String,
    pub device_type: DeviceType,
    pub compute_units: u32,
    pub max_clock_mhz: u32,
    pub max_work_group_size: usize,
    pub global_mem_bytes: u64,
    pub local_mem_bytes: u64,
}

impl MockDevice {
    pub fn new(name: &str, vendor: &str, device_type: DeviceType) -> Self {
        Self {
            name: name.to_string(),
            vendor: vendor.to_string(),
            version: "OpenCL 3.0".to_string(),
            driver_version: "1.0.0".to_string(),
            device_type,
            compute_units: 1,
            max_clock_mhz: 1000,
            max_work_group_size: 256,
            global_mem_bytes: 1024 * 1024 * 1024,
            local_mem_bytes: 64 * 1024,
        }
    }

    pub fn compute_units(mut self, units: u32) -> Self {
        self.compute_units = units;
        self
    }

    pub fn global_mem_bytes(mut self, bytes: u64) -> Self {
        self.global_mem_bytes = bytes;
        self
    }
}

/// A simulated platform.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    pub name: String,
    pub vendor: String,
    pub version: String,
    pub profile: String,
    pub extensions: String,
    pub devices: Vec<MockDevice>,
}

impl MockPlatform {
    pub fn new(name: &str, vendor: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            vendor: vendor.to_string(),
            version: version.to_string(),
            profile: "FULL_PROFILE".to_string(),
            extensions: "cl_khr_icd".to_string(),
            devices: Vec::new(),
        }
    }

    pub fn with_device(mut self, device: MockDevice) -> Self {
        self.devices.push(device);
        self
    }
}

#[derive(Debug)]
struct MockBuffer {
    data: Vec<u8>,
}

#[derive(Debug)]
struct MockProgram {
    context: usize,
    source: String,
    built: bool,
    log: String,
}

#[derive(Debug, Default)]
struct Objects {
    next: usize,
    contexts: HashMap<usize, Vec<DeviceId>>,
    queues: HashMap<usize, usize>,
    buffers: HashMap<usize, MockBuffer>,
    programs: HashMap<usize, MockProgram>,
    kernels: HashMap<usize, String>,
}

impl Objects {
    fn allocate(&mut self) -> usize {
        self.next += 1;
        OBJECT_BASE + self.next
    }

    fn live(&self) -> usize {
        self.contexts.len()
            + self.queues.len()
            + self.buffers.len()
            + self.programs.len()
            + self.kernels.len()
    }
}

fn raw(addr: usize) -> *mut c_void {
    addr as *mut c_void
}

fn addr(raw: *mut c_void) -> usize {
    raw as usize
}

/// Simulated driver for tests.
#[derive(Debug, Default)]
pub struct MockDriver {
    platforms: Vec<MockPlatform>,
    call_failures: HashMap<&'static str, Status>,
    nth_call_failures: HashMap<(&'static str, usize), Status>,
    handle_failures: HashMap<usize, Status>,
    info_overrides: HashMap<(usize, DeviceParam), InfoValue>,
    calls: RefCell<Vec<&'static str>>,
    objects: RefCell<Objects>,
}

impl MockDriver {
    /// A driver with no platforms installed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: MockPlatform) -> Self {
        self.platforms.push(platform);
        self
    }

    /// Makes every invocation of `call` fail with `status`.
    pub fn fail_call(mut self, call: &'static str, status: Status) -> Self {
        self.call_failures.insert(call, status);
        self
    }

    /// Makes only the `n`th invocation of `call` fail with `status`, counting
    /// from one since construction or the last [`clear_calls`](Self::clear_calls).
    pub fn fail_nth_call(mut self, call: &'static str, n: usize, status: Status) -> Self {
        self.nth_call_failures.insert((call, n), status);
        self
    }

    /// Makes info and device queries on platform `index` fail with `status`.
    pub fn fail_platform(mut self, index: usize, status: Status) -> Self {
        let key = addr(self.platform_handle(index).as_raw());
        self.handle_failures.insert(key, status);
        self
    }

    /// Makes info queries on one device fail with `status`.
    pub fn fail_device(mut self, platform: usize, device: usize, status: Status) -> Self {
        let key = addr(self.device_handle(platform, device).as_raw());
        self.handle_failures.insert(key, status);
        self
    }

    /// Replaces the value one device reports for `param`.
    pub fn override_device_info(
        mut self,
        platform: usize,
        device: usize,
        param: DeviceParam,
        value: InfoValue,
    ) -> Self {
        let key = addr(self.device_handle(platform, device).as_raw());
        self.info_overrides.insert((key, param), value);
        self
    }

    /// Handle of platform `index`.
    pub fn platform_handle(&self, index: usize) -> PlatformId {
        PlatformId::from_raw(raw((index + 1) * HANDLE_STRIDE))
    }

    /// Handle of device `device` on platform `platform`.
    pub fn device_handle(&self, platform: usize, device: usize) -> DeviceId {
        DeviceId::from_raw(raw((platform + 1) * HANDLE_STRIDE + device + 1))
    }

    /// Native calls made so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Number of contexts, queues, buffers, programs and kernels not yet released.
    pub fn live_objects(&self) -> usize {
        self.objects.borrow().live()
    }

    fn enter(&self, call: &'static str) -> DriverResult<()> {
        let mut calls = self.calls.borrow_mut();
        calls.push(call);
        let n = calls.iter().filter(|&&c| c == call).count();
        match self
            .call_failures
            .get(call)
            .or_else(|| self.nth_call_failures.get(&(call, n)))
        {
            Some(status) => Err(*status),
            None => Ok(()),
        }
    }

    fn handle_failure(&self, raw: *mut c_void) -> DriverResult<()> {
        match self.handle_failures.get(&addr(raw)) {
            Some(status) => Err(*status),
            None => Ok(()),
        }
    }

    fn platform(&self, platform: PlatformId) -> DriverResult<&MockPlatform> {
        let a = addr(platform.as_raw());
        if a == 0 || a % HANDLE_STRIDE != 0 {
            return Err(Status::INVALID_PLATFORM);
        }
        self.platforms
            .get(a / HANDLE_STRIDE - 1)
            .ok_or(Status::INVALID_PLATFORM)
    }

    fn device(&self, device: DeviceId) -> DriverResult<&MockDevice> {
        let a = addr(device.as_raw());
        let (platform, slot) = (a / HANDLE_STRIDE, a % HANDLE_STRIDE);
        if a >= OBJECT_BASE || platform == 0 || slot == 0 {
            return Err(Status::INVALID_DEVICE);
        }
        self.platforms
            .get(platform - 1)
            .and_then(|p| p.devices.get(slot - 1))
            .ok_or(Status::INVALID_DEVICE)
    }
}

impl Driver for MockDriver {
    fn name(&self) -> &str {
        "mock"
    }

    fn platform_ids(&self) -> DriverResult<Vec<PlatformId>> {
        self.enter("clGetPlatformIDs")?;
        if self.platforms.is_empty() {
            return Err(Status::PLATFORM_NOT_FOUND_KHR);
        }
        Ok((0..self.platforms.len())
            .map(|i| self.platform_handle(i))
            .collect())
    }

    fn device_ids(
        &self,
        platform: PlatformId,
        device_type: DeviceType,
    ) -> DriverResult<Vec<DeviceId>> {
        self.enter("clGetDeviceIDs")?;
        let entry = self.platform(platform)?;
        self.handle_failure(platform.as_raw())?;
        let index = addr(platform.as_raw()) / HANDLE_STRIDE - 1;
        let devices: Vec<DeviceId> = entry
            .devices
            .iter()
            .enumerate()
            .filter(|(_, d)| device_type.intersects(d.device_type))
            .map(|(j, _)| self.device_handle(index, j))
            .collect();
        if devices.is_empty() {
            Err(Status::DEVICE_NOT_FOUND)
        } else {
            Ok(devices)
        }
    }

    fn platform_info(&self, platform: PlatformId, param: PlatformParam) -> DriverResult<String> {
        self.enter("clGetPlatformInfo")?;
        let entry = self.platform(platform)?;
        self.handle_failure(platform.as_raw())?;
        let value = match param {
            PlatformParam::Profile => &entry.profile,
            PlatformParam::Version => &entry.version,
            PlatformParam::Name => &entry.name,
            PlatformParam::Vendor => &entry.vendor,
            PlatformParam::Extensions => &entry.extensions,
        };
        Ok(value.clone())
    }

    fn device_info(&self, device: DeviceId, param: DeviceParam) -> DriverResult<InfoValue> {
        self.enter("clGetDeviceInfo")?;
        let entry = self.device(device)?;
        self.handle_failure(device.as_raw())?;
        if let Some(value) = self.info_overrides.get(&(addr(device.as_raw()), param)) {
            return Ok(value.clone());
        }
        let value = match param {
            DeviceParam::Type => InfoValue::Ulong(entry.device_type.bits()),
            DeviceParam::Vendor => InfoValue::Text(entry.vendor.clone()),
            DeviceParam::MaxComputeUnits => InfoValue::Uint(entry.compute_units),
            DeviceParam::MaxWorkGroupSize => InfoValue::Size(entry.max_work_group_size),
            DeviceParam::MaxClockFrequency => InfoValue::Uint(entry.max_clock_mhz),
            DeviceParam::GlobalMemSize => InfoValue::Ulong(entry.global_mem_bytes),
            DeviceParam::LocalMemSize => InfoValue::Ulong(entry.local_mem_bytes),
            DeviceParam::Name => InfoValue::Text(entry.name.clone()),
            DeviceParam::Version => InfoValue::Text(entry.version.clone()),
            DeviceParam::DriverVersion => InfoValue::Text(entry.driver_version.clone()),
        };
        Ok(value)
    }

    fn create_context(&self, devices: &[DeviceId]) -> DriverResult<ContextId> {
        self.enter("clCreateContext")?;
        if devices.is_empty() {
            return Err(Status::INVALID_VALUE);
        }
        for device in devices {
            self.device(*device)?;
        }
        let mut objects = self.objects.borrow_mut();
        let id = objects.allocate();
        objects.contexts.insert(id, devices.to_vec());
        Ok(ContextId::from_raw(raw(id)))
    }

    fn create_command_queue(&self, context: ContextId, device: DeviceId) -> DriverResult<QueueId> {
        self.enter("clCreateCommandQueueWithProperties")?;
        let mut objects = self.objects.borrow_mut();
        let ctx = addr(context.as_raw());
        let members = objects.contexts.get(&ctx).ok_or(Status::INVALID_CONTEXT)?;
        if !members.contains(&device) {
            return Err(Status::INVALID_DEVICE);
        }
        let id = objects.allocate();
        objects.queues.insert(id, ctx);
        Ok(QueueId::from_raw(raw(id)))
    }

    fn release_context(&self, context: ContextId) -> DriverResult<()> {
        self.enter("clReleaseContext")?;
        self.objects
            .borrow_mut()
            .contexts
            .remove(&addr(context.as_raw()))
            .map(|_| ())
            .ok_or(Status::INVALID_CONTEXT)
    }

    fn release_command_queue(&self, queue: QueueId) -> DriverResult<()> {
        self.enter("clReleaseCommandQueue")?;
        self.objects
            .borrow_mut()
            .queues
            .remove(&addr(queue.as_raw()))
            .map(|_| ())
            .ok_or(Status::INVALID_COMMAND_QUEUE)
    }

    fn create_buffer(
        &self,
        context: ContextId,
        flags: MemFlags,
        size: usize,
        host_data: Option<&[u8]>,
    ) -> DriverResult<MemId> {
        self.enter("clCreateBuffer")?;
        let mut objects = self.objects.borrow_mut();
        if !objects.contexts.contains_key(&addr(context.as_raw())) {
            return Err(Status::INVALID_CONTEXT);
        }
        if size == 0 {
            return Err(Status::INVALID_BUFFER_SIZE);
        }
        let data = match (host_data, flags.contains(MemFlags::COPY_HOST_PTR)) {
            (Some(bytes), true) if bytes.len() == size => bytes.to_vec(),
            (None, false) => vec![0; size],
            _ => return Err(Status::INVALID_HOST_PTR),
        };
        let id = objects.allocate();
        objects.buffers.insert(id, MockBuffer { data });
        Ok(MemId::from_raw(raw(id)))
    }

    fn enqueue_write_buffer(&self, queue: QueueId, buffer: MemId, data: &[u8]) -> DriverResult<()> {
        self.enter("clEnqueueWriteBuffer")?;
        let mut objects = self.objects.borrow_mut();
        if !objects.queues.contains_key(&addr(queue.as_raw())) {
            return Err(Status::INVALID_COMMAND_QUEUE);
        }
        let target = objects
            .buffers
            .get_mut(&addr(buffer.as_raw()))
            .ok_or(Status::INVALID_MEM_OBJECT)?;
        if data.len() > target.data.len() {
            return Err(Status::INVALID_VALUE);
        }
        target.data[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn enqueue_read_buffer(
        &self,
        queue: QueueId,
        buffer: MemId,
        data: &mut [u8],
    ) -> DriverResult<()> {
        self.enter("clEnqueueReadBuffer")?;
        let objects = self.objects.borrow();
        if !objects.queues.contains_key(&addr(queue.as_raw())) {
            return Err(Status::INVALID_COMMAND_QUEUE);
        }
        let source = objects
            .buffers
            .get(&addr(buffer.as_raw()))
            .ok_or(Status::INVALID_MEM_OBJECT)?;
        if data.len() > source.data.len() {
            return Err(Status::INVALID_VALUE);
        }
        data.copy_from_slice(&source.data[..data.len()]);
        Ok(())
    }

    fn release_mem_object(&self, buffer: MemId) -> DriverResult<()> {
        self.enter("clReleaseMemObject")?;
        self.objects
            .borrow_mut()
            .buffers
            .remove(&addr(buffer.as_raw()))
            .map(|_| ())
            .ok_or(Status::INVALID_MEM_OBJECT)
    }

    fn create_program_with_source(
        &self,
        context: ContextId,
        source: &str,
    ) -> DriverResult<ProgramId> {
        self.enter("clCreateProgramWithSource")?;
        let mut objects = self.objects.borrow_mut();
        let ctx = addr(context.as_raw());
        if !objects.contexts.contains_key(&ctx) {
            return Err(Status::INVALID_CONTEXT);
        }
        let id = objects.allocate();
        objects.programs.insert(
            id,
            MockProgram {
                context: ctx,
                source: source.to_string(),
                built: false,
                log: String::new(),
            },
        );
        Ok(ProgramId::from_raw(raw(id)))
    }

    fn build_program(
        &self,
        program: ProgramId,
        devices: &[DeviceId],
        _options: &str,
    ) -> DriverResult<()> {
        self.enter("clBuildProgram")?;
        let mut objects = self.objects.borrow_mut();
        let objects = &mut *objects;
        let entry = objects
            .programs
            .get_mut(&addr(program.as_raw()))
            .ok_or(Status::INVALID_PROGRAM)?;
        let members = objects
            .contexts
            .get(&entry.context)
            .ok_or(Status::INVALID_CONTEXT)?;
        if devices.iter().any(|d| !members.contains(d)) {
            return Err(Status::INVALID_DEVICE);
        }
        let errors: Vec<String> = entry
            .source
            .lines()
            .enumerate()
            .filter_map(|(n, line)| {
                line.trim_start()
                    .strip_prefix("#error")
                    .map(|msg| format!("<source>:{}: error: {}", n + 1, msg.trim()))
            })
            .collect();
        if errors.is_empty() {
            entry.built = true;
            entry.log.clear();
            Ok(())
        } else {
            entry.built = false;
            entry.log = errors.join("\n");
            Err(Status::BUILD_PROGRAM_FAILURE)
        }
    }

    fn program_build_log(&self, program: ProgramId, device: DeviceId) -> DriverResult<String> {
        self.enter("clGetProgramBuildInfo")?;
        self.device(device)?;
        let objects = self.objects.borrow();
        objects
            .programs
            .get(&addr(program.as_raw()))
            .map(|p| p.log.clone())
            .ok_or(Status::INVALID_PROGRAM)
    }

    fn create_kernel(&self, program: ProgramId, name: &str) -> DriverResult<KernelId> {
        self.enter("clCreateKernel")?;
        let mut objects = self.objects.borrow_mut();
        let entry = objects
            .programs
            .get(&addr(program.as_raw()))
            .ok_or(Status::INVALID_PROGRAM)?;
        if !entry.built {
            return Err(Status::INVALID_PROGRAM_EXECUTABLE);
        }
        let declared = entry
            .source
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .any(|token| token == name);
        if !declared {
            return Err(Status::INVALID_KERNEL_NAME);
        }
        let id = objects.allocate();
        objects.kernels.insert(id, name.to_string());
        Ok(KernelId::from_raw(raw(id)))
    }

    fn release_program(&self, program: ProgramId) -> DriverResult<()> {
        self.enter("clReleaseProgram")?;
        self.objects
            .borrow_mut()
            .programs
            .remove(&addr(program.as_raw()))
            .map(|_| ())
            .ok_or(Status::INVALID_PROGRAM)
    }

    fn release_kernel(&self, kernel: KernelId) -> DriverResult<()> {
        self.enter("clReleaseKernel")?;
        self.objects
            .borrow_mut()
            .kernels
            .remove(&addr(kernel.as_raw()))
            .map(|_| ())
            .ok_or(Status::INVALID_KERNEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_device_driver() -> MockDriver {
        MockDriver::new().with_platform(
            MockPlatform::new("Sim", "Acme", "OpenCL 3.0")
                .with_device(MockDevice::new("Sim CPU", "Acme", DeviceType::CPU))
                .with_device(MockDevice::new("Sim GPU", "Acme", DeviceType::GPU)),
        )
    }

    #[test]
    fn test_device_type_filtering() {
        let driver = two_device_driver();
        let platform = driver.platform_handle(0);
        assert_eq!(driver.device_ids(platform, DeviceType::ALL).unwrap().len(), 2);
        assert_eq!(
            driver.device_ids(platform, DeviceType::GPU).unwrap(),
            vec![driver.device_handle(0, 1)]
        );
        assert_eq!(
            driver.device_ids(platform, DeviceType::ACCELERATOR),
            Err(Status::DEVICE_NOT_FOUND)
        );
    }

    #[test]
    fn test_unknown_handles() {
        let driver = two_device_driver();
        assert_eq!(
            driver.platform_info(driver.platform_handle(3), PlatformParam::Name),
            Err(Status::INVALID_PLATFORM)
        );
        assert_eq!(
            driver.device_info(driver.device_handle(0, 9), DeviceParam::Name),
            Err(Status::INVALID_DEVICE)
        );
        assert_eq!(
            driver.release_context(ContextId::from_raw(raw(OBJECT_BASE + 77))),
            Err(Status::INVALID_CONTEXT)
        );
    }

    #[test]
    fn test_call_log_and_injection() {
        let driver = two_device_driver().fail_call("clGetPlatformInfo", Status::OUT_OF_HOST_MEMORY);
        assert!(driver.platform_ids().is_ok());
        assert_eq!(
            driver.platform_info(driver.platform_handle(0), PlatformParam::Name),
            Err(Status::OUT_OF_HOST_MEMORY)
        );
        assert_eq!(driver.calls(), vec!["clGetPlatformIDs", "clGetPlatformInfo"]);
        driver.clear_calls();
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_object_tables() {
        let driver = two_device_driver();
        let device = driver.device_handle(0, 1);
        let context = driver.create_context(&[device]).unwrap();
        let queue = driver.create_command_queue(context, device).unwrap();
        assert_eq!(driver.live_objects(), 2);
        assert_eq!(
            driver.create_command_queue(context, driver.device_handle(0, 0)),
            Err(Status::INVALID_DEVICE)
        );
        driver.release_command_queue(queue).unwrap();
        driver.release_context(context).unwrap();
        assert_eq!(driver.live_objects(), 0);
    }

    #[test]
    fn test_nth_call_failure() {
        let driver = two_device_driver().fail_nth_call("clGetDeviceIDs", 2, Status::OUT_OF_RESOURCES);
        let platform = driver.platform_handle(0);
        assert!(driver.device_ids(platform, DeviceType::ALL).is_ok());
        assert_eq!(
            driver.device_ids(platform, DeviceType::CPU),
            Err(Status::OUT_OF_RESOURCES)
        );
        assert!(driver.device_ids(platform, DeviceType::GPU).is_ok());

        driver.clear_calls();
        assert!(driver.device_ids(platform, DeviceType::ALL).is_ok());
        assert!(driver.device_ids(platform, DeviceType::CPU).is_err());
    }
}
