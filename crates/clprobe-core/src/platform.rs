//! Platform and device enumeration.
//!
//! Thin wrappers over the enumeration and info-query entry points, plus the
//! fixed-format printers used by the report. Every wrapper rejects null
//! handles before touching the driver.

use crate::driver::Driver;
use crate::error::{ClError, Result, StatusExt};
use crate::handle::{DeviceId, PlatformId};
use crate::status::Status;
use crate::types::{DeviceParam, DeviceType, InfoValue, PlatformParam};
use log::debug;
use serde::Serialize;
use std::io::{self, Write};

/// Descriptive attributes of a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    pub name: String,
    pub vendor: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<String>,
}

/// Descriptive attributes of a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub vendor: String,
    pub compute_units: u32,
    pub global_mem_bytes: u64,
    #[serde(flatten)]
    pub details: Option<DeviceDetails>,
}

/// Extra device attributes queried in verbose mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDetails {
    pub device_type: DeviceType,
    pub version: String,
    pub driver_version: String,
    pub max_clock_mhz: u32,
    pub max_work_group_size: usize,
    pub local_mem_bytes: u64,
}

/// The leading device attributes, filled in as each query succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PartialDeviceInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compute_units: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global_mem_bytes: Option<u64>,
}

impl DeviceInfo {
    /// Global memory in whole mebibytes.
    pub fn global_mem_mb(&self) -> u64 {
        self.global_mem_bytes / 1024 / 1024
    }
}

/// Lists every installed platform.
///
/// A host with no vendor drivers makes the ICD loader report
/// `CL_PLATFORM_NOT_FOUND_KHR`; that is returned as an empty list.
pub fn get_platforms(driver: &dyn Driver) -> Result<Vec<PlatformId>> {
    match driver.platform_ids() {
        Ok(platforms) => {
            debug!("{} reported {} platform(s)", driver.name(), platforms.len());
            Ok(platforms)
        }
        Err(Status::PLATFORM_NOT_FOUND_KHR) => Ok(Vec::new()),
        Err(status) => Err(ClError::runtime("clGetPlatformIDs", status)),
    }
}

/// Lists the devices of `device_type` on a platform.
///
/// `CL_DEVICE_NOT_FOUND` is returned as an empty list.
pub fn get_devices(
    driver: &dyn Driver,
    platform: PlatformId,
    device_type: DeviceType,
) -> Result<Vec<DeviceId>> {
    platform.check()?;
    match driver.device_ids(platform, device_type) {
        Ok(devices) => Ok(devices),
        Err(Status::DEVICE_NOT_FOUND) => Ok(Vec::new()),
        Err(status) => Err(ClError::runtime("clGetDeviceIDs", status)),
    }
}

/// Lists the GPU devices on a platform.
pub fn get_gpu_devices(driver: &dyn Driver, platform: PlatformId) -> Result<Vec<DeviceId>> {
    get_devices(driver, platform, DeviceType::default())
}

fn platform_string(driver: &dyn Driver, platform: PlatformId, param: PlatformParam) -> Result<String> {
    platform.check()?;
    driver
        .platform_info(platform, param)
        .or_runtime("clGetPlatformInfo")
}

fn device_value(driver: &dyn Driver, device: DeviceId, param: DeviceParam) -> Result<InfoValue> {
    device.check()?;
    driver.device_info(device, param).or_runtime("clGetDeviceInfo")
}

fn unexpected_shape(param: DeviceParam, value: &InfoValue) -> ClError {
    debug!("clGetDeviceInfo({param:?}) returned {value:?}");
    ClError::runtime("clGetDeviceInfo", Status::INVALID_VALUE)
}

fn device_text(driver: &dyn Driver, device: DeviceId, param: DeviceParam) -> Result<String> {
    match device_value(driver, device, param)? {
        InfoValue::Text(text) => Ok(text),
        other => Err(unexpected_shape(param, &other)),
    }
}

fn device_uint(driver: &dyn Driver, device: DeviceId, param: DeviceParam) -> Result<u32> {
    match device_value(driver, device, param)? {
        InfoValue::Uint(value) => Ok(value),
        other => Err(unexpected_shape(param, &other)),
    }
}

fn device_ulong(driver: &dyn Driver, device: DeviceId, param: DeviceParam) -> Result<u64> {
    match device_value(driver, device, param)? {
        InfoValue::Ulong(value) => Ok(value),
        other => Err(unexpected_shape(param, &other)),
    }
}

fn device_size(driver: &dyn Driver, device: DeviceId, param: DeviceParam) -> Result<usize> {
    match device_value(driver, device, param)? {
        InfoValue::Size(value) => Ok(value),
        other => Err(unexpected_shape(param, &other)),
    }
}

pub fn get_platform_name(driver: &dyn Driver, platform: PlatformId) -> Result<String> {
    platform_string(driver, platform, PlatformParam::Name)
}

pub fn get_device_name(driver: &dyn Driver, device: DeviceId) -> Result<String> {
    device_text(driver, device, DeviceParam::Name)
}

/// Queries the attributes printed for a platform.
pub fn platform_info(driver: &dyn Driver, platform: PlatformId, verbose: bool) -> Result<PlatformInfo> {
    platform.check()?;
    let mut info = PlatformInfo {
        name: platform_string(driver, platform, PlatformParam::Name)?,
        vendor: platform_string(driver, platform, PlatformParam::Vendor)?,
        version: platform_string(driver, platform, PlatformParam::Version)?,
        profile: None,
        extensions: None,
    };
    if verbose {
        info.profile = Some(platform_string(driver, platform, PlatformParam::Profile)?);
        info.extensions = Some(platform_string(driver, platform, PlatformParam::Extensions)?);
    }
    Ok(info)
}

/// Queries the attributes printed for a device.
pub fn device_info(driver: &dyn Driver, device: DeviceId, verbose: bool) -> Result<DeviceInfo> {
    read_device_info(driver, device, verbose, &mut PartialDeviceInfo::default())
}

/// Like [`device_info`], recording each leading attribute in `partial` as soon
/// as it is read, so a failed query still leaves the earlier ones behind.
pub fn read_device_info(
    driver: &dyn Driver,
    device: DeviceId,
    verbose: bool,
    partial: &mut PartialDeviceInfo,
) -> Result<DeviceInfo> {
    device.check()?;
    let name = partial
        .name
        .insert(device_text(driver, device, DeviceParam::Name)?)
        .clone();
    let vendor = partial
        .vendor
        .insert(device_text(driver, device, DeviceParam::Vendor)?)
        .clone();
    let compute_units = *partial
        .compute_units
        .insert(device_uint(driver, device, DeviceParam::MaxComputeUnits)?);
    let global_mem_bytes = *partial
        .global_mem_bytes
        .insert(device_ulong(driver, device, DeviceParam::GlobalMemSize)?);
    let mut info = DeviceInfo {
        name,
        vendor,
        compute_units,
        global_mem_bytes,
        details: None,
    };
    if verbose {
        info.details = Some(DeviceDetails {
            device_type: DeviceType::from_bits(device_ulong(driver, device, DeviceParam::Type)?),
            version: device_text(driver, device, DeviceParam::Version)?,
            driver_version: device_text(driver, device, DeviceParam::DriverVersion)?,
            max_clock_mhz: device_uint(driver, device, DeviceParam::MaxClockFrequency)?,
            max_work_group_size: device_size(driver, device, DeviceParam::MaxWorkGroupSize)?,
            local_mem_bytes: device_ulong(driver, device, DeviceParam::LocalMemSize)?,
        });
    }
    Ok(info)
}

pub fn print_platform_info(out: &mut dyn Write, info: &PlatformInfo) -> io::Result<()> {
    writeln!(out, "=== Platform Info ===")?;
    writeln!(out, "Name: {}", info.name)?;
    writeln!(out, "Vendor: {}", info.vendor)?;
    writeln!(out, "Version: {}", info.version)?;
    if let Some(profile) = &info.profile {
        writeln!(out, "Profile: {profile}")?;
    }
    if let Some(extensions) = &info.extensions {
        writeln!(out, "Extensions: {extensions}")?;
    }
    Ok(())
}

pub fn print_device_info(out: &mut dyn Write, info: &DeviceInfo) -> io::Result<()> {
    writeln!(out, "=== Device Info ===")?;
    writeln!(out, "Name: {}", info.name)?;
    writeln!(out, "Vendor: {}", info.vendor)?;
    writeln!(out, "Compute Units: {}", info.compute_units)?;
    writeln!(out, "Global Memory: {} MB", info.global_mem_mb())?;
    if let Some(details) = &info.details {
        writeln!(out, "Type: {}", details.device_type)?;
        writeln!(out, "Device Version: {}", details.version)?;
        writeln!(out, "Driver Version: {}", details.driver_version)?;
        writeln!(out, "Max Clock Frequency: {} MHz", details.max_clock_mhz)?;
        writeln!(out, "Max Work Group Size: {}", details.max_work_group_size)?;
        writeln!(out, "Local Memory: {} KB", details.local_mem_bytes / 1024)?;
    }
    Ok(())
}

/// Writes the device block up to the first attribute that could not be read.
pub fn print_partial_device_info(out: &mut dyn Write, partial: &PartialDeviceInfo) -> io::Result<()> {
    writeln!(out, "=== Device Info ===")?;
    let Some(name) = &partial.name else { return Ok(()) };
    writeln!(out, "Name: {name}")?;
    let Some(vendor) = &partial.vendor else { return Ok(()) };
    writeln!(out, "Vendor: {vendor}")?;
    let Some(compute_units) = partial.compute_units else { return Ok(()) };
    writeln!(out, "Compute Units: {compute_units}")?;
    if let Some(bytes) = partial.global_mem_bytes {
        writeln!(out, "Global Memory: {} MB", bytes / 1024 / 1024)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDevice, MockDriver, MockPlatform};
    use pretty_assertions::assert_eq;

    fn driver() -> MockDriver {
        MockDriver::new().with_platform(
            MockPlatform::new("Portable Computing Language", "The pocl project", "OpenCL 3.0 PoCL")
                .with_device(
                    MockDevice::new("cpu-haswell", "GenuineIntel", DeviceType::CPU)
                        .compute_units(8)
                        .global_mem_bytes(3 * 1024 * 1024 * 1024 + 512 * 1024),
                ),
        )
    }

    #[test]
    fn test_null_platform_rejected_without_native_call() {
        let driver = driver();
        let err = get_devices(&driver, PlatformId::null(), DeviceType::ALL).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_null_device_rejected_without_native_call() {
        let driver = driver();
        assert!(get_device_name(&driver, DeviceId::null())
            .unwrap_err()
            .is_invalid_argument());
        assert!(device_info(&driver, DeviceId::null(), true)
            .unwrap_err()
            .is_invalid_argument());
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_device_not_found_is_empty() {
        let driver = driver();
        let platform = get_platforms(&driver).unwrap()[0];
        assert!(get_gpu_devices(&driver, platform).unwrap().is_empty());
        assert_eq!(get_devices(&driver, platform, DeviceType::ALL).unwrap().len(), 1);
    }

    #[test]
    fn test_platform_not_found_is_empty() {
        let driver = MockDriver::new();
        assert!(get_platforms(&driver).unwrap().is_empty());
    }

    #[test]
    fn test_names() {
        let driver = driver();
        let platform = driver.platform_handle(0);
        let device = driver.device_handle(0, 0);
        assert_eq!(get_platform_name(&driver, platform).unwrap(), "Portable Computing Language");
        assert_eq!(get_device_name(&driver, device).unwrap(), "cpu-haswell");
    }

    #[test]
    fn test_print_platform_info() {
        let driver = driver();
        let info = platform_info(&driver, driver.platform_handle(0), false).unwrap();
        let mut out = Vec::new();
        print_platform_info(&mut out, &info).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== Platform Info ===\n\
             Name: Portable Computing Language\n\
             Vendor: The pocl project\n\
             Version: OpenCL 3.0 PoCL\n"
        );
    }

    #[test]
    fn test_print_device_info_rounds_memory_down() {
        let driver = driver();
        let info = device_info(&driver, driver.device_handle(0, 0), false).unwrap();
        assert_eq!(info.global_mem_mb(), 3072);
        let mut out = Vec::new();
        print_device_info(&mut out, &info).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== Device Info ===\n\
             Name: cpu-haswell\n\
             Vendor: GenuineIntel\n\
             Compute Units: 8\n\
             Global Memory: 3072 MB\n"
        );
    }

    #[test]
    fn test_verbose_device_info() {
        let driver = driver();
        let info = device_info(&driver, driver.device_handle(0, 0), true).unwrap();
        let details = info.details.unwrap();
        assert_eq!(details.device_type, DeviceType::CPU);
        assert_eq!(details.local_mem_bytes, 64 * 1024);
        assert_eq!(details.max_work_group_size, 256);
    }

    #[test]
    fn test_wrong_info_shape_is_runtime_error() {
        let driver = driver().override_device_info(
            0,
            0,
            DeviceParam::MaxComputeUnits,
            InfoValue::Text("eight".into()),
        );
        let err = device_info(&driver, driver.device_handle(0, 0), false).unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_VALUE));
    }

    #[test]
    fn test_failed_query_carries_status() {
        let driver = driver().fail_device(0, 0, Status::OUT_OF_RESOURCES);
        let err = device_info(&driver, driver.device_handle(0, 0), false).unwrap_err();
        assert!(err.is_runtime());
        assert!(err.to_string().contains("-5"));
    }

    #[test]
    fn test_partial_info_keeps_leading_attributes() {
        let driver = driver().override_device_info(
            0,
            0,
            DeviceParam::MaxComputeUnits,
            InfoValue::Ulong(8),
        );
        let mut partial = PartialDeviceInfo::default();
        let err = read_device_info(&driver, driver.device_handle(0, 0), false, &mut partial).unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_VALUE));
        assert_eq!(partial.name.as_deref(), Some("cpu-haswell"));
        assert_eq!(partial.vendor.as_deref(), Some("GenuineIntel"));
        assert_eq!(partial.compute_units, None);

        let mut out = Vec::new();
        print_partial_device_info(&mut out, &partial).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "=== Device Info ===\nName: cpu-haswell\nVendor: GenuineIntel\n"
        );
    }
}
