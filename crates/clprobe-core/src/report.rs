//! Platform and device inventory.
//!
//! [`Inventory::collect`] walks every platform and device once and records
//! what it found. Failures are isolated: an error while processing one
//! platform is stored in that platform's entry and the walk moves on, and
//! likewise for a single device. Only a failure to list platforms at all
//! aborts the walk.
//!
//! The collected inventory is then rendered either as the console transcript
//! ([`render_text`]) or as JSON ([`render_json`]).

use crate::config::{OutputFormat, ReportConfig};
use crate::driver::Driver;
use crate::error::{ClError, Result};
use crate::handle::{DeviceId, PlatformId};
use crate::platform::{
    get_devices, get_platforms, platform_info, print_device_info, print_partial_device_info,
    print_platform_info, read_device_info, DeviceInfo, PartialDeviceInfo, PlatformInfo,
};
use crate::types::DeviceType;
use log::{debug, warn};
use serde::{Serialize, Serializer};
use std::io::{self, Write};
use thiserror::Error;

const SEPARATOR: &str = "==========================================";

/// Errors that abort a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The platform list could not be obtained.
    #[error(transparent)]
    Cl(#[from] ClError),

    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    /// Encoding the JSON report failed.
    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

/// How an enumeration run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// At least one platform was found and reported.
    Completed,
    /// The driver reported no platforms.
    NoPlatforms,
}

fn error_text<S: Serializer>(error: &Option<ClError>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(error) => serializer.collect_str(error),
        None => serializer.serialize_none(),
    }
}

/// Everything found on the host.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub platforms: Vec<PlatformEntry>,
}

/// One platform and its devices.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformEntry {
    /// One-based position in the platform list.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<PlatformInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<DeviceListing>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_text")]
    pub error: Option<ClError>,
}

/// Device counts and per-device details for one platform.
///
/// `total` is recorded as soon as the full device list is known; `counts`
/// stays empty when a per-category query fails afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceListing {
    pub total: usize,
    #[serde(flatten)]
    pub counts: Option<DeviceCounts>,
    pub detailed: Vec<DeviceEntry>,
}

/// Number of devices in each category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceCounts {
    pub cpu: usize,
    pub gpu: usize,
    pub accelerator: usize,
}

/// One device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceEntry {
    /// One-based position in the detailed device list.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DeviceInfo>,
    /// Attributes read before `error` occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<PartialDeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "error_text")]
    pub error: Option<ClError>,
}

impl Inventory {
    /// Walks every platform and device the driver exposes.
    pub fn collect(driver: &dyn Driver, config: &ReportConfig) -> Result<Self> {
        let platforms = get_platforms(driver)?;
        debug!("collecting inventory for {} platform(s)", platforms.len());
        let platforms = platforms
            .into_iter()
            .enumerate()
            .map(|(i, platform)| PlatformEntry::collect(driver, config, i + 1, platform))
            .collect();
        Ok(Self { platforms })
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

impl PlatformEntry {
    fn collect(driver: &dyn Driver, config: &ReportConfig, index: usize, platform: PlatformId) -> Self {
        let mut entry = Self {
            index,
            info: None,
            devices: None,
            error: None,
        };
        if let Err(e) = entry.fill(driver, config, platform) {
            warn!("skipping platform #{index}: {e}");
            entry.error = Some(e);
        }
        entry
    }

    fn fill(&mut self, driver: &dyn Driver, config: &ReportConfig, platform: PlatformId) -> Result<()> {
        self.info = Some(platform_info(driver, platform, config.verbose)?);

        let all = get_devices(driver, platform, DeviceType::ALL)?;
        let listing = self.devices.insert(DeviceListing {
            total: all.len(),
            ..Default::default()
        });
        if all.is_empty() {
            return Ok(());
        }

        listing.counts = Some(DeviceCounts {
            cpu: get_devices(driver, platform, DeviceType::CPU)?.len(),
            gpu: get_devices(driver, platform, DeviceType::GPU)?.len(),
            accelerator: get_devices(driver, platform, DeviceType::ACCELERATOR)?.len(),
        });

        let detailed = if config.device_type == DeviceType::ALL {
            all
        } else {
            get_devices(driver, platform, config.device_type)?
        };
        listing.detailed = detailed
            .into_iter()
            .enumerate()
            .map(|(j, device)| DeviceEntry::collect(driver, config, j + 1, device))
            .collect();
        Ok(())
    }
}

impl DeviceEntry {
    fn collect(driver: &dyn Driver, config: &ReportConfig, index: usize, device: DeviceId) -> Self {
        let mut partial = PartialDeviceInfo::default();
        match read_device_info(driver, device, config.verbose, &mut partial) {
            Ok(info) => Self {
                index,
                info: Some(info),
                partial: None,
                error: None,
            },
            Err(e) => {
                warn!("failed to query device #{index}: {e}");
                Self {
                    index,
                    info: None,
                    partial: Some(partial),
                    error: Some(e),
                }
            }
        }
    }
}

fn render_listing(listing: &DeviceListing, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<()> {
    if listing.total == 0 {
        writeln!(out, "  No devices found for this platform.")?;
        return Ok(());
    }
    writeln!(out, "  Found {} device(s)\n", listing.total)?;

    let Some(counts) = listing.counts else {
        return Ok(());
    };
    if counts.cpu > 0 {
        writeln!(out, "  CPU Devices: {}", counts.cpu)?;
    }
    if counts.gpu > 0 {
        writeln!(out, "  GPU Devices: {}", counts.gpu)?;
    }
    if counts.accelerator > 0 {
        writeln!(out, "  Accelerator Devices: {}", counts.accelerator)?;
    }
    writeln!(out, "\n  Detailed device information:")?;

    for device in &listing.detailed {
        writeln!(out, "    Device #{}:", device.index)?;
        if let Some(info) = &device.info {
            print_device_info(out, info)?;
            writeln!(out)?;
        }
        if let Some(partial) = &device.partial {
            print_partial_device_info(out, partial)?;
        }
        if let Some(e) = &device.error {
            writeln!(err, "    Error getting info for device #{}: {}\n", device.index, e)?;
        }
    }
    Ok(())
}

fn render_platform(entry: &PlatformEntry, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Platform #{}:", entry.index)?;
    if let Some(info) = &entry.info {
        print_platform_info(out, info)?;
        writeln!(out, "\n--- Device Information ---")?;
    }

    if let Some(listing) = &entry.devices {
        render_listing(listing, out, err)?;
    }

    match &entry.error {
        None => writeln!(out, "{SEPARATOR}\n")?,
        Some(e) => {
            writeln!(err, "Error processing platform #{}: {}", entry.index, e)?;
            writeln!(err, "Skipping to next platform...\n")?;
        }
    }
    Ok(())
}

/// Writes the console transcript.
pub fn render_text(inventory: &Inventory, out: &mut dyn Write, err: &mut dyn Write) -> io::Result<Outcome> {
    writeln!(out, "=== OpenCL Platform and Device Information ===\n")?;

    if inventory.is_empty() {
        writeln!(out, "No OpenCL platforms found on this system.")?;
        writeln!(out, "Please ensure OpenCL drivers are installed.")?;
        return Ok(Outcome::NoPlatforms);
    }

    writeln!(out, "Found {} platform(s)", inventory.platforms.len())?;
    writeln!(out, "{SEPARATOR}\n")?;

    for entry in &inventory.platforms {
        render_platform(entry, out, err)?;
    }

    writeln!(out, "OpenCL platform enumeration completed.")?;
    Ok(Outcome::Completed)
}

/// Writes the inventory as pretty-printed JSON.
pub fn render_json(inventory: &Inventory, out: &mut dyn Write) -> std::result::Result<Outcome, ReportError> {
    serde_json::to_writer_pretty(&mut *out, inventory)?;
    writeln!(out)?;
    if inventory.is_empty() {
        Ok(Outcome::NoPlatforms)
    } else {
        Ok(Outcome::Completed)
    }
}

/// Collects the inventory and writes it in the configured format.
pub fn run(
    driver: &dyn Driver,
    config: &ReportConfig,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> std::result::Result<Outcome, ReportError> {
    let inventory = Inventory::collect(driver, config)?;
    let outcome = match config.format {
        OutputFormat::Text => render_text(&inventory, out, err)?,
        OutputFormat::Json => render_json(&inventory, out)?,
    };
    out.flush()?;
    Ok(outcome)
}
