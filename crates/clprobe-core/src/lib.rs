//! OpenCL platform and device enumeration.
//!
//! This crate discovers the OpenCL platforms and devices installed on a host
//! and wraps the driver calls needed to set up work on them. Every driver call
//! goes through the [`driver::Driver`] trait, so the same code runs against the
//! native runtime (feature `opencl`) or the simulated driver used in tests
//! (feature `test-utils`).
//!
//! # Modules
//!
//! - [`status`]: Native status codes and their symbolic names
//! - [`error`]: The two-kind error type raised by every wrapper
//! - [`handle`]: Opaque handles for platforms, devices and runtime objects
//! - [`types`]: Device categories, memory flags and info parameters
//! - [`driver`]: The driver seam and its implementations
//! - [`platform`]: Platform and device discovery and attribute queries
//! - [`context`]: Context and command-queue creation
//! - [`buffer`]: Device buffers and blocking transfers
//! - [`program`]: Program compilation and kernel creation
//! - [`config`]: Report configuration
//! - [`report`]: Inventory collection and rendering

pub mod buffer;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod handle;
pub mod platform;
pub mod program;
pub mod report;
pub mod status;
pub mod types;

pub use error::{ClError, Result};
pub use status::Status;

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use clprobe_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{OutputFormat, ReportConfig, ReportConfigBuilder};
    pub use crate::driver::{Driver, DriverResult};
    pub use crate::error::{ClError, Result};
    pub use crate::handle::{ContextId, DeviceId, KernelId, MemId, PlatformId, ProgramId, QueueId};
    pub use crate::platform::{DeviceDetails, DeviceInfo, PartialDeviceInfo, PlatformInfo};
    pub use crate::report::{DeviceCounts, Inventory, Outcome, ReportError};
    pub use crate::status::Status;
    pub use crate::types::{DeviceParam, DeviceType, InfoValue, MemFlags, PlatformParam};
}
