//! Flag types and info-query parameters.

use crate::error::ClError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// Device category bitfield, using the native `cl_device_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceType(u64);

impl DeviceType {
    pub const DEFAULT: DeviceType = DeviceType(1 << 0);
    pub const CPU: DeviceType = DeviceType(1 << 1);
    pub const GPU: DeviceType = DeviceType(1 << 2);
    pub const ACCELERATOR: DeviceType = DeviceType(1 << 3);
    pub const CUSTOM: DeviceType = DeviceType(1 << 4);
    pub const ALL: DeviceType = DeviceType(0xFFFF_FFFF);

    const NAMED: [(DeviceType, &'static str); 5] = [
        (Self::DEFAULT, "DEFAULT"),
        (Self::CPU, "CPU"),
        (Self::GPU, "GPU"),
        (Self::ACCELERATOR, "ACCELERATOR"),
        (Self::CUSTOM, "CUSTOM"),
    ];

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: DeviceType) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if `self` and `other` share any bit.
    pub fn intersects(self, other: DeviceType) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for DeviceType {
    fn default() -> Self {
        Self::GPU
    }
}

impl BitOr for DeviceType {
    type Output = DeviceType;

    fn bitor(self, rhs: Self) -> Self::Output {
        DeviceType(self.0 | rhs.0)
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return write!(f, "ALL");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "{:#x}", self.0)
        } else {
            write!(f, "{}", names.join(" | "))
        }
    }
}

impl FromStr for DeviceType {
    type Err = ClError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::ALL),
            "cpu" => Ok(Self::CPU),
            "gpu" => Ok(Self::GPU),
            "accelerator" => Ok(Self::ACCELERATOR),
            "default" => Ok(Self::DEFAULT),
            "custom" => Ok(Self::CUSTOM),
            other => Err(ClError::invalid_argument(format!(
                "unknown device type '{other}'"
            ))),
        }
    }
}

impl Serialize for DeviceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Memory object flags, using the native `cl_mem_flags` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemFlags(u64);

impl MemFlags {
    pub const READ_WRITE: MemFlags = MemFlags(1 << 0);
    pub const WRITE_ONLY: MemFlags = MemFlags(1 << 1);
    pub const READ_ONLY: MemFlags = MemFlags(1 << 2);
    pub const USE_HOST_PTR: MemFlags = MemFlags(1 << 3);
    pub const ALLOC_HOST_PTR: MemFlags = MemFlags(1 << 4);
    pub const COPY_HOST_PTR: MemFlags = MemFlags(1 << 5);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub fn contains(self, other: MemFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Default for MemFlags {
    fn default() -> Self {
        Self::READ_WRITE
    }
}

impl BitOr for MemFlags {
    type Output = MemFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        MemFlags(self.0 | rhs.0)
    }
}

/// Platform info query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformParam {
    Profile,
    Version,
    Name,
    Vendor,
    Extensions,
}

impl PlatformParam {
    /// Native `cl_platform_info` value.
    pub const fn raw(self) -> u32 {
        match self {
            Self::Profile => 0x0900,
            Self::Version => 0x0901,
            Self::Name => 0x0902,
            Self::Vendor => 0x0903,
            Self::Extensions => 0x0904,
        }
    }
}

/// Device info query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceParam {
    Type,
    Vendor,
    MaxComputeUnits,
    MaxWorkGroupSize,
    MaxClockFrequency,
    GlobalMemSize,
    LocalMemSize,
    Name,
    Version,
    DriverVersion,
}

impl DeviceParam {
    /// Native `cl_device_info` value.
    pub const fn raw(self) -> u32 {
        match self {
            Self::Type => 0x1000,
            Self::Vendor => 0x102C,
            Self::MaxComputeUnits => 0x1002,
            Self::MaxWorkGroupSize => 0x1004,
            Self::MaxClockFrequency => 0x100C,
            Self::GlobalMemSize => 0x101F,
            Self::LocalMemSize => 0x1023,
            Self::Name => 0x102B,
            Self::Version => 0x102F,
            Self::DriverVersion => 0x102D,
        }
    }
}

/// A value returned by a device info query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    Text(String),
    Uint(u32),
    Ulong(u64),
    Size(usize),
}
