//! Opaque driver handles.
//!
//! Each handle kind is its own newtype over the raw pointer the driver hands
//! out, so a context can never be passed where a queue is expected. The crate
//! never looks inside a handle; the only thing it checks is null-ness.

use crate::error::{ClError, Result};
use std::ffi::c_void;
use std::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(*mut c_void);

        impl $name {
            /// Name of this handle kind, used in error messages.
            pub const KIND: &'static str = $kind;

            /// The null handle.
            pub const fn null() -> Self {
                Self(std::ptr::null_mut())
            }

            /// Wraps a raw handle obtained from the driver.
            pub const fn from_raw(raw: *mut c_void) -> Self {
                Self(raw)
            }

            /// Returns the raw handle for passing back to the driver.
            pub const fn as_raw(self) -> *mut c_void {
                self.0
            }

            pub fn is_null(self) -> bool {
                self.0.is_null()
            }

            /// Rejects the null handle with an invalid-argument error.
            pub fn check(self) -> Result<Self> {
                if self.is_null() {
                    Err(ClError::null_handle(Self::KIND))
                } else {
                    Ok(self)
                }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:p})", stringify!($name), self.0)
            }
        }
    };
}

define_handle!(
    /// A vendor driver instance.
    PlatformId,
    "platform"
);
define_handle!(
    /// A compute device exposed by a platform.
    DeviceId,
    "device"
);
define_handle!(ContextId, "context");
define_handle!(QueueId, "command queue");
define_handle!(ProgramId, "program");
define_handle!(KernelId, "kernel");
define_handle!(
    /// A device memory object.
    MemId,
    "buffer"
);

/// Rejects an empty handle list or one containing a null handle.
pub(crate) fn check_devices(devices: &[DeviceId]) -> Result<()> {
    if devices.is_empty() {
        return Err(ClError::invalid_argument("device list is empty"));
    }
    for device in devices {
        device.check()?;
    }
    Ok(())
}
