//! Context and command-queue creation.

use crate::driver::Driver;
use crate::error::{Result, StatusExt};
use crate::handle::{check_devices, ContextId, DeviceId, QueueId};

/// Creates a context spanning `devices`.
pub fn create_context(driver: &dyn Driver, devices: &[DeviceId]) -> Result<ContextId> {
    check_devices(devices)?;
    driver.create_context(devices).or_runtime("clCreateContext")
}

/// Creates a context for a single device.
pub fn create_context_for_device(driver: &dyn Driver, device: DeviceId) -> Result<ContextId> {
    create_context(driver, &[device.check()?])
}

/// Creates an in-order command queue on `device`, which must belong to `context`.
pub fn create_command_queue(
    driver: &dyn Driver,
    context: ContextId,
    device: DeviceId,
) -> Result<QueueId> {
    context.check()?;
    device.check()?;
    driver
        .create_command_queue(context, device)
        .or_runtime("clCreateCommandQueueWithProperties")
}

pub fn release_context(driver: &dyn Driver, context: ContextId) -> Result<()> {
    context.check()?;
    driver.release_context(context).or_runtime("clReleaseContext")
}

pub fn release_command_queue(driver: &dyn Driver, queue: QueueId) -> Result<()> {
    queue.check()?;
    driver
        .release_command_queue(queue)
        .or_runtime("clReleaseCommandQueue")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::{MockDevice, MockDriver, MockPlatform};
    use crate::status::Status;
    use crate::types::DeviceType;

    fn driver() -> MockDriver {
        MockDriver::new().with_platform(
            MockPlatform::new("Sim", "Acme", "OpenCL 3.0")
                .with_device(MockDevice::new("gpu0", "Acme", DeviceType::GPU))
                .with_device(MockDevice::new("gpu1", "Acme", DeviceType::GPU)),
        )
    }

    #[test]
    fn test_context_and_queue_lifecycle() {
        let driver = driver();
        let device = driver.device_handle(0, 0);
        let context = create_context_for_device(&driver, device).unwrap();
        let queue = create_command_queue(&driver, context, device).unwrap();

        release_command_queue(&driver, queue).unwrap();
        release_context(&driver, context).unwrap();
        assert_eq!(driver.live_objects(), 0);
    }

    #[test]
    fn test_multi_device_context() {
        let driver = driver();
        let devices = [driver.device_handle(0, 0), driver.device_handle(0, 1)];
        let context = create_context(&driver, &devices).unwrap();
        for device in devices {
            let queue = create_command_queue(&driver, context, device).unwrap();
            release_command_queue(&driver, queue).unwrap();
        }
        release_context(&driver, context).unwrap();
    }

    #[test]
    fn test_invalid_arguments_skip_driver() {
        let driver = driver();
        assert!(create_context(&driver, &[]).unwrap_err().is_invalid_argument());
        assert!(create_context(&driver, &[driver.device_handle(0, 0), DeviceId::null()])
            .unwrap_err()
            .is_invalid_argument());
        assert!(create_context_for_device(&driver, DeviceId::null())
            .unwrap_err()
            .is_invalid_argument());
        assert!(create_command_queue(&driver, ContextId::null(), driver.device_handle(0, 0))
            .unwrap_err()
            .is_invalid_argument());
        assert!(release_context(&driver, ContextId::null())
            .unwrap_err()
            .is_invalid_argument());
        assert!(release_command_queue(&driver, QueueId::null())
            .unwrap_err()
            .is_invalid_argument());
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn test_double_release_reports_status() {
        let driver = driver();
        let context = create_context_for_device(&driver, driver.device_handle(0, 0)).unwrap();
        release_context(&driver, context).unwrap();
        let err = release_context(&driver, context).unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_CONTEXT));
        assert!(err.to_string().starts_with("clReleaseContext failed"));
    }
}
