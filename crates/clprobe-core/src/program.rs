//! Program compilation and kernel creation.

use crate::driver::Driver;
use crate::error::{ClError, Result, StatusExt};
use crate::handle::{check_devices, ContextId, DeviceId, KernelId, ProgramId};

fn check_text(what: &str, text: &str) -> Result<()> {
    if text.contains('\0') {
        return Err(ClError::invalid_argument(format!(
            "{what} contains an interior NUL byte"
        )));
    }
    Ok(())
}

fn check_non_empty(what: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(ClError::invalid_argument(format!("{what} is empty")));
    }
    check_text(what, text)
}

/// Creates a program object from OpenCL C source.
pub fn create_from_source(driver: &dyn Driver, context: ContextId, source: &str) -> Result<ProgramId> {
    context.check()?;
    check_non_empty("program source", source)?;
    driver
        .create_program_with_source(context, source)
        .or_runtime("clCreateProgramWithSource")
}

/// Builds `program` for `devices`.
///
/// A compilation failure surfaces as `CL_BUILD_PROGRAM_FAILURE`; the compiler
/// output is then available through [`get_build_log`].
pub fn build_program(
    driver: &dyn Driver,
    program: ProgramId,
    devices: &[DeviceId],
    options: &str,
) -> Result<()> {
    program.check()?;
    check_devices(devices)?;
    check_text("build options", options)?;
    driver
        .build_program(program, devices, options)
        .or_runtime("clBuildProgram")
}

pub fn get_build_log(driver: &dyn Driver, program: ProgramId, device: DeviceId) -> Result<String> {
    program.check()?;
    device.check()?;
    driver
        .program_build_log(program, device)
        .or_runtime("clGetProgramBuildInfo")
}

pub fn create_kernel(driver: &dyn Driver, program: ProgramId, name: &str) -> Result<KernelId> {
    program.check()?;
    check_non_empty("kernel name", name)?;
    driver.create_kernel(program, name).or_runtime("clCreateKernel")
}

pub fn release_program(driver: &dyn Driver, program: ProgramId) -> Result<()> {
    program.check()?;
    driver.release_program(program).or_runtime("clReleaseProgram")
}

pub fn release_kernel(driver: &dyn Driver, kernel: KernelId) -> Result<()> {
    kernel.check()?;
    driver.release_kernel(kernel).or_runtime("clReleaseKernel")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::create_context_for_device;
    use crate::driver::mock::{MockDevice, MockDriver, MockPlatform};
    use crate::status::Status;
    use crate::types::DeviceType;

    const VECTOR_ADD: &str = r#"
__kernel void vector_add(__global const float* a, __global const float* b, __global float* c) {
    int i = get_global_id(0);
    c[i] = a[i] + b[i];
}
"#;

    fn setup() -> (MockDriver, ContextId, DeviceId) {
        let driver = MockDriver::new().with_platform(
            MockPlatform::new("Sim", "Acme", "OpenCL 3.0")
                .with_device(MockDevice::new("gpu0", "Acme", DeviceType::GPU)),
        );
        let device = driver.device_handle(0, 0);
        let context = create_context_for_device(&driver, device).unwrap();
        (driver, context, device)
    }

    #[test]
    fn test_build_and_create_kernel() {
        let (driver, context, device) = setup();
        let program = create_from_source(&driver, context, VECTOR_ADD).unwrap();
        build_program(&driver, program, &[device], "-cl-fast-relaxed-math").unwrap();
        assert_eq!(get_build_log(&driver, program, device).unwrap(), "");

        let kernel = create_kernel(&driver, program, "vector_add").unwrap();
        release_kernel(&driver, kernel).unwrap();
        release_program(&driver, program).unwrap();
    }

    #[test]
    fn test_build_failure_keeps_log() {
        let (driver, context, device) = setup();
        let program =
            create_from_source(&driver, context, "#error missing semicolon\n__kernel void k() {}")
                .unwrap();
        let err = build_program(&driver, program, &[device], "").unwrap_err();
        assert_eq!(err.status(), Some(Status::BUILD_PROGRAM_FAILURE));
        assert!(err.to_string().contains("-11"));

        let log = get_build_log(&driver, program, device).unwrap();
        assert!(log.contains("missing semicolon"));
    }

    #[test]
    fn test_kernel_before_build() {
        let (driver, context, _) = setup();
        let program = create_from_source(&driver, context, VECTOR_ADD).unwrap();
        let err = create_kernel(&driver, program, "vector_add").unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_PROGRAM_EXECUTABLE));
    }

    #[test]
    fn test_unknown_kernel_name() {
        let (driver, context, device) = setup();
        let program = create_from_source(&driver, context, VECTOR_ADD).unwrap();
        build_program(&driver, program, &[device], "").unwrap();
        let err = create_kernel(&driver, program, "vector_mul").unwrap_err();
        assert_eq!(err.status(), Some(Status::INVALID_KERNEL_NAME));
    }

    #[test]
    fn test_invalid_arguments() {
        let (driver, context, device) = setup();
        driver.clear_calls();
        assert!(create_from_source(&driver, context, "").unwrap_err().is_invalid_argument());
        assert!(create_from_source(&driver, ContextId::null(), VECTOR_ADD)
            .unwrap_err()
            .is_invalid_argument());
        assert!(build_program(&driver, ProgramId::null(), &[device], "")
            .unwrap_err()
            .is_invalid_argument());
        assert!(create_kernel(&driver, ProgramId::null(), "k")
            .unwrap_err()
            .is_invalid_argument());
        assert!(get_build_log(&driver, ProgramId::null(), device)
            .unwrap_err()
            .is_invalid_argument());
        assert!(release_kernel(&driver, KernelId::null())
            .unwrap_err()
            .is_invalid_argument());
        assert!(driver.calls().is_empty());

        let program = create_from_source(&driver, context, VECTOR_ADD).unwrap();
        driver.clear_calls();
        assert!(build_program(&driver, program, &[], "").unwrap_err().is_invalid_argument());
        assert!(build_program(&driver, program, &[device], "-D X=\0")
            .unwrap_err()
            .is_invalid_argument());
        assert!(create_kernel(&driver, program, "").unwrap_err().is_invalid_argument());
        assert!(create_kernel(&driver, program, "vector\0add")
            .unwrap_err()
            .is_invalid_argument());
        assert!(driver.calls().is_empty());
    }
}
