//! clprobe
//!
//! Prints every OpenCL platform on the host together with its devices.
//!
//! # Usage
//!
//! ```bash
//! # Full transcript
//! clprobe
//!
//! # Extended attributes, GPUs only in the detailed section
//! clprobe --verbose --device-type gpu
//!
//! # Machine-readable inventory
//! clprobe --json
//! ```
//!
//! Set `RUST_LOG=debug` to see the enumeration steps and `RUST_LOG=trace` to
//! see every native call.

use clap::Parser;
use clprobe_core::config::{OutputFormat, ReportConfig};
use clprobe_core::driver::{self, Driver};
use clprobe_core::report::{self, Outcome, ReportError};
use clprobe_core::types::DeviceType;
use clprobe_core::ClError;
use log::debug;
use std::io::{self, Write};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "clprobe", version, about = "Print OpenCL platform and device information")]
struct Cli {
    /// Write the inventory as JSON instead of the console transcript
    #[arg(long)]
    json: bool,

    /// Also query profile, extensions, clocks and memory limits
    #[arg(short, long)]
    verbose: bool,

    /// Device categories listed in the detailed section
    #[arg(long, value_name = "TYPE", default_value = "all")]
    device_type: DeviceType,
}

impl Cli {
    fn config(&self) -> ReportConfig {
        ReportConfig::builder()
            .format(if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            })
            .verbose(self.verbose)
            .device_type(self.device_type)
            .build()
    }
}

fn error_message(error: &ReportError) -> String {
    match error {
        ReportError::Cl(e @ ClError::InvalidArgument { .. }) => format!("Invalid argument error: {e}"),
        ReportError::Cl(e @ ClError::Runtime { .. }) => format!("OpenCL runtime error: {e}"),
        ReportError::Io(e) => format!("Unexpected error: {e}"),
        ReportError::Json(e) => format!("Unexpected error: {e}"),
    }
}

/// Runs the report and returns the process exit status.
fn run(driver: &dyn Driver, config: &ReportConfig, out: &mut dyn Write, err: &mut dyn Write) -> u8 {
    match report::run(driver, config, out, err) {
        Ok(Outcome::Completed) => 0,
        Ok(Outcome::NoPlatforms) => 1,
        Err(e) => {
            let _ = writeln!(err, "{}", error_message(&e));
            1
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.config();
    let driver = driver::system();
    debug!("using {} driver with {:?}", driver.name(), config);

    let stdout = io::stdout();
    let stderr = io::stderr();
    ExitCode::from(run(driver.as_ref(), &config, &mut stdout.lock(), &mut stderr.lock()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clprobe_core::driver::mock::{MockDevice, MockDriver, MockPlatform};
    use clprobe_core::Status;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_arguments() {
        let cli = Cli::try_parse_from(["clprobe"]).unwrap();
        assert_eq!(cli.config(), ReportConfig::default());
    }

    #[test]
    fn test_flags_map_onto_config() {
        let cli = Cli::try_parse_from(["clprobe", "--json", "-v", "--device-type", "GPU"]).unwrap();
        let config = cli.config();
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.verbose);
        assert_eq!(config.device_type, DeviceType::GPU);
    }

    #[test]
    fn test_unknown_device_type_rejected() {
        assert!(Cli::try_parse_from(["clprobe", "--device-type", "fpga"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let mut out = Vec::new();
        let mut err = Vec::new();

        let empty = MockDriver::new();
        assert_eq!(run(&empty, &ReportConfig::default(), &mut out, &mut err), 1);

        let populated = MockDriver::new().with_platform(
            MockPlatform::new("Sim", "Acme", "OpenCL 3.0")
                .with_device(MockDevice::new("gpu0", "Acme", DeviceType::GPU)),
        );
        assert_eq!(run(&populated, &ReportConfig::default(), &mut out, &mut err), 0);
    }

    #[test]
    fn test_runtime_error_message() {
        let driver = MockDriver::new().fail_call("clGetPlatformIDs", Status::OUT_OF_HOST_MEMORY);
        let mut out = Vec::new();
        let mut err = Vec::new();
        assert_eq!(run(&driver, &ReportConfig::default(), &mut out, &mut err), 1);
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "OpenCL runtime error: clGetPlatformIDs failed with error code -6 (CL_OUT_OF_HOST_MEMORY)\n"
        );
    }

    #[test]
    fn test_error_message_kinds() {
        let invalid = ReportError::Cl(ClError::null_handle("platform"));
        assert_eq!(
            error_message(&invalid),
            "Invalid argument error: Invalid argument: platform handle is null"
        );
        let io = ReportError::Io(io::Error::other("broken pipe"));
        assert!(error_message(&io).starts_with("Unexpected error: "));
    }
}
