use std::sync::{Arc, mpsc};
use std::thread;
use crate::command::build_command;
use crate::error::ExecutionError;
use crate::options::ProbeOptions;
use crate::ping::PingResult;
use crate::platform::PlatformFamily;
use crate::process::{ProcessExecutor, SystemExecutor};

/// Runs one probe: build the command, execute it once, interpret the output.
#[derive(Clone)]
pub struct PingExecutor {
    options: ProbeOptions,
    platform: PlatformFamily,
    executor: Arc<dyn ProcessExecutor>,
}

impl PingExecutor {
    pub fn new(options: ProbeOptions) -> Self {
        Self {
            options,
            platform: PlatformFamily::current(),
            executor: Arc::new(SystemExecutor),
        }
    }

    pub fn with_platform(self, platform: PlatformFamily) -> Self {
        Self { platform, ..self }
    }

    pub fn with_executor(self, executor: Arc<dyn ProcessExecutor>) -> Self {
        Self { executor, ..self }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    pub fn platform(&self) -> PlatformFamily {
        self.platform
    }

    pub fn command(&self) -> Vec<String> {
        build_command(&self.options, self.platform)
    }

    /// Executes the probe. Failing pings come back as unsuccessful results;
    /// only problems starting the process itself are errors.
    pub fn run(&self) -> Result<PingResult, ExecutionError> {
        let command = self.command();
        log::debug!("running {}", command.join(" "));

        let output = self.executor.execute(&command, self.options.kill_after())?;
        let lines = output.combined_lines();

        Ok(PingResult::from_ping_output(&lines, output.exit_code, &self.options))
    }

    /// Runs the probe on its own thread and reports through `sender`.
    pub fn spawn(
        self,
        sender: mpsc::Sender<Result<PingResult, ExecutionError>>,
    ) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let result = self.run();
            let _ = sender.send(result);
        })
    }
}

impl std::fmt::Debug for PingExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PingExecutor")
            .field("options", &self.options)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::process::ProcessOutput;

    struct Canned(ProcessOutput);

    impl ProcessExecutor for Canned {
        fn execute(
            &self,
            _argv: &[String],
            _kill_after: Duration,
        ) -> Result<ProcessOutput, ExecutionError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn command_follows_configured_platform() {
        let options = ProbeOptions::new("example.com").with_show_lost_packets(false);
        let executor = PingExecutor::new(options).with_platform(PlatformFamily::Darwin);
        assert_eq!(executor.command(), ["ping", "-c", "1", "-W", "5000", "example.com"]);
    }

    #[test]
    fn stderr_reaches_classification() -> Result<(), ExecutionError> {
        let canned = Canned(ProcessOutput {
            exit_code: 2,
            stdout: String::new(),
            stderr: "ping: socket: Operation not permitted; Permission denied".to_string(),
        });
        let result = PingExecutor::new(ProbeOptions::new("10.0.0.1"))
            .with_executor(Arc::new(canned))
            .run()?;

        assert_eq!(result.error(), Some(crate::error::PingError::PermissionDenied));
        assert!(result.raw_output().ends_with("Permission denied"));
        Ok(())
    }
}
