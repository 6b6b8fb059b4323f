//! Host reachability checks driven by the system `ping` binary.
//!
//! [`PingExecutor`] builds a platform-correct command line from
//! [`ProbeOptions`], runs it once through a [`ProcessExecutor`], and turns the
//! captured text into a [`PingResult`]. A failing probe is still a result,
//! carrying a [`PingError`] and 100% packet loss.

pub mod command;
pub mod config;
pub mod error;
pub mod options;
pub mod parser;
pub mod ping;
pub mod ping_executor;
pub mod platform;
pub mod process;

pub use command::build_command;
pub use config::ProbeConfig;
pub use error::{ConfigError, ExecutionError, PingError};
pub use options::{IpVersion, ProbeOptions};
pub use ping::{PingResult, PingResultLine, ResultOptions, TimingStatistics};
pub use ping_executor::PingExecutor;
pub use platform::PlatformFamily;
pub use process::{ProcessExecutor, ProcessOutput, SystemExecutor};
