use crate::options::ProbeOptions;
use crate::platform::PlatformFamily;

pub const PING_PROGRAM: &str = "ping";

/// Builds the argument vector for one ping invocation.
///
/// Tokens come out as `ping -c <count> -W <timeout> [-i <interval>]
/// [-s <size>] [-t <ttl>] [-O] <host>`. Optional flags are only emitted when
/// the option differs from its default. Nothing is quoted since the result is
/// handed to the executor as discrete arguments, never through a shell.
pub fn build_command(options: &ProbeOptions, platform: PlatformFamily) -> Vec<String> {
    let mut command = vec![
        PING_PROGRAM.to_string(),
        "-c".to_string(),
        options.count.to_string(),
        "-W".to_string(),
        platform.timeout_argument(options.timeout_seconds),
    ];

    if options.has_custom_interval() {
        command.push("-i".to_string());
        command.push(options.interval_seconds.to_string());
    }

    if options.has_custom_packet_size() {
        command.push("-s".to_string());
        command.push(options.packet_size_bytes.to_string());
    }

    if options.has_custom_ttl() {
        command.push("-t".to_string());
        command.push(options.ttl.to_string());
    }

    // BSD ping has no equivalent, so the request is dropped there.
    if options.show_lost_packets && platform.supports_lost_packet_flag() {
        command.push("-O".to_string());
    }

    command.push(options.host.clone());
    command
}
