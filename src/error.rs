use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a probe failed, inferred from whatever the ping binary printed.
///
/// Classification is heuristic. Unfamiliar dialects or locales fall through
/// to [`PingError::UnknownError`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PingError {
    #[error("hostname not found")]
    HostnameNotFound,

    #[error("host unreachable")]
    HostUnreachable,

    #[error("permission denied")]
    PermissionDenied,

    #[error("timed out")]
    Timeout,

    #[error("unknown error")]
    UnknownError,
}

const CLASSIFICATION_RULES: &[(&[&str], PingError)] = &[
    (&["unknown host", "name or service not known"], PingError::HostnameNotFound),
    (&["no route to host", "host unreachable"], PingError::HostUnreachable),
    (&["permission denied"], PingError::PermissionDenied),
    (&["timeout", "timed out"], PingError::Timeout),
];

impl PingError {
    /// Maps failure output to an error kind; the first matching rule wins.
    pub fn classify(output: &str) -> Self {
        let output = output.to_lowercase();

        CLASSIFICATION_RULES
            .iter()
            .find(|(needles, _)| needles.iter().any(|needle| output.contains(needle)))
            .map(|(_, error)| *error)
            .unwrap_or(PingError::UnknownError)
    }
}

/// Failures of the process layer itself, before any ping output exists.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("empty command")]
    EmptyCommand,

    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start process runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not find config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_each_known_failure() {
        let cases = [
            ("ping: unknown host example.invalid", PingError::HostnameNotFound),
            ("ping: example.invalid: Name or service not known", PingError::HostnameNotFound),
            ("From 10.0.0.1 icmp_seq=1 Destination Host Unreachable", PingError::HostUnreachable),
            ("ping: sendto: No route to host", PingError::HostUnreachable),
            ("ping: socket: Permission denied", PingError::PermissionDenied),
            ("Request timeout for icmp_seq 0", PingError::Timeout),
            ("ping: timed out after 7s", PingError::Timeout),
            ("something odd happened", PingError::UnknownError),
            ("", PingError::UnknownError),
        ];

        for (output, expected) in cases {
            assert_eq!(PingError::classify(output), expected, "{output}");
        }
    }

    #[test]
    fn earlier_rules_win() {
        let output = "unknown host, request timed out";
        assert_eq!(PingError::classify(output), PingError::HostnameNotFound);

        let output = "Permission denied while waiting: timeout";
        assert_eq!(PingError::classify(output), PingError::PermissionDenied);
    }

    #[test]
    fn serializes_as_camel_case_identifiers() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&PingError::HostnameNotFound)?, r#""hostnameNotFound""#);
        assert_eq!(serde_json::to_string(&PingError::UnknownError)?, r#""unknownError""#);
        assert_eq!(serde_json::from_str::<PingError>(r#""timeout""#)?, PingError::Timeout);
        Ok(())
    }
}
