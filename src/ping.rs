use std::fmt;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use crate::error::PingError;
use crate::options::{
    DEFAULT_INTERVAL_SECS, DEFAULT_PACKET_SIZE, DEFAULT_TIMEOUT_SECS, DEFAULT_TTL, IpVersion,
    ProbeOptions,
};
use crate::parser;

/// One echo-reply line of ping output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StructuredLine")]
pub struct PingResultLine {
    #[serde(rename = "line")]
    raw_line: String,
    time_in_ms: f64,
}

#[derive(Deserialize)]
struct StructuredLine {
    line: String,
    #[serde(default)]
    time_in_ms: Option<f64>,
}

impl From<StructuredLine> for PingResultLine {
    fn from(structured: StructuredLine) -> Self {
        let time_in_ms = structured
            .time_in_ms
            .unwrap_or_else(|| parser::parse_time(&structured.line).unwrap_or(0.0));

        Self {
            raw_line: structured.line,
            time_in_ms,
        }
    }
}

impl PingResultLine {
    pub fn new(raw_line: impl Into<String>, time_in_ms: f64) -> Self {
        Self {
            raw_line: raw_line.into(),
            time_in_ms,
        }
    }

    pub fn from_line(line: &str) -> Self {
        Self::new(line.trim(), parser::parse_time(line).unwrap_or(0.0))
    }

    pub fn raw_line(&self) -> &str {
        &self.raw_line
    }

    pub fn time_in_ms(&self) -> f64 {
        self.time_in_ms
    }
}

impl fmt::Display for PingResultLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_line)
    }
}

/// Figures from the `min/avg/max/stddev` summary line.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingStatistics {
    #[serde(default)]
    pub minimum_time_in_ms: Option<f64>,
    #[serde(default)]
    pub maximum_time_in_ms: Option<f64>,
    #[serde(default)]
    pub average_time_in_ms: Option<f64>,
    #[serde(default)]
    pub standard_deviation_time_in_ms: Option<f64>,
}

/// The options a result was produced with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultOptions {
    #[serde(default = "default_timeout")]
    pub timeout_in_seconds: u32,
    #[serde(default = "default_interval")]
    pub interval: f64,
    #[serde(default = "default_packet_size")]
    pub packet_size_in_bytes: u32,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub ip_version: IpVersion,
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT_SECS
}

fn default_interval() -> f64 {
    DEFAULT_INTERVAL_SECS
}

fn default_packet_size() -> u32 {
    DEFAULT_PACKET_SIZE
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

impl Default for ResultOptions {
    fn default() -> Self {
        Self {
            timeout_in_seconds: DEFAULT_TIMEOUT_SECS,
            interval: DEFAULT_INTERVAL_SECS,
            packet_size_in_bytes: DEFAULT_PACKET_SIZE,
            ttl: DEFAULT_TTL,
            ip_version: IpVersion::default(),
        }
    }
}

impl From<&ProbeOptions> for ResultOptions {
    fn from(options: &ProbeOptions) -> Self {
        Self {
            timeout_in_seconds: options.timeout_seconds,
            interval: options.interval_seconds,
            packet_size_in_bytes: options.packet_size_bytes,
            ttl: options.ttl,
            ip_version: options.ip_version,
        }
    }
}

/// Outcome of a single probe.
///
/// Built once, either from live ping output or from its structured form, and
/// never mutated afterwards. Field order here is the structured layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PingResult {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<PingError>,
    #[serde(default)]
    host: String,
    #[serde(default, deserialize_with = "deserialize_percentage")]
    packet_loss_percentage: u8,
    #[serde(default)]
    packets_transmitted: Option<u32>,
    #[serde(default)]
    packets_received: Option<u32>,
    #[serde(default)]
    options: ResultOptions,
    #[serde(default)]
    timings: TimingStatistics,
    #[serde(default)]
    raw_output: String,
    #[serde(default)]
    lines: Vec<PingResultLine>,
}

fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let percentage = u64::deserialize(deserializer)?;
    Ok(percentage.min(100) as u8)
}

impl PingResult {
    /// Assembles a result from the captured output of one ping run.
    ///
    /// `output` is stdout split into lines with any stderr lines appended.
    /// A non-zero `exit_code` takes the failure path: the error is classified
    /// from the text and no statistics are parsed.
    pub fn from_ping_output<S: AsRef<str>>(
        output: &[S],
        exit_code: i32,
        options: &ProbeOptions,
    ) -> Self {
        let raw_output = output
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join("\n");

        let mut result = Self {
            success: false,
            error: None,
            host: options.host.clone(),
            packet_loss_percentage: 100,
            packets_transmitted: None,
            packets_received: None,
            options: ResultOptions::from(options),
            timings: TimingStatistics::default(),
            raw_output,
            lines: Vec::new(),
        };

        if exit_code != 0 {
            let error = PingError::classify(&result.raw_output);
            log::warn!("ping {} exited with {exit_code}: {error}", options.host);
            result.error = Some(error);
            return result;
        }

        let parsed = parser::parse_success(output);
        let packet_loss_percentage = parsed.packet_loss_percentage.unwrap_or(0);

        result.success = packet_loss_percentage < 100;
        result.packet_loss_percentage = packet_loss_percentage;
        result.packets_transmitted = parsed.packets.map(|packets| packets.transmitted);
        result.packets_received = parsed.packets.map(|packets| packets.received);
        result.timings = parsed.timings;
        result.lines = parsed.lines;
        result
    }

    pub fn to_structured(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    pub fn from_structured(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<PingError> {
        self.error
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn packet_loss_percentage(&self) -> u8 {
        self.packet_loss_percentage
    }

    pub fn packets_transmitted(&self) -> Option<u32> {
        self.packets_transmitted
    }

    pub fn packets_received(&self) -> Option<u32> {
        self.packets_received
    }

    pub fn timings(&self) -> &TimingStatistics {
        &self.timings
    }

    pub fn minimum_time_in_ms(&self) -> Option<f64> {
        self.timings.minimum_time_in_ms
    }

    pub fn maximum_time_in_ms(&self) -> Option<f64> {
        self.timings.maximum_time_in_ms
    }

    pub fn average_time_in_ms(&self) -> Option<f64> {
        self.timings.average_time_in_ms
    }

    pub fn standard_deviation_time_in_ms(&self) -> Option<f64> {
        self.timings.standard_deviation_time_in_ms
    }

    /// Parsed summary average when there is one, otherwise the mean of the
    /// reply lines, otherwise 0.
    pub fn average_response_time_in_ms(&self) -> f64 {
        if let Some(average) = self.timings.average_time_in_ms {
            return average;
        }

        if self.lines.is_empty() {
            return 0.0;
        }

        let total: f64 = self.lines.iter().map(PingResultLine::time_in_ms).sum();
        total / self.lines.len() as f64
    }

    pub fn options(&self) -> &ResultOptions {
        &self.options
    }

    pub fn timeout_in_seconds(&self) -> u32 {
        self.options.timeout_in_seconds
    }

    pub fn interval_in_seconds(&self) -> f64 {
        self.options.interval
    }

    pub fn packet_size_in_bytes(&self) -> u32 {
        self.options.packet_size_in_bytes
    }

    pub fn ttl(&self) -> u32 {
        self.options.ttl
    }

    pub fn ip_version(&self) -> IpVersion {
        self.options.ip_version
    }

    pub fn lines(&self) -> &[PingResultLine] {
        &self.lines
    }

    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }
}

impl fmt::Display for PingResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_output)
    }
}
