use std::time::Duration;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: u32 = 5;
pub const DEFAULT_COUNT: u32 = 1;
pub const DEFAULT_INTERVAL_SECS: f64 = 1.0;
pub const DEFAULT_PACKET_SIZE: u32 = 56;
pub const DEFAULT_TTL: u32 = 64;

/// Extra time the ping process gets on top of its own per-packet wait
/// before it is killed.
const KILL_BUFFER_SECS: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    #[default]
    Ipv4,
    Ipv6,
    Auto,
}

/// Everything needed to describe one probe against one host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeOptions {
    pub host: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default = "default_interval")]
    pub interval_seconds: f64,
    #[serde(default = "default_packet_size")]
    pub packet_size_bytes: u32,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub ip_version: IpVersion,
    #[serde(default = "default_show_lost_packets")]
    pub show_lost_packets: bool,
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT_SECS
}

fn default_count() -> u32 {
    DEFAULT_COUNT
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

fn default_show_lost_packets() -> bool {
    true
}

impl ProbeOptions {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            count: DEFAULT_COUNT,
            interval_seconds: DEFAULT_INTERVAL_SECS,
            packet_size_bytes: DEFAULT_PACKET_SIZE,
            ttl: DEFAULT_TTL,
            ip_version: IpVersion::default(),
            show_lost_packets: default_show_lost_packets(),
        }
    }

    pub fn with_timeout(self, timeout_seconds: u32) -> Self {
        Self { timeout_seconds, ..self }
    }

    /// At least one echo request is always sent.
    pub fn with_count(self, count: u32) -> Self {
        Self { count: count.max(1), ..self }
    }

    pub fn with_interval(self, interval_seconds: f64) -> Self {
        Self { interval_seconds, ..self }
    }

    pub fn with_packet_size(self, packet_size_bytes: u32) -> Self {
        Self { packet_size_bytes, ..self }
    }

    pub fn with_ttl(self, ttl: u32) -> Self {
        Self { ttl, ..self }
    }

    pub fn with_ip_version(self, ip_version: IpVersion) -> Self {
        Self { ip_version, ..self }
    }

    pub fn with_show_lost_packets(self, show_lost_packets: bool) -> Self {
        Self { show_lost_packets, ..self }
    }

    /// Hard ceiling handed to the process executor.
    pub fn kill_after(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds) + KILL_BUFFER_SECS)
    }

    pub fn has_custom_interval(&self) -> bool {
        self.interval_seconds != DEFAULT_INTERVAL_SECS
    }

    pub fn has_custom_packet_size(&self) -> bool {
        self.packet_size_bytes != DEFAULT_PACKET_SIZE
    }

    pub fn has_custom_ttl(&self) -> bool {
        self.ttl != DEFAULT_TTL
    }
}
