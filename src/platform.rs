/// The two ping dialects this crate knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformFamily {
    /// iputils ping: `-W` in whole seconds, supports `-O`.
    Linux,
    /// BSD/macOS ping: `-W` in milliseconds, no `-O`.
    Darwin,
}

impl PlatformFamily {
    /// Family of the ping binary on the machine this crate was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            PlatformFamily::Darwin
        } else {
            PlatformFamily::Linux
        }
    }

    pub fn is_alternate_platform_family(self) -> bool {
        matches!(self, PlatformFamily::Darwin)
    }

    /// Renders the per-packet wait value in the unit the dialect expects.
    pub fn timeout_argument(self, timeout_seconds: u32) -> String {
        if self.is_alternate_platform_family() {
            (u64::from(timeout_seconds) * 1000).to_string()
        } else {
            timeout_seconds.to_string()
        }
    }

    pub fn supports_lost_packet_flag(self) -> bool {
        !self.is_alternate_platform_family()
    }
}

impl Default for PlatformFamily {
    fn default() -> Self {
        Self::current()
    }
}
