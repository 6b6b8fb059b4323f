//! Extraction of reply lines and summary statistics from ping output.
//!
//! Every concern is its own function so the fallback order stays visible:
//! packet counts first, then the timing summary, and only when no counts were
//! found, the bare `N% packet loss` text.

use std::sync::OnceLock;
use regex::Regex;
use crate::ping::{PingResultLine, TimingStatistics};

fn response_time_regex() -> &'static Regex {
    static RESPONSE_TIME_RE: OnceLock<Regex> = OnceLock::new();
    RESPONSE_TIME_RE.get_or_init(|| Regex::new(r"(?i)time[<=]([0-9.]+)\s*ms").expect("valid regex"))
}

fn packet_count_regex() -> &'static Regex {
    static PACKET_COUNT_RE: OnceLock<Regex> = OnceLock::new();
    PACKET_COUNT_RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s+packets?\s+transmitted,\s+(\d+)\s+(?:packets?\s+)?received")
            .expect("valid regex")
    })
}

fn timing_summary_regex() -> &'static Regex {
    static TIMING_SUMMARY_RE: OnceLock<Regex> = OnceLock::new();
    TIMING_SUMMARY_RE.get_or_init(|| {
        Regex::new(
            r"(?i)min/avg/max/(?:stddev|mdev)\s*=\s*([0-9.]+)/([0-9.]+)/([0-9.]+)/([0-9.]+)\s*ms",
        )
        .expect("valid regex")
    })
}

fn packet_loss_regexes() -> &'static [Regex; 2] {
    static PACKET_LOSS_RES: OnceLock<[Regex; 2]> = OnceLock::new();
    PACKET_LOSS_RES.get_or_init(|| {
        [
            Regex::new(r"(?i)(\d+)%\s*packet\s*loss").expect("valid regex"),
            Regex::new(r"(?i)(\d+)%\s*loss").expect("valid regex"),
        ]
    })
}

/// Sent/received counts from the `N packets transmitted, M received` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketStatistics {
    pub transmitted: u32,
    pub received: u32,
}

impl PacketStatistics {
    pub fn loss_percentage(&self) -> u8 {
        calculate_packet_loss_percentage(self.transmitted, self.received)
    }
}

/// Everything pulled out of a successful run's output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedOutput {
    pub lines: Vec<PingResultLine>,
    pub packets: Option<PacketStatistics>,
    pub packet_loss_percentage: Option<u8>,
    pub timings: TimingStatistics,
}

/// Reads the longest number at the start of `text`, so `1.2.3` yields 1.2.
/// Yields `None` when that prefix holds no digits.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = text
        .char_indices()
        .find(|&(_, c)| match c {
            '0'..='9' => false,
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            _ => true,
        })
        .map_or(text.len(), |(index, _)| index);

    let number = &text[..end];
    if !number.bytes().any(|byte| byte.is_ascii_digit()) {
        return None;
    }
    number.trim_end_matches('.').parse().ok()
}

/// Round-trip time of a reply line, if the line carries one.
pub fn parse_time(line: &str) -> Option<f64> {
    response_time_regex()
        .captures(line)
        .and_then(|caps| parse_leading_float(&caps[1]))
}

pub fn is_ping_response_line(line: &str) -> bool {
    response_time_regex().is_match(line)
}

/// Keeps only the echo-reply lines, trimmed, in output order.
pub fn parse_ping_lines<S: AsRef<str>>(output: &[S]) -> Vec<PingResultLine> {
    output
        .iter()
        .map(|line| line.as_ref().trim())
        .filter(|line| !line.is_empty())
        .filter(|line| is_ping_response_line(line))
        .map(PingResultLine::from_line)
        .collect()
}

pub fn extract_packet_statistics(output: &str) -> Option<PacketStatistics> {
    let caps = packet_count_regex().captures(output)?;

    Some(PacketStatistics {
        transmitted: caps[1].parse().ok()?,
        received: caps[2].parse().ok()?,
    })
}

/// Percentage of requests without a reply, rounded half away from zero.
///
/// Nothing transmitted counts as total loss. Duplicate replies can push
/// `received` above `transmitted`; that is reported as no loss.
pub fn calculate_packet_loss_percentage(transmitted: u32, received: u32) -> u8 {
    if transmitted == 0 {
        return 100;
    }

    let lost = f64::from(transmitted) - f64::from(received);
    let percentage = (lost / f64::from(transmitted)) * 100.0;

    percentage.round().clamp(0.0, 100.0) as u8
}

/// Reads the `min/avg/max/stddev = a/b/c/d ms` summary.
///
/// The second figure is bound to the average and the third to the maximum.
pub fn extract_timing_statistics(output: &str) -> TimingStatistics {
    let Some(caps) = timing_summary_regex().captures(output) else {
        return TimingStatistics::default();
    };

    let figure = |index: usize| parse_leading_float(&caps[index]);

    TimingStatistics {
        minimum_time_in_ms: figure(1),
        average_time_in_ms: figure(2),
        maximum_time_in_ms: figure(3),
        standard_deviation_time_in_ms: figure(4),
    }
}

/// Loss percentage straight from the text, for dialects without counts.
pub fn extract_packet_loss_fallback(output: &str) -> Option<u8> {
    packet_loss_regexes().iter().find_map(|regex| {
        let caps = regex.captures(output)?;
        let percentage = caps[1].parse::<u64>().ok()?;
        Some(percentage.min(100) as u8)
    })
}

/// Parses the output of a ping run that exited with status 0.
///
/// Reply lines come from the individual lines; the aggregate extractions
/// run over the joined text.
pub fn parse_success<S: AsRef<str>>(output: &[S]) -> ParsedOutput {
    let joined = output
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join("\n");

    let lines = parse_ping_lines(output);
    let packets = extract_packet_statistics(&joined);
    let timings = extract_timing_statistics(&joined);
    let packet_loss_percentage = match packets {
        Some(packets) => Some(packets.loss_percentage()),
        None => extract_packet_loss_fallback(&joined),
    };

    log::debug!(
        "parsed {} reply lines, packets={:?}, loss={:?}",
        lines.len(),
        packets,
        packet_loss_percentage
    );

    ParsedOutput {
        lines,
        packets,
        packet_loss_percentage,
        timings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_reply_lines() {
        assert!(is_ping_response_line("64 bytes from 8.8.8.8: icmp_seq=1 ttl=117 time=15.2 ms"));
        assert!(is_ping_response_line("64 bytes from ::1: icmp_seq=1 ttl=64 time<1ms"));
        assert!(is_ping_response_line("reply TIME=3 MS"));
        assert!(!is_ping_response_line("PING 8.8.8.8 (8.8.8.8): 56 data bytes"));
        assert!(!is_ping_response_line("Request timeout for icmp_seq 0"));
    }

    #[test]
    fn parses_reply_times() {
        assert_eq!(parse_time("icmp_seq=1 ttl=117 time=15.2 ms"), Some(15.2));
        assert_eq!(parse_time("icmp_seq=1 ttl=64 time<1ms"), Some(1.0));
        assert_eq!(parse_time("no timing here"), None);
    }

    #[test]
    fn malformed_times_keep_their_leading_number() {
        assert_eq!(parse_time("icmp_seq=1 time=1.2.3 ms"), Some(1.2));
        assert_eq!(PingResultLine::from_line("icmp_seq=1 time=1.2.3 ms").time_in_ms(), 1.2);
        assert_eq!(parse_leading_float("7."), Some(7.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("..4"), None);
    }

    #[test]
    fn malformed_summary_figures_keep_their_leading_number() {
        let timings = extract_timing_statistics("min/avg/max/mdev = 1.0.1/2.5/3.25.9/0.4 ms");
        assert_eq!(timings.minimum_time_in_ms, Some(1.0));
        assert_eq!(timings.average_time_in_ms, Some(2.5));
        assert_eq!(timings.maximum_time_in_ms, Some(3.25));
        assert_eq!(timings.standard_deviation_time_in_ms, Some(0.4));
    }

    #[test]
    fn skips_blank_and_non_reply_lines() {
        let output = [
            "PING 8.8.8.8 (8.8.8.8): 56 data bytes",
            "   ",
            "  64 bytes from 8.8.8.8: icmp_seq=0 ttl=117 time=8.5 ms  ",
            "",
            "Request timeout for icmp_seq 1",
        ];
        let lines = parse_ping_lines(&output);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].raw_line(), "64 bytes from 8.8.8.8: icmp_seq=0 ttl=117 time=8.5 ms");
        assert_eq!(lines[0].time_in_ms(), 8.5);
    }

    #[test]
    fn extracts_linux_and_bsd_packet_counts() {
        let linux = "3 packets transmitted, 2 received, 33% packet loss, time 2003ms";
        assert_eq!(
            extract_packet_statistics(linux),
            Some(PacketStatistics { transmitted: 3, received: 2 })
        );

        let bsd = "4 packets transmitted, 4 packets received, 0.0% packet loss";
        assert_eq!(
            extract_packet_statistics(bsd),
            Some(PacketStatistics { transmitted: 4, received: 4 })
        );

        assert_eq!(extract_packet_statistics("nothing to see"), None);
    }

    #[test]
    fn loss_percentage_rounds_half_away_from_zero() {
        assert_eq!(calculate_packet_loss_percentage(3, 2), 33);
        assert_eq!(calculate_packet_loss_percentage(3, 1), 67);
        assert_eq!(calculate_packet_loss_percentage(8, 7), 13);
        assert_eq!(calculate_packet_loss_percentage(4, 4), 0);
        assert_eq!(calculate_packet_loss_percentage(4, 0), 100);
    }

    #[test]
    fn zero_transmitted_is_total_loss() {
        assert_eq!(calculate_packet_loss_percentage(0, 0), 100);
    }

    #[test]
    fn duplicates_do_not_produce_negative_loss() {
        assert_eq!(calculate_packet_loss_percentage(2, 3), 0);
    }

    #[test]
    fn timing_summary_binds_second_figure_to_average() {
        let timings =
            extract_timing_statistics("round-trip min/avg/max/stddev = 100.0/50.0/200.0/50.0 ms");
        assert_eq!(timings.minimum_time_in_ms, Some(100.0));
        assert_eq!(timings.average_time_in_ms, Some(50.0));
        assert_eq!(timings.maximum_time_in_ms, Some(200.0));
        assert_eq!(timings.standard_deviation_time_in_ms, Some(50.0));
    }

    #[test]
    fn timing_summary_accepts_mdev() {
        let timings =
            extract_timing_statistics("rtt min/avg/max/mdev = 0.045/0.061/0.082/0.015 ms");
        assert_eq!(timings.minimum_time_in_ms, Some(0.045));
        assert_eq!(timings.standard_deviation_time_in_ms, Some(0.015));
    }

    #[test]
    fn missing_timing_summary_leaves_everything_unset() {
        assert_eq!(extract_timing_statistics("3 packets transmitted"), TimingStatistics::default());
    }

    #[test]
    fn fallback_prefers_packet_loss_wording() {
        assert_eq!(extract_packet_loss_fallback("25% loss then 50% packet loss"), Some(50));
        assert_eq!(extract_packet_loss_fallback("sent 4, 75% loss"), Some(75));
        assert_eq!(extract_packet_loss_fallback("no figures"), None);
        assert_eq!(extract_packet_loss_fallback("250% packet loss"), Some(100));
    }

    #[test]
    fn counts_take_precedence_over_loss_text() {
        let output = ["4 packets transmitted, 3 received, 99% packet loss"];
        let parsed = parse_success(&output);
        assert_eq!(parsed.packet_loss_percentage, Some(25));
    }

    #[test]
    fn loss_text_used_when_counts_missing() {
        let output = ["64 bytes: time=1.0 ms", "50% packet loss"];
        let parsed = parse_success(&output);
        assert_eq!(parsed.packets, None);
        assert_eq!(parsed.packet_loss_percentage, Some(50));
        assert_eq!(parsed.lines.len(), 1);
    }
}
