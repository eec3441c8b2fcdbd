//! Normalization of Kubernetes resource quantities.
//!
//! The metrics API reports CPU in nanocores and memory in whatever unit the
//! kubelet picked, while GameServer specs carry human-written limits such as
//! `500m` or `2Gi`. The helpers below bring both sides to a canonical integer
//! form (millicores, bytes), compute utilization and render values for display.

use tracing::debug;

const KIB: i64 = 1024;
const MIB: i64 = 1024 * KIB;
const GIB: i64 = 1024 * MIB;

/// Memory suffixes ordered so that two-letter binary suffixes are tried first.
const MEMORY_SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1024.0 * 1024.0),
    ("Gi", 1024.0 * 1024.0 * 1024.0),
    ("Ti", 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Pi", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("Ei", 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0 * 1024.0),
    ("k", 1e3),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Parse a CPU quantity (`"2"`, `"1.5"`, `"287m"`, `"250u"`, `"2001669174n"`) into millicores.
///
/// Fractions of a millicore are truncated. Empty or unparseable input yields `0`.
pub fn parse_cpu_millicores(cpu: &str) -> i64 {
    let cpu = cpu.trim();
    if cpu.is_empty() {
        return 0;
    }

    let parsed = if let Some(n) = cpu.strip_suffix('n') {
        parse_number(n).map(|nanos| nanos / 1_000_000.0)
    } else if let Some(n) = cpu.strip_suffix('u') {
        parse_number(n).map(|micros| micros / 1_000.0)
    } else if let Some(n) = cpu.strip_suffix('m') {
        parse_number(n)
    } else {
        parse_number(cpu).map(|cores| cores * 1000.0)
    };

    match parsed {
        Some(value) => {
            let millicores = value as i64;
            debug!(input = cpu, millicores, "parsed cpu quantity");
            millicores
        }
        None => {
            debug!(input = cpu, "unparseable cpu quantity");
            0
        }
    }
}

/// Parse a memory quantity (`"54Mi"`, `"2Gi"`, `"1G"`, `"1048576"`) into bytes.
///
/// Empty or unparseable input yields `0`.
pub fn parse_memory_bytes(memory: &str) -> i64 {
    let memory = memory.trim();
    if memory.is_empty() {
        return 0;
    }

    let (number, multiplier) = MEMORY_SUFFIXES
        .iter()
        .find_map(|(suffix, multiplier)| {
            memory
                .strip_suffix(suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((memory, 1.0));

    parse_number(number)
        .map(|value| (value * multiplier) as i64)
        .unwrap_or(0)
}

/// Utilization of `current` against `configured`, in percent.
///
/// Not capped at 100: burstable pods may exceed their configured amount.
pub fn cpu_percentage(current: &str, configured: &str) -> f64 {
    let current_millicores = parse_cpu_millicores(current);
    let configured_millicores = parse_cpu_millicores(configured);
    debug!(
        current,
        current_millicores, configured, configured_millicores, "computing cpu utilization"
    );
    ratio_percent(current_millicores, configured_millicores)
}

/// Memory utilization of `current` against `configured`, in percent.
pub fn memory_percentage(current: &str, configured: &str) -> f64 {
    ratio_percent(parse_memory_bytes(current), parse_memory_bytes(configured))
}

/// Render a CPU quantity for display: millicores below one core, cores otherwise.
pub fn format_cpu(cpu: &str) -> String {
    let cpu = cpu.trim();
    if cpu.is_empty() {
        return "0m".into();
    }

    if let Some(nanos) = cpu.strip_suffix('n') {
        if let Ok(value) = nanos.parse::<i64>() {
            return format!("{}m", value / 1_000_000);
        }
    }

    if cpu.ends_with('m') {
        return cpu.to_string();
    }

    match cpu.parse::<f64>() {
        Ok(cores) if cores >= 1.0 => format!("{cores:.1}"),
        Ok(cores) => format!("{:.0}m", cores * 1000.0),
        Err(_) => cpu.to_string(),
    }
}

/// Render a memory quantity in the largest binary unit it reaches.
pub fn format_memory(memory: &str) -> String {
    let bytes = parse_memory_bytes(memory);
    if bytes == 0 {
        return "0Mi".into();
    }

    if bytes >= GIB {
        format!("{:.1}Gi", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.0}Mi", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.0}Ki", bytes as f64 / KIB as f64)
    } else {
        bytes.to_string()
    }
}

fn ratio_percent(current: i64, configured: i64) -> f64 {
    if configured == 0 {
        return 0.0;
    }
    current as f64 / configured as f64 * 100.0
}

fn parse_number(number: &str) -> Option<f64> {
    let value = number.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_accepts_every_unit() {
        assert_eq!(parse_cpu_millicores("287m"), 287);
        assert_eq!(parse_cpu_millicores("1.5"), 1500);
        assert_eq!(parse_cpu_millicores("2"), 2000);
        assert_eq!(parse_cpu_millicores("2001669174n"), 2001);
        assert_eq!(parse_cpu_millicores("250u"), 0);
        assert_eq!(parse_cpu_millicores("2500u"), 2);
        assert_eq!(parse_cpu_millicores("0.1"), 100);
    }

    #[test]
    fn cpu_rejects_garbage() {
        assert_eq!(parse_cpu_millicores(""), 0);
        assert_eq!(parse_cpu_millicores("   "), 0);
        assert_eq!(parse_cpu_millicores("abc"), 0);
        assert_eq!(parse_cpu_millicores("m"), 0);
        assert_eq!(parse_cpu_millicores("12x"), 0);
    }

    #[test]
    fn memory_accepts_binary_and_decimal_units() {
        assert_eq!(parse_memory_bytes("54Mi"), 54 * 1024 * 1024);
        assert_eq!(parse_memory_bytes("2Gi"), 2 * 1024 * 1024 * 1024);
        assert_eq!(parse_memory_bytes("1024Ki"), 1024 * 1024);
        assert_eq!(parse_memory_bytes("1K"), 1000);
        assert_eq!(parse_memory_bytes("1k"), 1000);
        assert_eq!(parse_memory_bytes("3M"), 3_000_000);
        assert_eq!(parse_memory_bytes("1G"), 1_000_000_000);
        assert_eq!(parse_memory_bytes("1Ti"), 1024_i64.pow(4));
        assert_eq!(parse_memory_bytes("4096"), 4096);
        assert_eq!(parse_memory_bytes("1.5Gi"), 1536 * 1024 * 1024);
    }

    #[test]
    fn memory_rejects_garbage() {
        assert_eq!(parse_memory_bytes(""), 0);
        assert_eq!(parse_memory_bytes("lots"), 0);
        assert_eq!(parse_memory_bytes("Mi"), 0);
        assert_eq!(parse_memory_bytes("12Xi"), 0);
    }

    #[test]
    fn percentages_guard_against_zero_limits() {
        assert_eq!(cpu_percentage("500m", ""), 0.0);
        assert_eq!(cpu_percentage("500m", "0"), 0.0);
        assert_eq!(memory_percentage("1Gi", "nonsense"), 0.0);
    }

    #[test]
    fn percentages_compare_normalized_units() {
        assert_eq!(cpu_percentage("500m", "1"), 50.0);
        assert_eq!(cpu_percentage("1000000000n", "2"), 50.0);
        assert_eq!(memory_percentage("512Mi", "2Gi"), 25.0);
        assert_eq!(memory_percentage("1Gi", "1024Mi"), 100.0);
    }

    #[test]
    fn percentages_are_not_capped() {
        assert_eq!(cpu_percentage("3", "1500m"), 200.0);
        assert_eq!(memory_percentage("3Gi", "1Gi"), 300.0);
    }

    #[test]
    fn cpu_display() {
        assert_eq!(format_cpu(""), "0m");
        assert_eq!(format_cpu("1998140547n"), "1998m");
        assert_eq!(format_cpu("287m"), "287m");
        assert_eq!(format_cpu("2"), "2.0");
        assert_eq!(format_cpu("1.5"), "1.5");
        assert_eq!(format_cpu("0.25"), "250m");
        assert_eq!(format_cpu("weird"), "weird");
    }

    #[test]
    fn memory_display() {
        assert_eq!(format_memory(""), "0Mi");
        assert_eq!(format_memory("garbage"), "0Mi");
        assert_eq!(format_memory("1536Mi"), "1.5Gi");
        assert_eq!(format_memory("2Gi"), "2.0Gi");
        assert_eq!(format_memory("54Mi"), "54Mi");
        assert_eq!(format_memory("55296Ki"), "54Mi");
        assert_eq!(format_memory("2048"), "2Ki");
        assert_eq!(format_memory("512"), "512");
    }
}
