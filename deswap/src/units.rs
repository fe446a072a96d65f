//! Byte-size formatting and parsing for CLI input and log output

#![allow(clippy::cast_precision_loss)] // sizes are approximated for display only

const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Render a byte count with a binary unit: `512 B`, `64 KiB`, `1.5 MiB`
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    let mut unit = 0;
    let mut whole = bytes;
    while whole >= 1024 && unit < UNITS.len() - 1 {
        whole /= 1024;
        unit += 1;
    }

    let divisor = 1u64 << (10 * unit);
    if bytes % divisor == 0 {
        format!("{} {}", bytes / divisor, UNITS[unit])
    } else {
        format!("{:.1} {}", bytes as f64 / divisor as f64, UNITS[unit])
    }
}

/// Parse a size such as `65536`, `64k`, `64KiB` or `1m` into bytes
///
/// # Errors
/// Returns a message suitable for a CLI diagnostic when the value cannot be parsed
pub fn parse_bytes(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    let split_at = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split_at);

    let value: u64 = digits.parse().map_err(|_| format!("invalid size '{input}'"))?;
    let shift = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        other => return Err(format!("unknown size suffix '{other}' in '{input}'")),
    };

    value.checked_mul(1 << shift).ok_or_else(|| format!("size '{input}' is too large"))
}
