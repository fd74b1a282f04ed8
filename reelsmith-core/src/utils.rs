//! Utility functions for ffmpeg time values and argument formatting.
//!
//! These helpers are shared by the filter compiler, the command assembler and
//! the execution supervisor.

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats seconds the way filter and duration arguments carry them (e.g. 9.0 -> "9.000").
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds:.3}")
}

/// Parses FFmpeg time string (HH:MM:SS.MS) to seconds. Returns None if invalid.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Extracts the `time=HH:MM:SS.ms` marker from an ffmpeg diagnostic line.
///
/// Returns `None` when the line carries no marker or the marker is `N/A`.
#[must_use]
pub fn extract_time_marker(line: &str) -> Option<f64> {
    let start = line.find("time=")? + "time=".len();
    let rest = line[start..].trim_start();
    let value = rest.split_whitespace().next()?;
    parse_ffmpeg_time(value)
}

/// Escapes a filter option value for use inside a `-vf`/`-filter_complex` graph.
///
/// ffmpeg unescapes the value twice: once when splitting the graph into
/// filters, then once more when splitting a filter's options.
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    escape_chars(&escape_chars(value, &['\\', '\'', ':']), &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
