//! Hardware decoding flags and failure detection.
//!
//! This module owns the CUDA hardware-decode arguments that the command
//! assembler inserts and the supervisor strips again when the decoder turns
//! out to be unavailable at run time.
//!
//! **Important**: This module is ONLY for hardware DECODING. Hardware
//! encoder selection and its CPU fallback live in `encoding::codec`.

/// `FFmpeg` hardware decoding arguments, inserted right after the overwrite flag.
pub const HWDECODE_ARGS: [&str; 4] = ["-hwaccel", "cuda", "-hwaccel_output_format", "cuda"];

/// Diagnostic fragments that mean the CUDA decoder could not be used.
pub const HWDECODE_UNAVAILABLE_MARKERS: [&str; 4] = [
    "Cannot load nvcuda.dll",
    "Could not dynamically load CUDA",
    "device type cuda",
    "Hardware device setup failed",
];

/// Gets `FFmpeg` hardware decoding arguments.
///
/// # Returns
///
/// * `Vec<String>` - The `FFmpeg` hardware decoding arguments
#[must_use]
pub fn get_ffmpeg_hwdecode_args() -> Vec<String> {
    HWDECODE_ARGS.iter().map(|s| (*s).to_string()).collect()
}

/// Checks whether the diagnostic text reports an unavailable hardware decoder.
#[must_use]
pub fn is_hwdecode_unavailable(stderr: &str) -> bool {
    HWDECODE_UNAVAILABLE_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
}

/// Checks whether an argument list carries the hardware decoding flags.
#[must_use]
pub fn has_hwdecode_args(args: &[String]) -> bool {
    find_hwdecode_args(args).is_some()
}

fn find_hwdecode_args(args: &[String]) -> Option<usize> {
    args.windows(HWDECODE_ARGS.len())
        .position(|window| window.iter().zip(HWDECODE_ARGS).all(|(a, b)| a == b))
}

/// Removes the hardware decoding flags, leaving every other argument in place.
///
/// # Returns
///
/// * `Some(Vec<String>)` - The arguments without the flags
/// * `None` - If the flags were not present
#[must_use]
pub fn strip_hwdecode_args(args: &[String]) -> Option<Vec<String>> {
    let start = find_hwdecode_args(args)?;
    let mut stripped = Vec::with_capacity(args.len() - HWDECODE_ARGS.len());
    stripped.extend_from_slice(&args[..start]);
    stripped.extend_from_slice(&args[start + HWDECODE_ARGS.len()..]);
    Some(stripped)
}
