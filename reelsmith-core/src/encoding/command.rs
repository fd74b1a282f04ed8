// ============================================================================
// reelsmith-core/src/encoding/command.rs
// ============================================================================
//
// COMMAND ASSEMBLER: Ordering Arguments into One ffmpeg Invocation
//
// The assembler walks a fixed sequence of blocks and appends each block's
// arguments in turn:
//
//   -y -> hardware decode -> inputs (concat or transition graph)
//      -> frame rate -> delogo -> codec -> audio -> threads -> faststart
//      -> duration limit -> metadata -> QR obscuring -> destination
//
// Frame rate and delogo are only added as standalone `-vf` filters when the
// transition graph has not already folded them in. QR obscuring runs last
// because it may rewrite an earlier `-map`.

use super::codec::{AUDIO_CODEC_ARGS, codec_args};
use super::manifest::ConcatManifest;
use crate::config::PipelineConfig;
use crate::external::ProbeResult;
use crate::hardware_decode::get_ffmpeg_hwdecode_args;
use crate::processing::filters::{
    DelogoStage, delogo_blur, frame_chain, frame_rate_filter, qr_blur,
};
use crate::processing::transition::{VIDEO_OUT, transition_graph};
use crate::utils::format_seconds;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Terminal video label after QR obscuring in a transition graph.
pub const QR_VIDEO_OUT: &str = "vq";

/// A runnable encoder invocation: the binary plus its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncoderCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl EncoderCommand {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Same program with different arguments.
    #[must_use]
    pub fn with_args(&self, args: Vec<String>) -> Self {
        Self {
            program: self.program.clone(),
            args,
        }
    }

    /// Full argument vector, program first.
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Whitespace-joined rendering for logs; arguments containing spaces or
    /// quotes are single-quoted.
    #[must_use]
    pub fn display(&self) -> String {
        self.argv()
            .iter()
            .map(|arg| quote_for_log(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote_for_log(arg: &str) -> String {
    if arg.is_empty() || arg.contains([' ', '\'', '"', ';', '[']) {
        format!("'{}'", arg.replace('\'', "'\\''"))
    } else {
        arg.to_string()
    }
}

/// Everything the assembler produced for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledCommand {
    pub command: EncoderCommand,
    /// Manifest the command reads; must be written before spawning.
    pub manifest: Option<ConcatManifest>,
    /// Expected output length on the transition path.
    pub expected_duration: Option<f64>,
    /// Total used to turn time markers into percentages.
    pub progress_hint: Option<f64>,
}

/// Assembles the encoder command.
///
/// `probes` holds one result per input of `config.inputs()`, in order.
/// `delogo` must already have its corner resolved.
#[must_use]
pub fn assemble_command(
    config: &PipelineConfig,
    probes: &[ProbeResult],
    delogo: Option<DelogoStage>,
    lut_available: bool,
    ffmpeg: &Path,
) -> AssembledCommand {
    let inputs = config.inputs();
    let probe_at = |i: usize| probes.get(i).copied().unwrap_or_default();

    // ---- Overwrite and hardware decode ----
    let mut args = vec!["-y".to_string()];
    if config.performance().hardware_decode {
        args.extend(get_ffmpeg_hwdecode_args());
    }

    // ---- Input block ----
    let mut manifest = None;
    let mut expected_duration = None;
    let mut graph_audio = false;
    let transition = config.transition().filter(|_| config.uses_transition());
    let has_complex = transition.is_some();

    if let Some(transition) = transition {
        let graph = transition_graph(
            config,
            transition,
            [probe_at(0), probe_at(1)],
            delogo,
            lut_available,
        );
        for input in &inputs[..2] {
            args.push("-i".to_string());
            args.push(input.to_string_lossy().into_owned());
        }
        args.push("-filter_complex".to_string());
        args.push(graph.graph);
        args.push("-map".to_string());
        args.push(format!("[{}]", graph.video_label));
        if let Some(audio) = graph.audio_label {
            args.push("-map".to_string());
            args.push(format!("[{audio}]"));
            graph_audio = true;
        }
        expected_duration = Some(graph.timing.total_duration).filter(|d| *d > 0.0);
    } else {
        if let [only] = inputs {
            args.push("-i".to_string());
            args.push(only.to_string_lossy().into_owned());
        } else {
            let concat = ConcatManifest::for_inputs(config.work_dir(), inputs);
            args.extend(["-f", "concat", "-safe", "0", "-i"].map(String::from));
            args.push(concat.path.to_string_lossy().into_owned());
            manifest = Some(concat);
        }

        let zoom = match delogo {
            Some(DelogoStage::Zoom { crop, .. }) => Some(crop),
            _ => None,
        };
        if let Some(chain) = frame_chain(config, lut_available, zoom).build() {
            args.push("-vf".to_string());
            args.push(chain);
        }
    }

    // ---- Standalone frame rate and delogo ----
    if config.force_fps() && !has_complex {
        append_video_filter(&mut args, &frame_rate_filter());
    }
    if let (Some(DelogoStage::Blur(region)), false) = (delogo, has_complex) {
        append_video_filter(&mut args, &delogo_blur(region, None));
    }

    // ---- Codec ----
    args.extend(codec_args(&config.export(), config.performance()));

    // ---- Audio: exactly one of graph audio, kept audio, mute ----
    if graph_audio || (!has_complex && config.export().wants_audio()) {
        args.extend(AUDIO_CODEC_ARGS.map(String::from));
    } else {
        args.push("-an".to_string());
    }

    // ---- Threads ----
    let performance = config.performance();
    if performance.threads > 0 {
        args.push("-threads".to_string());
        args.push(performance.threads.to_string());
    }
    if performance.filter_threads > 0 {
        args.push("-filter_threads".to_string());
        args.push(performance.filter_threads.to_string());
    }

    if performance.faststart {
        args.extend(["-movflags", "+faststart"].map(String::from));
    }

    // ---- Duration limit ----
    if let Some(duration) = expected_duration {
        args.push("-t".to_string());
        args.push(format_seconds(duration));
    }
    args.push("-shortest".to_string());

    if config.export().strip_metadata {
        args.extend(["-map_metadata", "-1"].map(String::from));
    }

    if config.export().hide_qr {
        append_qr_blur(&mut args, has_complex);
    }

    args.push(config.output().to_string_lossy().into_owned());

    let progress_hint = expected_duration.or_else(|| {
        if has_complex {
            return None;
        }
        let known: Vec<f64> = (0..inputs.len()).filter_map(|i| probe_at(i).duration).collect();
        (!known.is_empty()).then(|| known.iter().sum())
    });

    let command = EncoderCommand::new(ffmpeg, args);
    log::debug!("Assembled command: {}", command.display());

    AssembledCommand {
        command,
        manifest,
        expected_duration,
        progress_hint,
    }
}

/// Appends `filter` to the existing `-vf` chain, or adds a new `-vf`.
fn append_video_filter(args: &mut Vec<String>, filter: &str) {
    match args.iter().position(|a| a == "-vf") {
        Some(i) if i + 1 < args.len() => {
            let chain = &mut args[i + 1];
            chain.push(',');
            chain.push_str(filter);
        }
        _ => {
            args.push("-vf".to_string());
            args.push(filter.to_string());
        }
    }
}

/// Adds the QR-obscuring stage after every other video filter.
///
/// In a transition graph the stage consumes the current terminal label and
/// the video `-map` is rewired to the new one.
fn append_qr_blur(args: &mut Vec<String>, has_complex: bool) {
    if !has_complex {
        append_video_filter(args, &qr_blur(None));
        return;
    }

    let old_label = format!("[{VIDEO_OUT}]");
    let new_label = format!("[{QR_VIDEO_OUT}]");

    if let Some(i) = args.iter().position(|a| a == "-filter_complex") {
        if let Some(graph) = args.get_mut(i + 1) {
            graph.push(';');
            graph.push_str(&old_label);
            graph.push_str(&qr_blur(Some(QR_VIDEO_OUT)));
        }
    }

    let mut i = 0;
    while i + 1 < args.len() {
        if args[i] == "-map" && args[i + 1] == old_label {
            args[i + 1] = new_label.clone();
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExportSpec, PerformanceSpec, TransitionKind, TransitionSpec};
    use crate::processing::geometry::DelogoRegion;

    fn probe(duration: f64, has_audio: bool) -> ProbeResult {
        ProbeResult {
            duration: Some(duration),
            has_audio,
        }
    }

    fn position(args: &[String], value: &str) -> usize {
        args.iter()
            .position(|a| a == value)
            .unwrap_or_else(|| panic!("{value} missing from {args:?}"))
    }

    #[test]
    fn test_single_input_uses_plain_input_and_vf() {
        let config = PipelineConfig::builder(["in.mp4"], "out.mp4")
            .loop_single_input(false)
            .build()
            .unwrap();
        let assembled = assemble_command(&config, &[probe(12.0, true)], None, false, Path::new("ffmpeg"));
        let args = &assembled.command.args;

        assert_eq!(args[..3], ["-y", "-i", "in.mp4"]);
        assert!(args[position(args, "-vf") + 1].ends_with(",fps=60"));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert!(assembled.manifest.is_none());
        assert_eq!(assembled.progress_hint, Some(12.0));
        assert_eq!(assembled.expected_duration, None);
    }

    #[test]
    fn test_concat_path_references_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::builder(["a.mp4", "b.mp4", "c.mp4"], "out.mp4")
            .work_dir(dir.path())
            .build()
            .unwrap();
        let assembled = assemble_command(
            &config,
            &[probe(3.0, false), ProbeResult::unknown(), probe(4.0, false)],
            None,
            false,
            Path::new("ffmpeg"),
        );
        let args = &assembled.command.args;
        let manifest = assembled.manifest.as_ref().unwrap();

        assert_eq!(args[1..6], ["-f", "concat", "-safe", "0", "-i"]);
        assert_eq!(args[6], manifest.path.to_string_lossy());
        assert_eq!(manifest.contents.lines().count(), 3);
        assert_eq!(assembled.progress_hint, Some(7.0));
        assert!(!args.contains(&"-t".to_string()));
        assert!(args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_block_order() {
        let config = PipelineConfig::builder(["a.mp4", "b.mp4"], "out.mp4")
            .transition(TransitionSpec {
                kind: TransitionKind::Fade,
                duration: 1.0,
                smooth: false,
            })
            .performance(PerformanceSpec {
                hardware_decode: true,
                threads: 8,
                filter_threads: 4,
                ..PerformanceSpec::default()
            })
            .build()
            .unwrap();
        let assembled = assemble_command(
            &config,
            &[probe(10.0, true), probe(8.0, true)],
            None,
            false,
            Path::new("ffmpeg"),
        );
        let args = &assembled.command.args;

        let order = [
            "-y", "-hwaccel", "-filter_complex", "-map", "-c:v", "-c:a", "-threads",
            "-filter_threads", "-movflags", "-t", "-shortest", "-map_metadata", "out.mp4",
        ];
        let positions: Vec<usize> = order.iter().map(|flag| position(args, flag)).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{args:?}");
        assert_eq!(args[position(args, "-t") + 1], "17.000");
        assert!(!args.contains(&"-vf".to_string()));
        assert_eq!(assembled.expected_duration, Some(17.0));
        assert_eq!(assembled.progress_hint, Some(17.0));
    }

    #[test]
    fn test_transition_without_audio_mutes() {
        let config = PipelineConfig::builder(["a.mp4", "b.mp4"], "out.mp4")
            .transition(TransitionSpec::default())
            .build()
            .unwrap();
        let assembled = assemble_command(
            &config,
            &[probe(5.0, false), probe(5.0, false)],
            None,
            false,
            Path::new("ffmpeg"),
        );
        let args = &assembled.command.args;
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert_eq!(args.iter().filter(|a| *a == "-map").count(), 1);
    }

    #[test]
    fn test_muted_concat_uses_an() {
        let config = PipelineConfig::builder(["a.mp4"], "out.mp4")
            .loop_single_input(false)
            .export(ExportSpec {
                keep_audio: false,
                ..ExportSpec::default()
            })
            .build()
            .unwrap();
        let assembled = assemble_command(&config, &[], None, false, Path::new("ffmpeg"));
        assert!(assembled.command.args.contains(&"-an".to_string()));
        assert_eq!(assembled.progress_hint, None);
    }

    #[test]
    fn test_blur_delogo_appended_after_fps() {
        let config = PipelineConfig::builder(["a.mp4"], "out.mp4")
            .loop_single_input(false)
            .build()
            .unwrap();
        let region = DelogoRegion { x: 30, y: 30, w: 260, h: 110 };
        let assembled = assemble_command(
            &config,
            &[],
            Some(DelogoStage::Blur(region)),
            false,
            Path::new("ffmpeg"),
        );
        let args = &assembled.command.args;
        let chain = &args[position(args, "-vf") + 1];
        assert!(chain.contains(",fps=60,split=2[dl_base][dl_c0];"));
        assert!(chain.ends_with("[dl_base][dl_b0]overlay=30:30"));
    }

    #[test]
    fn test_qr_on_plain_chain_extends_vf() {
        let config = PipelineConfig::builder(["a.mp4"], "out.mp4")
            .loop_single_input(false)
            .export(ExportSpec {
                hide_qr: true,
                ..ExportSpec::default()
            })
            .build()
            .unwrap();
        let assembled = assemble_command(&config, &[], None, false, Path::new("ffmpeg"));
        let args = &assembled.command.args;
        assert_eq!(args.iter().filter(|a| *a == "-vf").count(), 1);
        assert!(args[position(args, "-vf") + 1].contains(",fps=60,split=5[qr_base]"));
    }

    #[test]
    fn test_qr_on_transition_rewires_map() {
        let config = PipelineConfig::builder(["a.mp4", "b.mp4"], "out.mp4")
            .transition(TransitionSpec::default())
            .export(ExportSpec {
                hide_qr: true,
                ..ExportSpec::default()
            })
            .build()
            .unwrap();
        let assembled = assemble_command(
            &config,
            &[probe(5.0, true), probe(5.0, true)],
            None,
            false,
            Path::new("ffmpeg"),
        );
        let args = &assembled.command.args;
        let graph = &args[position(args, "-filter_complex") + 1];
        assert!(graph.contains(";[vf]split=5[qr_base]"));
        assert!(graph.ends_with("overlay=W-200:H-200[vq]"));
        assert_eq!(args[position(args, "-map") + 1], "[vq]");
        assert!(args.contains(&"[af]".to_string()));
        assert!(!args.contains(&"[vf]".to_string()));
    }

    #[test]
    fn test_display_quotes_graphs() {
        let cmd = EncoderCommand::new("ffmpeg", vec!["-vf".into(), "a;[b]".into(), "out file.mp4".into()]);
        assert_eq!(cmd.display(), "ffmpeg -vf 'a;[b]' 'out file.mp4'");
    }
}
