//! Two-input transition graph.
//!
//! Each input runs through its own frame chain, the two streams are blended
//! with `xfade` over `[offset, offset + duration]`, and the result is handed
//! to the delogo stage (or passed through) as `[vf]`. Audio, when both inputs
//! carry it, is resampled, padded to its input's length and cross-faded over
//! the same window as `[af]`.

use super::filters::{DelogoStage, delogo_blur, frame_chain, frame_rate_filter};
use crate::config::{PipelineConfig, TransitionKind, TransitionSpec};
use crate::external::ProbeResult;
use crate::utils::format_seconds;

/// Terminal video label of the transition graph.
pub const VIDEO_OUT: &str = "vf";
/// Terminal audio label of the transition graph.
pub const AUDIO_OUT: &str = "af";

/// Timing of the blend window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionTiming {
    /// Start of the blend, relative to the first input.
    pub offset: f64,
    /// Length of the blended output.
    pub total_duration: f64,
}

/// Computes the blend window; unknown durations count as zero.
#[must_use]
pub fn transition_timing(first: Option<f64>, second: Option<f64>, duration: f64) -> TransitionTiming {
    let first = first.unwrap_or(0.0);
    let second = second.unwrap_or(0.0);
    TransitionTiming {
        offset: (first - duration).max(0.0),
        total_duration: (first + second - duration).max(0.0),
    }
}

/// The `xfade` transition name for a kind.
#[must_use]
pub fn xfade_name(kind: TransitionKind) -> &'static str {
    match kind {
        TransitionKind::Fade => "fade",
        TransitionKind::Crossfade => "dissolve",
        TransitionKind::Wipe => "wipeleft",
        TransitionKind::Slide => "slideleft",
        TransitionKind::ZoomIn => "zoomin",
        TransitionKind::Blur => "fadegrays",
    }
}

/// A compiled `-filter_complex` graph with its terminal labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionGraph {
    pub graph: String,
    pub video_label: &'static str,
    /// Present only when audio is cross-faded.
    pub audio_label: Option<&'static str>,
    pub timing: TransitionTiming,
}

/// Builds the two-input transition graph.
///
/// `probes` must hold the results for the two inputs in order.
#[must_use]
pub fn transition_graph(
    config: &PipelineConfig,
    transition: &TransitionSpec,
    probes: [ProbeResult; 2],
    delogo: Option<DelogoStage>,
    lut_available: bool,
) -> TransitionGraph {
    let timing = transition_timing(probes[0].duration, probes[1].duration, transition.duration);

    let zoom = match delogo {
        Some(DelogoStage::Zoom { crop, .. }) => Some(crop),
        _ => None,
    };
    let mut chain = frame_chain(config, lut_available, zoom);
    if config.force_fps() {
        chain = chain.add_filter(frame_rate_filter());
    }
    let pre = chain.build_or_null();

    let mut filters = vec![
        format!("[0:v]{pre}[v0]"),
        format!("[1:v]{pre}[v1]"),
        format!(
            "[v0][v1]xfade=transition={}:duration={}:offset={},format=yuv420p[vx]",
            xfade_name(transition.kind),
            format_seconds(transition.duration),
            format_seconds(timing.offset)
        ),
    ];

    match delogo {
        Some(DelogoStage::Blur(region)) => {
            filters.push(format!("[vx]{}", delogo_blur(region, Some(VIDEO_OUT))));
        }
        _ => filters.push(format!("[vx]null[{VIDEO_OUT}]")),
    }

    let crossfade_audio = config.export().wants_audio();
    let both_have_audio = probes.iter().all(|p| p.has_audio);
    if crossfade_audio && !both_have_audio && probes.iter().any(|p| p.has_audio) {
        log::warn!("Only one input has an audio stream; the output will be silent");
    }

    let audio_label = if crossfade_audio && both_have_audio {
        for (i, probe) in probes.iter().enumerate() {
            let pad = probe
                .duration
                .map(|d| format!(",apad=whole_dur={}", format_seconds(d)))
                .unwrap_or_default();
            filters.push(format!("[{i}:a]aresample=async=1:first_pts=0{pad}[a{i}]"));
        }
        let curve = if transition.smooth { "cos" } else { "tri" };
        filters.push(format!(
            "[a0][a1]acrossfade=d={}:c1={curve}:c2={curve}[{AUDIO_OUT}]",
            format_seconds(transition.duration)
        ));
        Some(AUDIO_OUT)
    } else {
        None
    };

    TransitionGraph {
        graph: filters.join(";"),
        video_label: VIDEO_OUT,
        audio_label,
        timing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExportSpec, QualitySettings};
    use crate::processing::geometry::DelogoRegion;

    fn probe(duration: f64, has_audio: bool) -> ProbeResult {
        ProbeResult {
            duration: Some(duration),
            has_audio,
        }
    }

    fn spec(kind: TransitionKind, smooth: bool) -> TransitionSpec {
        TransitionSpec {
            kind,
            duration: 1.0,
            smooth,
        }
    }

    fn plain_config() -> PipelineConfig {
        PipelineConfig::builder(["a.mp4", "b.mp4"], "out.mp4")
            .transition(spec(TransitionKind::Fade, false))
            .vertical_canvas(false)
            .force_fps(false)
            .quality(QualitySettings {
                sharpen: false,
                color: false,
                max_speed: false,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_timing_ten_eight_one() {
        let timing = transition_timing(Some(10.0), Some(8.0), 1.0);
        assert_eq!(timing.offset, 9.0);
        assert_eq!(timing.total_duration, 17.0);
    }

    #[test]
    fn test_timing_unknown_durations_count_as_zero() {
        let timing = transition_timing(None, Some(8.0), 1.0);
        assert_eq!(timing.offset, 0.0);
        assert_eq!(timing.total_duration, 7.0);
        assert_eq!(transition_timing(None, None, 1.0).total_duration, 0.0);
    }

    #[test]
    fn test_xfade_names() {
        assert_eq!(xfade_name(TransitionKind::Crossfade), "dissolve");
        assert_eq!(xfade_name(TransitionKind::Blur), "fadegrays");
        assert_eq!(xfade_name(TransitionKind::ZoomIn), "zoomin");
    }

    #[test]
    fn test_graph_with_audio_crossfade() {
        let config = plain_config();
        let graph = transition_graph(
            &config,
            &spec(TransitionKind::Fade, true),
            [probe(10.0, true), probe(8.0, true)],
            None,
            false,
        );
        assert_eq!(
            graph.graph,
            "[0:v]null[v0];[1:v]null[v1];\
             [v0][v1]xfade=transition=fade:duration=1.000:offset=9.000,format=yuv420p[vx];\
             [vx]null[vf];\
             [0:a]aresample=async=1:first_pts=0,apad=whole_dur=10.000[a0];\
             [1:a]aresample=async=1:first_pts=0,apad=whole_dur=8.000[a1];\
             [a0][a1]acrossfade=d=1.000:c1=cos:c2=cos[af]"
        );
        assert_eq!(graph.audio_label, Some("af"));
        assert_eq!(graph.timing.total_duration, 17.0);
    }

    #[test]
    fn test_missing_audio_on_one_side_drops_audio() {
        let graph = transition_graph(
            &plain_config(),
            &spec(TransitionKind::Wipe, false),
            [probe(10.0, true), probe(8.0, false)],
            None,
            false,
        );
        assert_eq!(graph.audio_label, None);
        assert!(!graph.graph.contains("acrossfade"));
    }

    #[test]
    fn test_muted_export_drops_audio() {
        let config = PipelineConfig::builder(["a.mp4", "b.mp4"], "out.mp4")
            .transition(spec(TransitionKind::Fade, false))
            .export(ExportSpec {
                mute_all: true,
                ..ExportSpec::default()
            })
            .build()
            .unwrap();
        let graph = transition_graph(
            &config,
            &spec(TransitionKind::Fade, false),
            [probe(10.0, true), probe(8.0, true)],
            None,
            false,
        );
        assert_eq!(graph.audio_label, None);
    }

    #[test]
    fn test_blur_delogo_feeds_terminal_label() {
        let region = DelogoRegion { x: 30, y: 30, w: 260, h: 110 };
        let graph = transition_graph(
            &plain_config(),
            &spec(TransitionKind::Slide, false),
            [probe(5.0, false), probe(5.0, false)],
            Some(DelogoStage::Blur(region)),
            false,
        );
        assert!(graph.graph.contains("[vx]split=2[dl_base][dl_c0];"));
        assert!(graph.graph.contains("[dl_base][dl_b0]overlay=30:30[vf]"));
        assert!(!graph.graph.contains("[vx]null[vf]"));
    }

    #[test]
    fn test_fps_folded_into_each_input() {
        let config = PipelineConfig::builder(["a.mp4", "b.mp4"], "out.mp4")
            .transition(spec(TransitionKind::Fade, false))
            .build()
            .unwrap();
        let graph = transition_graph(
            &config,
            &spec(TransitionKind::Fade, false),
            [probe(3.0, false), probe(3.0, false)],
            None,
            false,
        );
        assert!(graph.graph.contains("saturation=1.03,fps=60[v0]"));
        assert!(graph.graph.contains("saturation=1.03,fps=60[v1]"));
    }
}
