// reelsmith-cli/src/config.rs
//
// Translates parsed command-line flags into a validated core configuration.

use crate::cli::BuildArgs;
use reelsmith_core::PipelineConfig;
use reelsmith_core::config::{
    CinematicEffects, Codec, CornerChoice, DEFAULT_BITRATE_MBPS, DEFAULT_ENCODER_PRESET,
    DEFAULT_GRAIN_STRENGTH, DEFAULT_NOISE_STRENGTH, DEFAULT_TRANSITION_DURATION,
    DEFAULT_VIGNETTE_STRENGTH, DelogoSpec, EffectSetting, ExportSpec, GRAIN_RANGE, NOISE_RANGE,
    PerformanceSpec, QualitySettings, TransitionKind, TransitionSpec, VIGNETTE_RANGE, ZoomSpec,
};
use std::path::PathBuf;

/// Default destination name, stamped with the local time.
pub fn default_output_name() -> PathBuf {
    PathBuf::from(format!(
        "output_{}.mp4",
        chrono::Local::now().format("%Y%m%d_%H%M")
    ))
}

fn effect(strength: Option<f64>, default: f64, range: (f64, f64)) -> EffectSetting {
    match strength {
        Some(strength) => EffectSetting::new(true, strength, range),
        None => EffectSetting::disabled(default),
    }
}

/// The `--auto` preset: every quality stage on, automatic watermark removal,
/// muted H.264 without hardware acceleration, and a crossfade whenever the
/// build ends up with exactly two inputs.
pub fn auto_preset(args: &BuildArgs) -> BuildArgs {
    let mut args = args.clone();
    args.no_vertical_canvas = false;
    args.no_force_fps = false;
    args.no_sharpen = false;
    args.no_color = false;

    args.delogo = true;
    args.delogo_corner = CornerChoice::Auto;

    let two_inputs = args.inputs.len() == 2 || (args.inputs.len() == 1 && !args.no_loop);
    if two_inputs {
        args.transition = Some(TransitionKind::Crossfade);
        args.transition_duration = DEFAULT_TRANSITION_DURATION;
    } else {
        args.transition = None;
    }
    args.smooth_transition = false;

    args.codec = Codec::H264;
    args.bitrate = DEFAULT_BITRATE_MBPS;
    args.preset = DEFAULT_ENCODER_PRESET.to_string();
    args.mute = true;
    args.keep_metadata = false;
    args.hide_qr = false;
    args.hardware_encoder = false;
    args.hardware_decode = false;
    args.no_faststart = false;
    args
}

/// Builds the pipeline configuration for `build` and `plan`.
pub fn pipeline_config(args: &BuildArgs) -> reelsmith_core::CoreResult<PipelineConfig> {
    let preset;
    let args = if args.auto {
        log::info!("Auto mode: applying the safe preset");
        preset = auto_preset(args);
        &preset
    } else {
        args
    };

    let output = args.output.clone().unwrap_or_else(default_output_name);

    let mut builder = PipelineConfig::builder(args.inputs.iter().cloned(), output)
        .work_dir(&args.work_dir)
        .loop_single_input(!args.no_loop)
        .vertical_canvas(!args.no_vertical_canvas)
        .force_fps(!args.no_force_fps)
        .quality(QualitySettings {
            sharpen: !args.no_sharpen,
            color: !args.no_color,
            max_speed: args.max_speed,
        })
        .cinematic(CinematicEffects {
            film_grain: effect(args.film_grain, DEFAULT_GRAIN_STRENGTH, GRAIN_RANGE),
            vignette: effect(args.vignette, DEFAULT_VIGNETTE_STRENGTH, VIGNETTE_RANGE),
            digital_noise: effect(args.digital_noise, DEFAULT_NOISE_STRENGTH, NOISE_RANGE),
            lut: args.lut.clone(),
        })
        .zoom(ZoomSpec {
            enabled: args.zoom,
            factor: args.zoom_factor,
            auto: args.auto_zoom,
        })
        .export(ExportSpec {
            codec: args.codec,
            bitrate_mbps: args.bitrate,
            keep_audio: !args.no_audio,
            mute_all: args.mute,
            strip_metadata: !args.keep_metadata,
            hide_qr: args.hide_qr,
        })
        .performance(PerformanceSpec {
            use_hardware_encoder: args.hardware_encoder,
            hardware_decode: args.hardware_decode,
            encoder_preset: args.preset.clone(),
            threads: args.threads,
            filter_threads: args.filter_threads,
            faststart: !args.no_faststart,
        });

    if args.delogo {
        builder = builder.delogo(DelogoSpec {
            corner: args.delogo_corner,
            box_size: args.watermark_box.box_size,
            margin: args.watermark_box.margin,
        });
    }
    if let Some(kind) = args.transition {
        builder = builder.transition(TransitionSpec {
            kind,
            duration: args.transition_duration,
            smooth: args.smooth_transition,
        });
    }

    builder.build()
}
