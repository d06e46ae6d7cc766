//! FxNode - builds the effect chain and runs it on the default output device

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::Arc;

use effect_node::{
    dsp::oscillator::OscillatorWaveform,
    effects::{DelayEffect, FilterEffect},
    graph::{EffectNode, EffectUnit, GraphPlayer, TimelineTiming, ToneSource},
    transport::{MuteState, PlayHead, Playhead, TrackMuteState},
    EngineConfig,
};

use super::ui::{Controls, UiApp, UiStateInit, UiStateUpdate};

/// Samples buffered for the waveform and spectrum views
const AUDIO_RING_SIZE: usize = 8192;
const STATE_RING_SIZE: usize = 64;
const NUM_CHANNELS: usize = 2;
const BLOCK_SIZE: usize = 512;

/// Demo application builder
pub struct FxNode {
    frequency: f32,
    cutoff_hz: f32,
    delay_ms: f32,
}

impl FxNode {
    pub fn new() -> Self {
        Self {
            frequency: 110.0,
            cutoff_hz: 1_000.0,
            delay_ms: 250.0,
        }
    }

    pub fn frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn cutoff(mut self, cutoff_hz: f32) -> Self {
        self.cutoff_hz = cutoff_hz;
        self
    }

    pub fn delay_ms(mut self, delay_ms: f32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Run the application (takes over the terminal, plays audio)
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f64;
        let device_channels = config.channels() as usize;

        let playhead = Arc::new(PlayHead::new());
        let mute = Arc::new(TrackMuteState::new());
        let filter =
            Arc::new(FilterEffect::lowpass(NUM_CHANNELS, self.cutoff_hz).with_resonance(0.6));
        let delay = Arc::new(DelayEffect::new(NUM_CHANNELS, self.delay_ms));

        let engine_config = EngineConfig::new(sample_rate, BLOCK_SIZE);
        let timing = || {
            TimelineTiming::from_config(playhead.clone() as Arc<dyn Playhead>, &engine_config)
                .with_mute_state(mute.clone() as Arc<dyn MuteState>)
        };
        let tone = ToneSource::new(OscillatorWaveform::Saw, self.frequency, NUM_CHANNELS);
        let filtered = EffectNode::new(tone, filter.clone(), sample_rate, BLOCK_SIZE, timing());
        let delayed = EffectNode::new(filtered, delay.clone(), sample_rate, BLOCK_SIZE, timing());

        let mut player = GraphPlayer::new(delayed, engine_config)
            .wrap_err("failed to prepare the effect graph")?
            .with_block_state(playhead.clone())
            .with_block_state(mute.clone());

        let init = UiStateInit {
            sample_rate: sample_rate as f32,
            block_size: BLOCK_SIZE,
            latency_samples: player.properties().latency_samples,
            filter_id: filter.id(),
            delay_id: delay.id(),
        };

        let (mut audio_tx, audio_rx) = rtrb::RingBuffer::<f32>::new(AUDIO_RING_SIZE);
        let (mut state_tx, state_rx) = rtrb::RingBuffer::<UiStateUpdate>::new(STATE_RING_SIZE);

        let audio_playhead = playhead.clone();
        let audio_mute = mute.clone();

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / device_channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(BLOCK_SIZE);
                    let output = player.process_next(frames_to_render);

                    // Stopped or muted tracks are silent at the mix stage
                    let audible =
                        audio_playhead.is_playing() && audio_mute.should_track_be_audible();
                    let gain = if audible { 1.0 } else { 0.0 };

                    let out_off = frames_written * device_channels;
                    for i in 0..frames_to_render {
                        for ch in 0..device_channels {
                            let source = ch.min(NUM_CHANNELS - 1);
                            data[out_off + i * device_channels + ch] =
                                output.audio.channel(source)[i] * gain;
                        }
                        let _ = audio_tx.push(data[out_off + i * device_channels]);
                    }

                    frames_written += frames_to_render;
                }

                let _ = state_tx.push(UiStateUpdate {
                    reference_position: player.reference_position(),
                    timeline_position: audio_playhead.position(),
                    is_playing: audio_playhead.is_playing(),
                    is_looping: audio_playhead.is_looping(),
                    is_muted: audio_mute.is_muted(),
                });
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;

        stream.play()?;
        playhead.play();

        let controls = Controls {
            playhead,
            mute,
            filter,
            delay,
        };
        let mut ui = UiApp::new(audio_rx, state_rx, init, controls);

        let mut terminal = ratatui::init();
        let result = ui.run(&mut terminal);
        ratatui::restore();

        drop(stream);
        result
    }
}

impl Default for FxNode {
    fn default() -> Self {
        Self::new()
    }
}
