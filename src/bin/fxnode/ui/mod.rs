//! Terminal UI for fxnode
//!
//! Shows the transport, the hosted units' switches and the output signal,
//! and maps keys onto the playhead, the track mute and the effect units.

pub mod state;
mod spectrum;
mod transport;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use effect_node::graph::EffectUnit;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;
use std::time::Duration;

pub use state::{Controls, UiStateInit, UiStateUpdate};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats, NodeFlags};
use waveform::render_waveform;

const VIS_BUFFER_SIZE: usize = 2048;
/// Loop length toggled with `L`
const LOOP_SECONDS: f64 = 2.0;

pub struct UiApp {
    audio_rx: Consumer<f32>,
    state_rx: Consumer<UiStateUpdate>,
    init: UiStateInit,
    current_state: UiStateUpdate,
    controls: Controls,
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiStateUpdate>,
        init: UiStateInit,
        controls: Controls,
    ) -> Self {
        let spectrum = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, init.sample_rate);
        Self {
            audio_rx,
            state_rx,
            init,
            current_state: UiStateUpdate::default(),
            controls,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if self.audio_buffer.len() > VIS_BUFFER_SIZE {
            let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
            self.audio_buffer.drain(0..excess);
        }
        if received {
            self.spectrum.update(&self.audio_buffer);
        }
    }

    fn poll_state(&mut self) {
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = state;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let controls = &self.controls;
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                controls.playhead.toggle_playback();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => controls.playhead.seek(0),
            KeyCode::Char('l') | KeyCode::Char('L') => {
                if controls.playhead.is_looping() {
                    controls.playhead.set_loop(None);
                } else {
                    let end = (LOOP_SECONDS * self.init.sample_rate as f64) as i64;
                    controls.playhead.set_loop(Some((0, end)));
                }
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                controls.filter.enabled_param().toggle();
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                controls.delay.enabled_param().toggle();
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                controls.mute.toggle_muted();
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(10),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let flags = NodeFlags {
            filter_enabled: self.controls.filter.enabled_param().get(),
            delay_enabled: self.controls.delay.enabled_param().get(),
        };
        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], &self.init, &self.current_state, &flags, &stats);

        render_waveform(frame, chunks[1], &self.audio_buffer, self.current_state.is_muted);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Stop  [R] Rewind  [L] Loop  [E] Filter  [D] Delay  [M] Mute",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
