//! Transport bar widget - shows play state, position, node flags and levels

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// On/off switches shown next to the transport
pub struct NodeFlags {
    pub filter_enabled: bool,
    pub delay_enabled: bool,
}

fn flag(label: &str, on: bool) -> Span<'static> {
    Span::styled(
        format!("{}:{}  ", label, if on { "on" } else { "off" }),
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    dynamic_state: &UiStateUpdate,
    flags: &NodeFlags,
    audio_stats: &AudioStats,
) {
    let block = Block::default().title(" fxnode ").borders(Borders::ALL);

    let play_symbol = if dynamic_state.is_playing { "▶" } else { "■" };
    let play_state_str = if dynamic_state.is_playing { "Playing" } else { "Stopped" };
    let seconds = dynamic_state.timeline_position as f64 / static_state.sample_rate as f64;

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", play_symbol, play_state_str),
            Style::default().fg(if dynamic_state.is_playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(format!("{:>7.2}s  ", seconds), Style::default().fg(Color::White)),
        Span::styled(
            format!("ref {}  ", dynamic_state.reference_position),
            Style::default().fg(Color::DarkGray),
        ),
        flag("loop", dynamic_state.is_looping),
        flag("mute", dynamic_state.is_muted),
        flag(&format!("filter#{}", static_state.filter_id), flags.filter_enabled),
        flag(&format!("delay#{}", static_state.delay_id), flags.delay_enabled),
        Span::styled(
            format!(
                "{:.1}kHz/{}  lat {}  ",
                static_state.sample_rate / 1000.0,
                static_state.block_size,
                static_state.latency_samples
            ),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
