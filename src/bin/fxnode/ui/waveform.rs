//! Oscilloscope of the most recent output samples

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Smallest vertical range, so silence doesn't zoom into noise
const MIN_SCALE: f64 = 0.05;

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32], muted: bool) {
    let title = if muted { " Output (muted) " } else { " Output " };
    let block = Block::default().title(title).borders(Borders::ALL);

    let len = audio_buffer.len().max(1) as f64;
    let data: Vec<(f64, f64)> = audio_buffer
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / len, sample as f64))
        .collect();

    let scale = data
        .iter()
        .fold(MIN_SCALE, |acc, &(_, y)| acc.max(y.abs()))
        .min(1.0);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(if muted { Color::DarkGray } else { Color::Cyan }))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-scale, scale])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
