//! Spectrum view of the effect chain's output
//!
//! Hann-windowed FFT read at log-spaced frequencies, with a falling decay so
//! the filter sweep and delay repeats stay readable between frames.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{f32::consts::PI, sync::Arc};

const SPECTRUM_BINS: usize = 64;
const FLOOR_DB: f64 = -100.0;
/// dB the display may fall per update
const FALL_DB: f64 = 3.0;

pub struct SpectrumAnalyzer {
    window: Vec<f32>,
    /// (frequency in Hz, FFT bin) per display point
    bins: Vec<(f64, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_size: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        let denom = fft_size.saturating_sub(1).max(1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / denom).cos()))
            .collect();

        let max_freq = (sample_rate as f64 / 2.0).clamp(40.0, 20_000.0);
        let min_freq = 20.0;
        let last_bin = (fft_size / 2).saturating_sub(1);
        let bins: Vec<(f64, usize)> = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = min_freq * (max_freq / min_freq).powf(t);
                let bin = (freq * fft_size as f64 / sample_rate as f64).round() as usize;
                (freq, bin.min(last_bin))
            })
            .collect();

        let spectrum = bins.iter().map(|&(f, _)| (f, FLOOR_DB)).collect();

        Self {
            window,
            bins,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_size],
            spectrum,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.window.len()
    }

    /// Analyse the newest `fft_size` samples of `buffer`
    pub fn update(&mut self, buffer: &[f32]) {
        let size = self.fft_size();
        if buffer.len() < size {
            return;
        }
        let recent = &buffer[buffer.len() - size..];

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(recent).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &(_, bin)) in self.spectrum.iter_mut().zip(&self.bins) {
            let power = self.scratch[bin].norm_sqr().max(1e-12) as f64;
            let db = (10.0 * power.log10()).max(FLOOR_DB);
            point.1 = db.max(point.1 - FALL_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    // Plot against log frequency so the low end isn't squashed
    let points: Vec<(f64, f64)> = spectrum.iter().map(|&(f, db)| (f.log10(), db)).collect();
    let (min_x, max_x) = points
        .first()
        .zip(points.last())
        .map_or((0.0, 1.0), |(a, b)| (a.0, b.0.max(a.0 + 1.0)));
    let max_db = points.iter().map(|&(_, db)| db).fold(FLOOR_DB, f64::max);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([min_x, max_x])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, max_db.max(0.0) + 10.0])
                .labels(vec!["-100", "-50", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
