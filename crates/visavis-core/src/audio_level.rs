/// Smooths raw audio-level samples into a percentage for a linear UI meter.
///
/// The smoother is asymmetric: a rising signal is taken as-is (instant
/// attack), a falling signal decays as `0.7 * previous + 0.3 * sample`
/// (slow release), so the meter jumps up with speech onsets and drains
/// gently in pauses. The smoothed value is then mapped through
/// `log10(avg) / 1.5 + 1`, which spreads the vendor SDK's very small raw
/// levels over an approximately linear perceptual range; 1.5 and the +1
/// offset are calibrated to that output range and must stay as they are.
///
/// Telemetry is best-effort: there are no error states, out-of-range input
/// and a zero average degrade numerically via clamping.
pub struct AudioLevelMeter {
    moving_average: Option<f64>,
}

impl AudioLevelMeter {
    pub fn new() -> Self {
        Self {
            moving_average: None,
        }
    }

    /// Feed one raw sample in [0, 1] and get the formatted meter level.
    pub fn update(&mut self, sample: f64) -> String {
        let sample = sample.clamp(0.0, 1.0);
        let avg = match self.moving_average {
            Some(prev) if prev > sample => 0.7 * prev + 0.3 * sample,
            _ => sample,
        };
        self.moving_average = Some(avg);
        Self::format_level(avg)
    }

    /// Current meter level without feeding a new sample.
    ///
    /// Pure function of the smoother state: repeated calls between samples
    /// return the same string. `None` before the first sample.
    pub fn percent(&self) -> Option<String> {
        self.moving_average.map(Self::format_level)
    }

    /// The smoothed value itself, in [0, 1] once set.
    pub fn raw_average(&self) -> Option<f64> {
        self.moving_average
    }

    fn format_level(avg: f64) -> String {
        // ln(0) is -inf; the clamp turns that into a plain 0, not a fault.
        let level = (avg.ln() / std::f64::consts::LN_10 / 1.5 + 1.0).clamp(0.0, 1.0);
        format!("{}%", level * 100.0)
    }
}

impl Default for AudioLevelMeter {
    fn default() -> Self {
        Self::new()
    }
}
