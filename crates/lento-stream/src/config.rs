//! Per-instance stretch configuration.
//!
//! The engine itself never validates configuration; everything that reaches
//! it has already been clamped here. The config is a plain value object owned
//! by whoever drives the stretcher and passed in explicitly; there is no
//! process-wide settings state.

/// Lowest accepted stretch amount.
///
/// Below 0.5 a single step would have to retire more than one full window of
/// input, which the accounting does not support.
pub const MIN_STRETCH_AMOUNT: f64 = 0.5;

/// Highest accepted stretch amount.
pub const MAX_STRETCH_AMOUNT: f64 = 100.0;

/// Shortest accepted analysis window duration in seconds.
pub const MIN_WINDOW_SECONDS: f64 = 0.01;

/// Longest accepted analysis window duration in seconds.
pub const MAX_WINDOW_SECONDS: f64 = 2.0;

/// Stretch parameters for one effect instance.
///
/// Out-of-range values are clamped, never rejected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StretchConfig {
    stretch_amount: f64,
    window_seconds: f64,
    enabled: bool,
}

impl StretchConfig {
    /// Build a config, clamping both scalars into their legal ranges.
    pub fn new(stretch_amount: f64, window_seconds: f64, enabled: bool) -> Self {
        Self {
            stretch_amount: stretch_amount.clamp(MIN_STRETCH_AMOUNT, MAX_STRETCH_AMOUNT),
            window_seconds: window_seconds.clamp(MIN_WINDOW_SECONDS, MAX_WINDOW_SECONDS),
            enabled,
        }
    }

    /// Output duration per input duration; 1.0 leaves the length unchanged.
    pub fn stretch_amount(&self) -> f64 {
        self.stretch_amount
    }

    /// Set the stretch amount, clamped to `[0.5, 100]`.
    pub fn set_stretch_amount(&mut self, amount: f64) {
        self.stretch_amount = amount.clamp(MIN_STRETCH_AMOUNT, MAX_STRETCH_AMOUNT);
    }

    /// Analysis window duration in seconds.
    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    /// Set the window duration, clamped to `[0.01, 2.0]` seconds.
    pub fn set_window_seconds(&mut self, seconds: f64) {
        self.window_seconds = seconds.clamp(MIN_WINDOW_SECONDS, MAX_WINDOW_SECONDS);
    }

    /// Whether the effect processes audio at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or bypass the effect.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Default for StretchConfig {
    /// 4x stretch over a 0.28 s window, bypassed until enabled.
    fn default() -> Self {
        Self::new(4.0, 0.28, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StretchConfig::default();
        assert_eq!(config.stretch_amount(), 4.0);
        assert_eq!(config.window_seconds(), 0.28);
        assert!(!config.enabled());
    }

    #[test]
    fn constructor_clamps() {
        let config = StretchConfig::new(0.1, 50.0, true);
        assert_eq!(config.stretch_amount(), MIN_STRETCH_AMOUNT);
        assert_eq!(config.window_seconds(), MAX_WINDOW_SECONDS);
        assert!(config.enabled());
    }

    #[test]
    fn setters_clamp() {
        let mut config = StretchConfig::default();
        config.set_stretch_amount(1000.0);
        assert_eq!(config.stretch_amount(), MAX_STRETCH_AMOUNT);
        config.set_stretch_amount(-3.0);
        assert_eq!(config.stretch_amount(), MIN_STRETCH_AMOUNT);

        config.set_window_seconds(0.0);
        assert_eq!(config.window_seconds(), MIN_WINDOW_SECONDS);
        config.set_window_seconds(0.25);
        assert_eq!(config.window_seconds(), 0.25);
    }
}
