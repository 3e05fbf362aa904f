//! Volume percent to device gain mapping.

use bridge_traits::GainRange;

use crate::error::{PlaybackError, Result};

/// Maps a 0-100 volume percentage onto the device gain range
/// `[min_gain, min(device_max, 0)]`.
///
/// The device is never handed `min_gain` itself: 0% maps to the next
/// representable value above it.
#[derive(Debug, Clone, PartialEq)]
pub struct GainController {
    min: f64,
    max: f64,
    percent: f64,
    gain: f64,
}

impl GainController {
    /// Build a controller for `device_range`, starting at `initial_percent`.
    pub fn new(device_range: GainRange, min_gain: f64, initial_percent: f64) -> Result<Self> {
        let max = device_range.max.min(0.0);
        if !min_gain.is_finite() || !max.is_finite() || max <= min_gain {
            return Err(PlaybackError::InvalidArgument(format!(
                "gain range [{}, {}] is empty",
                min_gain, max
            )));
        }

        let mut controller = Self {
            min: min_gain,
            max,
            percent: 0.0,
            gain: min_gain,
        };
        controller.set_volume(initial_percent)?;
        Ok(controller)
    }

    /// Store `percent` and return the gain to apply to the device.
    pub fn set_volume(&mut self, percent: f64) -> Result<f64> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(PlaybackError::InvalidArgument(format!(
                "volume must be between 0 and 100, got {}",
                percent
            )));
        }

        let mut gain = percent * (self.max - self.min) / 100.0 + self.min;
        if gain <= self.min {
            gain = self.min + f64::EPSILON;
        }

        self.percent = percent;
        self.gain = gain;
        Ok(gain)
    }

    /// Last computed device gain.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    pub fn range(&self) -> GainRange {
        GainRange::new(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(device_max: f64) -> GainController {
        GainController::new(GainRange::new(-3.4e38, device_max), -1.0, 100.0).unwrap()
    }

    #[test]
    fn test_full_volume_is_max_gain() {
        let mut gain = controller(3.4e38);
        assert_eq!(gain.set_volume(100.0).unwrap(), 0.0);
        assert_eq!(gain.gain(), 0.0);
    }

    #[test]
    fn test_half_volume_is_linear() {
        let mut gain = controller(1.0);
        assert_eq!(gain.set_volume(50.0).unwrap(), -0.5);
        assert_eq!(gain.percent(), 50.0);
    }

    #[test]
    fn test_zero_volume_stays_above_min() {
        let mut gain = controller(1.0);
        let value = gain.set_volume(0.0).unwrap();
        assert!(value > -1.0);
        assert_eq!(value, -1.0 + f64::EPSILON);
    }

    #[test]
    fn test_device_max_below_zero_caps_range() {
        let mut gain = controller(-0.5);
        assert_eq!(gain.range(), GainRange::new(-1.0, -0.5));
        assert_eq!(gain.set_volume(100.0).unwrap(), -0.5);
        assert_eq!(gain.set_volume(50.0).unwrap(), -0.75);
    }

    #[test]
    fn test_out_of_range_volume_rejected() {
        let mut gain = controller(1.0);
        gain.set_volume(30.0).unwrap();

        for bad in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                gain.set_volume(bad),
                Err(PlaybackError::InvalidArgument(_))
            ));
        }
        assert_eq!(gain.percent(), 30.0);
    }

    #[test]
    fn test_empty_range_rejected() {
        let result = GainController::new(GainRange::new(-3.0, -2.0), -1.0, 100.0);
        assert!(matches!(result, Err(PlaybackError::InvalidArgument(_))));
    }
}
