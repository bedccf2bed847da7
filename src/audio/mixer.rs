// Audio mixer - Copies queued samples into the submission buffer
//
// Two modes share one entry point:
// - Direct: samples are copied unmodified
// - Low-pass: a single-pole filter in 16.16 fixed point
//
//   y = (x * (65536 - range) + y_prev * range) >> 16
//
// `range` is the share of the previous output kept in each new sample. The
// reference setting keeps 60%.

use super::StereoSample;

/// Fixed-point weight of the previous output (60% of full scale)
pub const LOWPASS_RANGE: i32 = (60 * 65536) / 100;

const ONE: i64 = 1 << 16;

/// Stereo mixer with persistent low-pass state
#[derive(Debug, Clone)]
pub struct Mixer {
    /// Weight of the previous output, 0..=65536
    range: i32,
    /// Last filtered left sample
    left: i32,
    /// Last filtered right sample
    right: i32,
}

impl Mixer {
    /// Create a mixer with the reference low-pass weight
    pub fn new() -> Self {
        Self::with_range(LOWPASS_RANGE)
    }

    /// Create a mixer with a custom low-pass weight
    ///
    /// # Arguments
    ///
    /// * `range` - Fixed-point weight of the previous output (clamped to 0..=65536)
    pub fn with_range(range: i32) -> Self {
        Self {
            range: range.clamp(0, ONE as i32),
            left: 0,
            right: 0,
        }
    }

    /// Low-pass weight in use
    pub fn range(&self) -> i32 {
        self.range
    }

    /// Mix `input` into `output` in the selected mode
    ///
    /// Both slices must be the same length. A direct mix leaves the filter
    /// at the last sample written, so a later low-pass mix continues from
    /// the current signal.
    pub fn mix(&mut self, input: &[StereoSample], output: &mut [StereoSample], lowpass: bool) {
        debug_assert_eq!(input.len(), output.len());
        if lowpass {
            self.mix_lowpass(input, output);
        } else {
            Self::mix_direct(input, output);
            if let Some(last) = output.last() {
                self.left = last.left as i32;
                self.right = last.right as i32;
            }
        }
    }

    /// Copy samples unmodified
    pub fn mix_direct(input: &[StereoSample], output: &mut [StereoSample]) {
        output.copy_from_slice(input);
    }

    /// Filter samples through the single-pole low-pass
    ///
    /// Filter state carries over between calls.
    pub fn mix_lowpass(&mut self, input: &[StereoSample], output: &mut [StereoSample]) {
        let keep = self.range as i64;
        let take = ONE - keep;

        for (out, sample) in output.iter_mut().zip(input) {
            self.left = ((sample.left as i64 * take + self.left as i64 * keep) >> 16) as i32;
            self.right = ((sample.right as i64 * take + self.right as i64 * keep) >> 16) as i32;
            *out = StereoSample::new(self.left as i16, self.right as i16);
        }
    }
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}
