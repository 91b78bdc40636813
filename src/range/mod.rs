pub use burn::config::Config;

/// A periodic trigger over iteration counters.
///
/// It hits when `(iteration + offset) % step == 0`.
#[derive(Config, Copy, Debug, PartialEq)]
pub struct Cadence {
    pub step: u64,

    #[config(default = "0")]
    pub offset: u64,
}

impl Cadence {
    /// A cadence hitting at iterations `0, step, 2 * step, ..`.
    #[inline]
    pub fn every(step: u64) -> Self {
        Self::new(step)
    }

    /// A cadence hitting at iterations `step - 1, 2 * step - 1, ..`,
    /// matching `(iteration + 1) % step == 0` checks.
    #[inline]
    pub fn shifted(step: u64) -> Self {
        Self::new(step).with_offset(1)
    }

    #[inline]
    pub fn hits(
        &self,
        iteration: u64,
    ) -> bool {
        (iteration + self.offset) % self.step == 0
    }
}
