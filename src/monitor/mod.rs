use std::time::Duration;

/// The per-step scalar loss map consumed by the logger.
///
/// Entries keep insertion order, so the progress line reads in the order
/// the steps recorded them. Rebuilt every training step: the discriminator
/// step clears it, the generator step extends it.
#[derive(Clone, Debug, Default)]
pub struct LossBoard {
    entries: Vec<(String, f64)>,
}

impl LossBoard {
    #[inline]
    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Updates the tag in place, or appends it.
    pub fn put(
        &mut self,
        tag: &str,
        value: f64,
    ) -> &mut Self {
        match self.entries.iter_mut().find(|(entry, _)| entry == tag) {
            Some((_, entry)) => *entry = value,
            None => self.entries.push((tag.into(), value)),
        }
        self
    }

    #[inline]
    pub fn get(
        &self,
        tag: &str,
    ) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == tag)
            .map(|(_, value)| *value)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(tag, value)| (tag.as_str(), *value))
    }

    #[inline]
    pub fn tags(&self) -> Vec<&str> {
        self.entries.iter().map(|(tag, _)| tag.as_str()).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The metrics collaborator: accepts scalar records keyed by a
/// monotonically increasing global step.
pub trait ScalarSink {
    fn scalar(
        &mut self,
        tag: &str,
        value: f64,
        step: u64,
    );
}

/// A sink forwarding every scalar to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl ScalarSink for LogSink {
    fn scalar(
        &mut self,
        tag: &str,
        value: f64,
        step: u64,
    ) {
        log::info!(
            target: "exprgan::trainer::monitor",
            "{tag}: {value:.6} (step {step})",
        );
    }
}

/// Formats a wall-clock duration as `H:MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();

    format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60,
    )
}
