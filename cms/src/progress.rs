use indicatif::{ProgressBar, ProgressStyle};

/// Byte counter for a running transfer, drawn as a progress bar against the
/// estimated total. Display only: going past the estimate just grows the bar.
pub struct TransferProgress {
    bar: ProgressBar,
    estimated: u64,
    observed: u64,
}

impl TransferProgress {
    pub fn new(estimated: u64) -> Self {
        let bar = ProgressBar::new(estimated);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self::with_bar(bar, estimated)
    }

    /// A progress counter that draws nothing.
    pub fn hidden(estimated: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(estimated);
        Self::with_bar(bar, estimated)
    }

    fn with_bar(bar: ProgressBar, estimated: u64) -> Self {
        Self {
            bar,
            estimated,
            observed: 0,
        }
    }

    pub fn observe(&mut self, bytes: u64) {
        self.observed += bytes;
        if self.observed > self.bar.length().unwrap_or(0) {
            self.bar.set_length(self.observed);
        }
        self.bar.inc(bytes);
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn estimated(&self) -> u64 {
        self.estimated
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_observed_bytes() {
        let mut progress = TransferProgress::hidden(100);
        progress.observe(40);
        progress.observe(50);
        assert_eq!(progress.observed(), 90);
        assert_eq!(progress.estimated(), 100);
    }

    #[test]
    fn test_overrunning_the_estimate_is_fine() {
        let mut progress = TransferProgress::hidden(10);
        progress.observe(25);
        assert_eq!(progress.observed(), 25);
        assert_eq!(progress.estimated(), 10);
        progress.finish("done");
    }

    #[test]
    fn test_zero_estimate() {
        let mut progress = TransferProgress::hidden(0);
        progress.observe(0);
        progress.observe(7);
        assert_eq!(progress.observed(), 7);
    }
}
