/// Receives `(processed, total)` after each file-level step.
///
/// Implementations must return quickly; operations call this inline between
/// file copies.
pub trait ProgressReporter {
    fn report(&mut self, processed: usize, total: usize);
}

impl<F> ProgressReporter for F
where
    F: FnMut(usize, usize),
{
    fn report(&mut self, processed: usize, total: usize) {
        self(processed, total)
    }
}

/// Reporter that ignores every update.
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

#[cfg(test)]
impl ProgressReporter for NoProgress {
    fn report(&mut self, _processed: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_progress_is_silent() {
        let mut reporter = NoProgress;
        reporter.report(1, 1);
    }

    #[test]
    fn test_closure_reporter_receives_updates() {
        let mut seen = Vec::new();
        {
            let mut reporter = |done: usize, total: usize| seen.push((done, total));
            reporter.report(1, 3);
            reporter.report(2, 3);
        }
        assert_eq!(seen, vec![(1, 3), (2, 3)]);
    }
}
