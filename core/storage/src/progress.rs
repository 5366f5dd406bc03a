//! Progress indication around network calls.

/// Presentation hook invoked around long-running remote calls.
///
/// Implementations must not fail; progress has no bearing on results.
pub trait Progress: Send + Sync {
    /// A remote call started.
    fn start(&self, message: &str);

    /// The call finished, successfully or not.
    fn finish(&self);
}

/// Progress sink that shows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn start(&self, _message: &str) {}

    fn finish(&self) {}
}

/// Guard that finishes the progress indication when dropped.
pub struct ProgressScope<'a> {
    progress: &'a dyn Progress,
}

impl<'a> ProgressScope<'a> {
    pub fn start(progress: &'a dyn Progress, message: &str) -> Self {
        progress.start(message);
        Self { progress }
    }
}

impl Drop for ProgressScope<'_> {
    fn drop(&mut self) {
        self.progress.finish();
    }
}
