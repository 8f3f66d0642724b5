use fretline_model::EventId;

/// Receiver of fire-and-forget notifications about on-screen note objects.
///
/// The rendering side owns object lifetimes; the judge only ever names an
/// event by its [`EventId`].
pub trait VisualRegistry {
    /// The event was hit; its object may be removed.
    fn request_despawn(&mut self, event: EventId);
    /// A long note was missed or released too early.
    fn mark_broken(&mut self, event: EventId);
    /// A long note was held to its end.
    fn mark_completed(&mut self, event: EventId);
}

/// Registry that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRegistry;

impl VisualRegistry for NullRegistry {
    fn request_despawn(&mut self, _event: EventId) {}
    fn mark_broken(&mut self, _event: EventId) {}
    fn mark_completed(&mut self, _event: EventId) {}
}

/// A notification received by [`RecordingRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryCall {
    Despawn(EventId),
    Broken(EventId),
    Completed(EventId),
}

/// Registry that records every notification in order (headless runs and tests).
#[derive(Debug, Default, Clone)]
pub struct RecordingRegistry {
    calls: Vec<RegistryCall>,
}

impl RecordingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RegistryCall] {
        &self.calls
    }

    pub fn count(&self, call: RegistryCall) -> usize {
        self.calls.iter().filter(|&&c| c == call).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl VisualRegistry for RecordingRegistry {
    fn request_despawn(&mut self, event: EventId) {
        self.calls.push(RegistryCall::Despawn(event));
    }

    fn mark_broken(&mut self, event: EventId) {
        self.calls.push(RegistryCall::Broken(event));
    }

    fn mark_completed(&mut self, event: EventId) {
        self.calls.push(RegistryCall::Completed(event));
    }
}
