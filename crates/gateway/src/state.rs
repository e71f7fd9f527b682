//! Gateway application state.

use aegis_core::TriageCoordinator;

/// Application state shared across ingest handlers.
#[derive(Clone)]
pub struct AppState {
    /// The triage coordinator every event is routed through.
    pub coordinator: TriageCoordinator,
}

impl AppState {
    /// Create state around a coordinator.
    #[must_use]
    pub const fn new(coordinator: TriageCoordinator) -> Self {
        Self { coordinator }
    }
}
