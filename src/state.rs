//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds only immutable collaborators: the backend client, the session
//! cookie policy, and the gate policy. Who is signed in is per-request data
//! and lives in `gate::RequestContext`, never here.

use std::sync::Arc;

use crate::api::Backend;
use crate::gate::GatePolicy;
use crate::session::SessionCookie;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn Backend>,
    pub session: SessionCookie,
    pub gate: Arc<GatePolicy>,
}

impl AppState {
    #[must_use]
    pub fn new(api: Arc<dyn Backend>, session: SessionCookie, gate: GatePolicy) -> Self {
        Self { api, session, gate: Arc::new(gate) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
