//! Dispatch configuration
//!
//! Configuration only decides which diagnostics reach the observer. It never
//! changes how an event is routed.

/// Diagnostic switches for an event record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Report handlers whose unhandled counter did not move
    pub report_unhandled: bool,
    /// Report each parent → child forward
    pub trace_delegation: bool,
    /// Report re-typed dispatches
    pub trace_redispatch: bool,
    /// Report unexpected handler failures before they are wrapped
    pub report_failures: bool,
}

impl DispatchConfig {
    /// Everything on
    pub fn verbose() -> Self {
        DispatchConfig {
            report_unhandled: true,
            trace_delegation: true,
            trace_redispatch: true,
            report_failures: true,
        }
    }

    /// Nothing reported
    pub fn quiet() -> Self {
        DispatchConfig {
            report_unhandled: false,
            trace_delegation: false,
            trace_redispatch: false,
            report_failures: false,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::verbose()
    }
}
