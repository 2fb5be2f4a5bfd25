//! Error types for entity wiring

use thiserror::Error;

use crate::{ConnectionId, TransportId};

/// Core entity errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("{transport} is already bound to {connection}")]
    TransportAlreadyBound {
        transport: TransportId,
        connection: ConnectionId,
    },

    #[error("{connection} already has {transport}")]
    ConnectionAlreadyBound {
        connection: ConnectionId,
        transport: TransportId,
    },
}

/// Result type for entity operations
pub type CoreResult<T> = Result<T, CoreError>;
