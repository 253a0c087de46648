//! External service integrations.

pub mod broker_client {
    pub use crate::broker_client::*;
}

pub mod services {
    pub use crate::services::*;
}
