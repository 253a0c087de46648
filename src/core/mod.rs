// Domain-layer modules and shared errors/models
pub mod validators {
    pub use crate::validators::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod session {
    pub use crate::session::*;
}

pub mod errors {
    pub use crate::errors::*;
}
