// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod proxy_handlers {
    pub use crate::proxy_handlers::*;
}

pub mod mail_handlers {
    pub use crate::mail_handlers::*;
}
