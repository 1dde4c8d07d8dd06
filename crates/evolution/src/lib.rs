pub mod api;
pub mod driver;
pub mod error;
pub mod session;
pub mod types;

pub use api::EvolutionApi;
pub use driver::{SessionCommand, SessionDriver, SessionHandle};
pub use error::{ApiError, ApiResult};
pub use session::{SessionEvent, SessionState};
pub use types::*;
