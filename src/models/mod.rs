pub mod context;
pub mod document;
pub mod requirement;
pub mod session;
pub mod stage;

pub use context::*;
pub use document::*;
pub use requirement::*;
pub use session::*;
pub use stage::*;
