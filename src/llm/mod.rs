pub mod chat;
pub mod client;
pub mod error;
pub mod extraction;
pub mod prompts;

pub use chat::*;
pub use client::*;
pub use error::*;
pub use extraction::*;
pub use prompts::*;
