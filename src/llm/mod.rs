pub mod client;
pub mod prompts;
pub mod response;
pub mod types;

pub use client::*;
pub use prompts::*;
pub use response::*;
pub use types::*;
