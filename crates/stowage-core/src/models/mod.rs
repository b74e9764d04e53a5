//! Data models for the uploader
//!
//! Session metadata describes the automation session that produced an
//! artifact; upload requests and receipts are the values exchanged with an
//! uploader backend.

mod session;
mod upload;

pub use session::*;
pub use upload::*;
