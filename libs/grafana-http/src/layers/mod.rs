//! Tower layers used by the client's middleware stack.
//!
//! - [`SetHeaderLayer`] - inserts a fixed header (User-Agent, Authorization)
//!   unless the request already carries one

mod set_header;

pub use set_header::{SetHeaderLayer, SetHeaderService};
