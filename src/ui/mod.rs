//! Display layer: message text in, decorated HTML out.
//!
//! - [`markdown`]: the text renderer and the code block decorator.
//! - [`dom`]: the document the rendered fragments live in.
//! - [`copy`]: clipboard copy with per-control confirmation.
//! - [`message_list`]: ties the above together per message, in
//!   render, attach, decorate order.

pub mod copy;
pub mod dom;
pub mod markdown;
pub mod message_list;
