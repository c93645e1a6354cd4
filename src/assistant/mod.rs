//! Chat assistant
//!
//! Offline keyword-matching reply engine. There is no model behind this;
//! answers come from canned nutrition guidance plus the stored profile.

mod reply;

pub use reply::{generate_reply, AssistantContext, GREETING, QUICK_QUESTIONS};
