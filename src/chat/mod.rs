//! Chat assistant integration
//!
//! The assistant endpoint answers a message with a reply text, an optional
//! action token and an optional summary. Instead of the reply reaching into
//! unrelated panels, the action is decoded into a [`ChatAction`] and handed
//! to an [`ActionDispatcher`], which maps it to named [`RefreshOp`]s and runs
//! them against a [`RefreshHandler`].

mod dispatcher;
mod reply;

pub use dispatcher::{ActionDispatcher, DispatchReport, RefreshHandler};
pub use reply::{ChatAction, ChatReply, ChatSummary, RefreshOp, CONNECTION_TROUBLE, NO_REPLY};
