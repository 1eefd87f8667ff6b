//! Mattermost integration for the poll service:
//!
//! - **Messages** (`message`) - typed attachment/action wire payloads
//! - **Rendering** (`render`) - running and finished poll views, the
//!   per-option vote buttons, and the user-vote summary
//! - **Directory** (`directory`) - batched user-id to username resolution
//!   with graceful degradation
//! - **URLs** (`urls`) - callback and asset addresses
//! - **Help** (`help`) - bundled usage page
//!
//! Everything here is request-scoped: payloads are recomputed from the
//! current poll state on every render and nothing is cached between
//! invocations.

pub mod directory;
pub mod help;
pub mod message;
pub mod render;
pub mod urls;

pub use directory::{NameResolver, UserDirectory, RESOLVE_FAILED_SENTINEL};
pub use message::{Action, ActionContext, Attachment, CommandResponse, Field, ResponseType};
pub use render::{format_actions, format_poll, format_running_poll, format_user_vote};
pub use urls::PollUrls;
