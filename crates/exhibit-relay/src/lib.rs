//! exhibit-relay: presence and chat relay for a shared virtual exhibit.
//!
//! Every WebSocket connection becomes one participant with a random
//! appearance. Movement and chat from one participant are forwarded to
//! everyone else, and the full roster is pushed to all clients (debounced)
//! whenever someone joins or leaves. Nothing is persisted.

pub mod connection;
pub mod participant;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod roster;
pub mod server;

pub use participant::{Appearance, Participant, Rotation, Transform, Vec3};
pub use registry::Registry;
pub use relay::{Outcome, Relay};
pub use server::{start, ServerHandle};
