//! Session-scoped client reuse.
//!
//! - [`SessionRegistry`]: one live client per session id
//! - [`SessionFactory`]: input validation, client lookup and the request pipeline

mod factory;
mod registry;

pub use factory::SessionFactory;
pub use registry::{SessionRegistry, SessionRegistryBuilder};
