pub mod guard;
pub mod session;

pub use session::SessionContext;
