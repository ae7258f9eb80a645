pub mod gateway;
pub mod login;
pub mod session_store;

pub use gateway::{Gateway, RequestOptions, SessionEvent};
pub use login::Authenticator;
pub use session_store::{FileSessionStore, MemorySessionStore, Session, SessionStore};
