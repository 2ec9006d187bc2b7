//! Session based authentication backed by an external identity provider.
//!
//! The identity provider authenticates users and hands back a profile plus a
//! session token. The token is stored as a [session] and presented by clients
//! on later requests, either as a cookie or as a bearer token.

mod cookie;
mod identity_provider;
mod log_in;
mod log_out;
mod middleware;
mod session;
mod session_token;

pub use identity_provider::{
    DEFAULT_SESSION_DATA_URL, HttpIdentityProvider, IdentityProvider, ProviderSession,
};
pub use log_in::get_session_data;
pub use log_out::post_log_out;
pub use middleware::auth_guard;
pub use session::{DEFAULT_SESSION_DURATION, create_session_table};

pub(crate) use identity_provider::SESSION_ID_HEADER;

#[cfg(test)]
pub(crate) use session::{create_session, get_user_by_session_token};
#[cfg(test)]
pub(crate) use session_token::COOKIE_SESSION_TOKEN;
