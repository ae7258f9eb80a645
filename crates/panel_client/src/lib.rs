//! Panel Client
//!
//! Client for the bookings admin panel API (bots, services, reservations).
//!
//! # Features
//! - JWT login with the token pair persisted across runs
//! - Authenticated request gateway with transparent refresh on 401 and a single retry
//! - Forced logout and session events when the refresh token is no longer accepted
//! - Typed resource clients and dashboard statistics

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

pub use api::{DashboardStats, PanelApi};
pub use auth::{
    Authenticator, FileSessionStore, Gateway, MemorySessionStore, RequestOptions, Session,
    SessionEvent, SessionStore,
};
pub use config::ClientConfig;
pub use error::{ApiError, AuthError, GatewayError, RefreshError, StoreError};
