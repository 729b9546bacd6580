// Miseventos HTTP Client
//
// reqwest-based client for the platform's REST backend. `Client` implements
// the core store traits (RemoteStore for every entity kind, SlotStore,
// RegistrationStore), so the draft lifecycle runs against it unchanged.

pub mod auth;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod stores;

pub use auth::AuthUser;
pub use client::{find_id, Client};
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::ClientError;
pub use stores::Resource;
