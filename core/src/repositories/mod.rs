pub mod token;

pub use token::{InMemoryTokenRepository, RefreshTokenRepository};
