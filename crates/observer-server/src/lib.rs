//! Configuration for the Observer server binary.
//!
//! ```toml
//! host      = "0.0.0.0"
//! port      = 8080
//! guild_ids = [81384788765712384]
//!
//! [store]
//! backend         = "sqlite"
//! path            = "~/.local/share/observer/status.db"
//! busy_timeout_ms = 5000
//! ```

pub mod settings;

pub use settings::{ServerConfig, StoreConfig};
