pub mod config;
pub mod deps;
pub mod enums;
pub mod error;
pub mod ingestor;
pub mod queue;
pub mod rate_limit;
pub mod vector;

pub use config::AppConfig;
pub use deps::ServiceDeps;
pub use error::{CoreError, CoreResult};
