//! orma — a minimal async object-relational mapping layer.
//!
//! This facade crate re-exports the orma sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use orma::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature     | Default | Crate                       |
//! |-------------|---------|-----------------------------|
//! | `data-sqlx` | **yes** | `orma-data-sqlx`            |
//! | `mysql`     | **yes** | `orma-data-sqlx/mysql`      |
//! | `postgres`  | no      | `orma-data-sqlx/postgres`   |
//! | `sqlite`    | no      | `orma-data-sqlx/sqlite`     |
//!
//! `orma-core` (configuration, tracing setup) and `orma-data` (column
//! descriptors, entity mapper, models) are always available.

pub use orma_core;
pub use orma_data;

#[cfg(feature = "data-sqlx")]
pub use orma_data_sqlx;

pub use orma_core::{init_tracing, LogFormat, OrmaConfig};

/// Unified prelude — import everything with `use orma::prelude::*`.
pub mod prelude {
    pub use orma_core::{ConfigProperties, OrmaConfig};
    pub use orma_data::prelude::*;

    #[cfg(feature = "data-sqlx")]
    pub use orma_data_sqlx::prelude::*;
}
