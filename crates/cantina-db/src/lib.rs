//! # cantina-db: Storage Layer for Cantina POS
//!
//! Persists the cantina-core records in SQLite through sqlx and performs the
//! writes that span several records as single transactions.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cantina POS Data Flow                             │
//! │                                                                         │
//! │  UI (order screen, cash drawer, settings)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   cantina-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌───────────────┐   ┌──────────────────┐  │   │
//! │  │   │  PosService  │──►│ Repositories  │──►│  KvStore         │  │   │
//! │  │   │ (service.rs) │   │ order, table, │   │  (storage.rs)    │  │   │
//! │  │   │ transactions │   │ cash, ticket… │   │  JSON documents  │  │   │
//! │  │   └──────┬───────┘   └───────────────┘   └────────┬─────────┘  │   │
//! │  │          │ cantina-core rules                     │            │   │
//! │  └──────────┼────────────────────────────────────────┼────────────┘   │
//! │             ▼                                        ▼                │
//! │  Order::save, PaymentProcessor,          SQLite (kv_store table)      │
//! │  CashLedger                                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`config`] - Environment-driven configuration
//! - [`storage`] - Key/value documents
//! - [`repository`] - Typed repositories over the documents
//! - [`service`] - Transactional order, payment and cash operations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cantina_db::{Database, PosConfig, PosService};
//!
//! let config = PosConfig::from_env();
//! let db = Database::new(config.db_config()).await?;
//! let pos = PosService::open(db, &config).await?;
//!
//! let order = pos.save_order(draft, Utc::now()).await?;
//! let settlement = pos.settle_payment(&order.id, &request, "María", Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod service;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::PosConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    CashRepository, OrderRepository, ProductRepository, SettingsRepository, TableRepository,
    TicketRepository,
};
pub use service::PosService;
pub use storage::{KvStore, StorageKey};
