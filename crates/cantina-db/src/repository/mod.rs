//! # Repository Module
//!
//! Typed access to the documents in the key/value store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  db.orders().get("order-id")                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderRepository            pool connection                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  order::load(&mut conn)     ◄── same function PosService calls with    │
//! │       │                         a transaction instead of a pool conn   │
//! │       ▼                                                                 │
//! │  kv_store["pos_orders"]  →  Vec<Order>                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each module exposes crate-level `load`/`store`-style functions over a
//! `&mut SqliteConnection` and a repository struct that runs them on a
//! pooled connection.
//!
//! ## Available Repositories
//!
//! - [`OrderRepository`] - Orders and their payments
//! - [`TableRepository`] - Floor plan and occupancy
//! - [`ProductRepository`] - Catalog and search
//! - [`CashRepository`] - Cash movements and closures
//! - [`SettingsRepository`] - General settings, dollar rate, ticket template
//! - [`TicketRepository`] - Issued tickets

pub mod cash;
pub mod order;
pub mod product;
pub mod settings;
pub mod table;
pub mod ticket;

pub use cash::CashRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use settings::SettingsRepository;
pub use table::TableRepository;
pub use ticket::TicketRepository;
