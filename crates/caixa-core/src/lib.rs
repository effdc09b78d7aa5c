//! # caixa-core: Pure Business Logic for Caixa POS
//!
//! This crate is the **heart** of the Caixa POS backend. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Caixa POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Web/Auth Shell (out of scope)                  │   │
//! │  │    routes ──► forms ──► typed inputs ──► rendered responses    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    caixa-db (services)                          │   │
//! │  │    finalize_sale, register_payment, recompute, reports          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ caixa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │ validation│  │   │
//! │  │   │ Customer  │  │   Money   │  │  credit   │  │   rules   │  │   │
//! │  │   │   Sale    │  │   cents   │  │  limits   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   no database, no clock, no network: plain data in, data out   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain entities and enums (Customer, Product, Sale, ...)
//! - [`money`] - Integer-centavo Money arithmetic
//! - [`ledger`] - Credit-ledger rules (limit checks, settlement)
//! - [`error`] - Typed domain errors
//! - [`validation`] - Input validation
//!
//! ## Ground Rules
//!
//! Everything here is a pure function over owned data: no I/O, no global
//! state, no panicking paths. Monetary fields are `i64` centavos (see
//! [`money`] for why floats are banned), and every failure is a typed
//! error the caller can match on.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caixa_core::Money` instead of
// `use caixa_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items in a single sale. A till transaction past this
/// size is almost certainly a client bug.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity on a single line. Catches fat-finger entries like
/// 1000 where 10 was meant.
pub const MAX_LINE_QUANTITY: i64 = 999;
