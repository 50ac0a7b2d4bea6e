//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LandedCostService / seed                                              │
//! │       │                                                                 │
//! │       │  db.hts_rates().get_by_code(&code)                             │
//! │       ▼                                                                 │
//! │  HtsRateRepository                                                     │
//! │  ├── get_by_code(&self, code)                                          │
//! │  ├── upsert(&self, record)                                             │
//! │  ├── replace_all(&self, records)                                       │
//! │  ├── search(&self, keyword, limit)                                     │
//! │  ├── suggest_codes(&self, code, limit)                                 │
//! │  └── count(&self)                                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`hts::HtsRateRepository`] - Tariff line storage, lookup and search

pub mod hts;
