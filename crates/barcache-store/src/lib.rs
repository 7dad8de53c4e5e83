//! SQLite-backed candle store for barcache.
//!
//! This crate owns the on-disk cache:
//!
//! - [`CacheDir`] - Raw base-directory value with `${TMP}`/`${CACHE}` tokens
//! - [`CacheLocator`] - Maps a partition to `base/provider/symbol/interval/db.sql`
//! - [`CandleStore`] - Idempotent batch upserts and ordered range queries
//! - [`CacheError`] - Distinct error conditions for every failure mode

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/barcache/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod locator;
mod schema;
mod store;

pub use error::{CacheError, Result};
pub use locator::{
    CACHE_TOKEN, CacheDir, CacheLocator, DEFAULT_CACHE_DIR, DEFAULT_PROVIDER, TMP_TOKEN,
    UNIT_FILE_NAME,
};
pub use store::{CandleStore, StoreConfig};
