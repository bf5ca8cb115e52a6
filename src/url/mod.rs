//! URL handling module for Recipe-Ripple
//!
//! This module provides URL normalization and domain extraction. Every URL
//! that enters the frontier or the visited set goes through `normalize_url`
//! first so that trivially different spellings of one page dedupe.

mod domain;
mod normalize;

pub use domain::extract_domain;
pub use normalize::{normalize_url, resolve_link};
