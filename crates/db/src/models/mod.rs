//! Database models for the runlog service.
//!
//! Each model owns its queries as associated async functions taking the pool,
//! and its own error enum. Linking operations live on the owning side of the
//! association ([`log`] and [`tag`]).

pub mod log;
pub mod pagination;
pub mod run;
pub mod tag;
pub mod user;
