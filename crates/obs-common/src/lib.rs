//! Shared value types for the observation interpolation engine.
//!
//! This crate holds the leaf types the rest of the engine is built on:
//!
//! - Geometry primitives ([`Point`], [`BoundingBox`], [`MultiPolygon`]) used
//!   as query inputs and outputs, including WKT parsing for the lexical forms
//!   accepted at the query boundary.
//! - Temporal intervals ([`TemporalInterval`]) over date or date-time
//!   granularity, producing lazy, restartable step sequences and an exact
//!   scalar mapping for interpolation math.
//!
//! Nothing in this crate performs I/O; everything is a plain value type.

pub mod error;
pub mod geometry;
pub mod temporal;

pub use error::{CommonError, Result};
pub use geometry::{BoundingBox, MultiPolygon, Point};
pub use temporal::{Granularity, TemporalInterval, TimeStamp, TimeSteps};
