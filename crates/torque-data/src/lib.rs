//! Data-driven mechanics configuration for Torque.
//!
//! Loads a `mechanics.{ron,toml,json}` file describing manager limits and a
//! catalog of named blocks, and resolves it into a [`RotationConfig`] plus a
//! [`BlockCatalog`] that builds nodes for placement.
//!
//! [`RotationConfig`]: torque_rotation::RotationConfig

pub mod catalog;
pub mod loader;
pub mod schema;

pub use catalog::{BlockCatalog, BlockSpec, MechanicsData};
pub use loader::{DataLoadError, load_mechanics, load_mechanics_file};
