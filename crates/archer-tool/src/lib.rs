//! Host tool discovery for archer.
//!
//! # Architecture
//!
//! - `locator.rs` - Name to executable path lookup
//! - `command.rs` - Timeout-bounded probe invocations
//! - `variant.rs` - Implementation classification from version banners
//! - `compat.rs` - Per-implementation flag compatibility table
//! - `resolver.rs` - Ordered, cached tool and tool-group resolution

pub use compat::{Rule, sanitize_flags, supports};
pub use error::{Error, Result};
pub use locator::{ChainLocator, PathLocator, StaticLocator, ToolLocator};
pub use resolver::{ResolvedTool, ResolverOptions, ToolResolver};
pub use variant::{StaticProbe, ToolFamily, Variant, VariantProbe, VersionProbe, classify_banner};

pub mod command;
pub mod compat;
mod error;
mod locator;
mod resolver;
pub mod variant;
