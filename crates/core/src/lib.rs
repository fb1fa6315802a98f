//! # StudyBuddy Core
//!
//! Domain types, traits, and error definitions for the StudyBuddy study
//! assistant. This crate has **no framework dependencies**: it defines the
//! domain model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every collaborator of the ReAct loop is a trait here:
//! - [`Provider`]: the language model
//! - [`Tool`]: a capability the model may invoke
//! - [`MaterialStore`]: where uploaded study materials live
//!
//! Implementations live in their respective crates, and tests swap in
//! scripted stand-ins.

pub mod error;
pub mod event;
pub mod material;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, StoreError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use material::{Material, MaterialStore, MaterialSummary, MaterialType, SearchHit};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use tool::{Tool, ToolRegistry};
