//! kubechart Core - Core types shared by the templater and the CLI
//!
//! This crate provides the foundational types used throughout kubechart:
//! - `Resource`: Read-only view of a manifest's kind/apiVersion/name/namespace
//! - `ResourceDescriptor`: Owned descriptor, usually extracted from YAML
//! - `Document`: One document of a multi-document manifest stream

pub mod document;
pub mod error;
pub mod resource;

pub use document::{Document, split_documents};
pub use error::{CoreError, Result};
pub use resource::{Resource, ResourceDescriptor};
