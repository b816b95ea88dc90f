//! Trellis Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trellis diagram
//! library and its CLI. It includes:
//!
//! - **Identifiers**: String-interned identifiers ([`identifier::Id`])
//! - **Colors**: CSS color parsing with Graphviz-friendly output ([`color::Color`])
//! - **Attributes**: Ordered Graphviz attribute maps ([`attributes::Attributes`])
//! - **Style**: Layout, curve, line and edge-direction enums ([`style`] module)

pub mod attributes;
pub mod color;
pub mod identifier;
pub mod style;
