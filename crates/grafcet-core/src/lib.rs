//! GRAFCET Core Types and Definitions
//!
//! This crate provides the foundational types shared by the GRAFCET compiler
//! and simulation engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Actions**: Action qualifiers and action blocks ([`action`] module)
//! - **Durations**: Time literal parsing shared by the DSL and conditions ([`duration`] module)
//! - **Diagram**: The positioned diagram graph produced by the compiler ([`diagram`] module)

pub mod action;
pub mod diagram;
pub mod duration;
pub mod geometry;
pub mod identifier;
