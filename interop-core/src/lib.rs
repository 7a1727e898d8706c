//! Core of the shader interop generator.
//!
//! Compiles annotated buffer block declarations out of shader source files
//! into Rust struct definitions whose in-memory layout matches the std140 or
//! std430 layout the GPU runtime will use, so host and device never disagree
//! about a byte offset.
//!
//! The pipeline is a single synchronous pass: [`parser::parse_files`] yields
//! sealed [`types::Block`]s with every field placed by the [`layout`] engine,
//! and [`emit::render_module`] turns them into one generated source file.

#![allow(clippy::uninlined_format_args)]

pub mod emit;
pub mod layout;
pub mod parser;
pub mod types;
