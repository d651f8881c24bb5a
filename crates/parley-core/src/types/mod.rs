//! Core type definitions used across the Parley workspace.

pub mod id;

pub use id::*;
