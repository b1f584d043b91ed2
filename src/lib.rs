//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-sync`, `core-runtime`, `platform-traits`). Host
//! applications can depend on `console-workspace` and enable the documented
//! features without needing to wire each crate individually.
