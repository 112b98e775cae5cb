//! line_rover_core - Pure no_std logic for the line_rover firmware
//!
//! This crate contains the platform-agnostic pieces of the line-following
//! robot: sensor pattern rules, path encoding, follower state types, wire
//! protocol types and the hardware seams. Everything here can be tested on
//! the host without hardware.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Actuation, sensing and time are injected via traits
//!
//! # Modules
//!
//! - [`sensors`]: Five-channel snapshot, intersection and centering rules
//! - [`path`]: Turn operators and the bounded path they form
//! - [`follower`]: Follower state codes, node labels, status snapshot
//! - [`parameters`]: Follower timing parameters
//! - [`protocol`]: Command, response and telemetry wire types
//! - [`traits`]: Time, actuation and sensing abstractions
//! - [`motor`]: H-bridge motors and the differential drive leaf

#![no_std]

#[cfg(test)]
extern crate std;

pub mod follower;
pub mod motor;
pub mod parameters;
pub mod path;
pub mod protocol;
pub mod sensors;
pub mod traits;
