//! Motor safety controller and UDP command protocol for a single-axis lift.
//!
//! The crate is hardware-agnostic: pins come in through `embedded-hal` traits
//! and the network through [`utils::connection::DatagramTransport`], with an
//! `embassy-net` implementation provided.
#![no_std]

pub mod utils;
