//! # trellis-std
//!
//! Standard implementations for the Trellis request pipeline.
//!
//! This crate provides:
//! - **The event bus**: [`BusBuilder`] / [`EventBus`], a priority-ordered,
//!   frozen-after-build subscriber registry
//! - **Built-in stage listeners**: routing, dispatch, the middleware bridge,
//!   rendering, error responses, finish logging
//! - **A path routing backend**: [`PathRouter`]
//! - **A typed service registry**: [`ServiceRegistry`]
//! - **Testing utilities**: recorders and fixed-output fakes
//!
//! [`BusBuilder`]: bus::BusBuilder
//! [`EventBus`]: bus::EventBus
//! [`PathRouter`]: routing::PathRouter
//! [`ServiceRegistry`]: registry::ServiceRegistry

#![warn(missing_docs)]

pub use trellis_core;

pub mod bus;
pub mod listeners;
pub mod registry;
pub mod routing;
pub mod testing;
