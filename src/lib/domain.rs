//! Domain types and service traits

pub mod communication;
