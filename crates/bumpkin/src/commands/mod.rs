//! Command implementations

pub mod bump;

pub mod show;
