//! Command implementations

pub mod bump;

pub mod speak;
