//! Command implementations for the scanner binary

pub mod commands;
