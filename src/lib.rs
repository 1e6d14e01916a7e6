//! esxkit library
//!
//! Tools for Ekahau `.esx` site-survey projects: reading and rewriting the
//! archive, clustering access points into rows and columns, and renaming
//! them deterministically from their positions on each floor plan.

pub mod cli;
pub mod cluster;
pub mod config;
pub mod constants;
pub mod esx;
pub mod models;
pub mod rename;
pub mod services;
