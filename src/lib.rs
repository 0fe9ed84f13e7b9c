//! # tsplay
//!
//! Run TypeScript playground files with tsx, driven by a declarative flag registry.

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod files;
pub mod flags;
pub mod install;
pub mod launcher;
pub mod parser;
pub mod runner;
