#![allow(dead_code)]

#[cfg(unix)]
pub mod fake_tool;
pub mod segment_server;
