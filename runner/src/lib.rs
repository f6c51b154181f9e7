//! Session handling and command line front end of benchview

pub mod cli;
pub mod collector;
pub mod config;
pub mod report;
pub mod session;

#[cfg(test)]
mod test_util;
