// Topicguard Kernel
//
// Policy checks for Kafka topic definitions: pure, deterministic, and
// free of I/O. Hosts feed in parsed source files and get back issues with
// optional fixes.

pub mod adapters;
pub mod check;
pub mod config;
pub mod fix;
pub mod index;
pub mod issue;
pub mod rules;
pub mod source;
pub mod units;

#[cfg(test)]
mod testing;
