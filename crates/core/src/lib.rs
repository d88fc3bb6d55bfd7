#![deny(warnings)]

pub mod analysis;
pub mod animal;
pub mod behavior;
pub mod config;
pub mod decode;
pub mod emotion;
pub mod features;
pub mod service;
pub mod storage;
pub mod training;

#[cfg(test)]
mod test_signals;
