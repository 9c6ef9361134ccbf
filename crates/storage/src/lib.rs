#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod cached_rest;
pub mod key_value;
pub mod local_storage;
pub mod rest;

#[cfg(test)]
mod tests;
