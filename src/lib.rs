pub mod backend;
pub mod config;
pub mod error;
pub mod gallery;
pub mod image_processing;
pub mod model;
pub mod pages;

#[cfg(test)]
mod test_utils;
