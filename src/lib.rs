pub mod cli;
pub mod config;
pub mod db;

#[cfg(test)]
mod config_test;
