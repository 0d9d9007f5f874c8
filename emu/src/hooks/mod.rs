pub mod clock;
pub mod dump;
pub mod intr;
pub mod midi;

use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use thiserror::Error;

use crate::model::{Step, Vm};

/// Side effect run around the VM. Hooks take the VM by value so the driver
/// can fold it through all of them after every tick.
pub trait Hook {
    fn init(&mut self, vm: Vm) -> Vm;
    fn exec(&mut self, time: u64, step: Step, vm: Vm) -> Vm;
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to open file: {0}")]
    Open(String, #[source] std::io::Error),

    #[error("Malformed config {0}: {1}")]
    Yaml(String, #[source] serde_yaml::Error),
}

/// Read a YAML hook configuration.
fn read_yaml<T: DeserializeOwned>(fname: &str) -> Result<T, ConfigError> {
    let file = File::open(fname).map_err(|e| ConfigError::Open(fname.to_string(), e))?;
    serde_yaml::from_reader(BufReader::new(file)).map_err(|e| ConfigError::Yaml(fname.to_string(), e))
}
