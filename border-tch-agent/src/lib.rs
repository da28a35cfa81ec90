//! Pretrained DQN policies implemented with [tch](https://crates.io/crates/tch).
pub mod cnn;
pub mod dqn;
pub mod model;
pub mod util;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// Device for using tch-rs.
///
/// This enum is added because [`tch::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),

    /// Metal Performance Shaders.
    Mps,
}

impl Device {
    /// Returns a GPU device if available, otherwise the CPU.
    pub fn cuda_if_available() -> Self {
        tch::Device::cuda_if_available().into()
    }
}

impl From<tch::Device> for Device {
    fn from(device: tch::Device) -> Self {
        match device {
            tch::Device::Cuda(n) => Self::Cuda(n),
            tch::Device::Mps => Self::Mps,
            _ => Self::Cpu,
        }
    }
}

impl From<Device> for tch::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => tch::Device::Cpu,
            Device::Cuda(n) => tch::Device::Cuda(n),
            Device::Mps => tch::Device::Mps,
        }
    }
}

impl FromStr for Device {
    type Err = anyhow::Error;

    /// Parses `cpu`, `cuda`, `cuda:<n>` or `mps`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.as_str() {
            "cpu" => Ok(Self::Cpu),
            "cuda" | "gpu" => Ok(Self::Cuda(0)),
            "mps" => Ok(Self::Mps),
            _ => match s.strip_prefix("cuda:") {
                Some(n) => Ok(Self::Cuda(n.parse()?)),
                None => Err(anyhow::anyhow!("Unknown device: {}", s)),
            },
        }
    }
}
