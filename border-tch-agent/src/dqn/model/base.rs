use super::DqnModelConfig;
use crate::{
    model::{ModelBase, SubModel},
    util::{NamedTensors, OutDim},
};
use anyhow::{anyhow, bail, Result};
use log::{info, trace};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tch::{nn, Device, Tensor};

/// Action-value function of a DQN agent.
pub struct DqnModel<Q>
where
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    device: Device,
    var_store: nn::VarStore,

    // Dimension of the output vector (equal to the number of actions).
    pub(super) out_dim: i64,

    // Action-value function
    q: Q,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    /// Builds a model with randomly initialized parameters.
    pub fn build(config: DqnModelConfig<Q::Config>, device: Device) -> Result<Self> {
        let q_config = config
            .q_config
            .ok_or_else(|| anyhow!("No configuration of the Q-network is given"))?;
        let out_dim = q_config.get_out_dim();
        if out_dim <= 0 {
            bail!("The number of actions must be positive, got {}", out_dim);
        }
        let var_store = nn::VarStore::new(device);
        let q = Q::build(&var_store, q_config);

        Ok(Self {
            device,
            var_store,
            out_dim,
            q,
        })
    }

    /// Builds a model and loads its parameters from a file.
    ///
    /// The returned model is frozen.
    pub fn from_file(
        config: DqnModelConfig<Q::Config>,
        device: Device,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let mut model = Self::build(config, device)?;
        model.load(path)?;
        Ok(model)
    }

    /// Outputs the action-value given an observation.
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let a = self.q.forward(x);
        debug_assert_eq!(a.size().as_slice()[1], self.out_dim);
        a
    }

    /// Returns the number of actions.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }

    /// Returns the device where the parameters live.
    pub fn device(&self) -> Device {
        self.device
    }

    /// Returns `true` if no parameter requires gradients.
    pub fn is_frozen(&self) -> bool {
        self.var_store
            .variables()
            .values()
            .all(|t| !t.requires_grad())
    }
}

impl<Q> ModelBase for DqnModel<Q>
where
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    fn get_var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.var_store
    }

    fn get_var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Save DQN model to {:?}", path.as_ref());
        Ok(())
    }

    /// Loads parameters, verifying names and shapes, then freezes the model.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        let named_tensors = NamedTensors::read(path.as_ref(), self.device)?;
        named_tensors.copy_to(&mut self.var_store)?;
        for name in named_tensors.named_tensors.keys() {
            trace!("Load variable {}", name);
        }
        self.var_store.freeze();
        info!("Load DQN model from {:?}", path.as_ref());
        Ok(())
    }
}
