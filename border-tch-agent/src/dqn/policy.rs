//! Greedy policy on a Q-network.
use super::{DqnModel, GreedyPolicyConfig};
use crate::{model::SubModel, util::OutDim};
use anyhow::Result;
use border_core::{Configurable, Env, Policy};
use log::{info, trace};
use serde::{de::DeserializeOwned, Serialize};
use std::{convert::TryFrom, marker::PhantomData};
use tch::Tensor;

/// Selects the action with the highest Q-value.
///
/// Ties are broken toward the lowest action index. The Q-network is frozen,
/// so the policy never updates its parameters.
pub struct GreedyPolicy<E, Q>
where
    E: Env,
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    qnet: DqnModel<Q>,
    phantom: PhantomData<E>,
}

impl<E, Q> GreedyPolicy<E, Q>
where
    E: Env,
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    /// Constructs a policy on a Q-network.
    pub fn new(qnet: DqnModel<Q>) -> Self {
        Self {
            qnet,
            phantom: PhantomData,
        }
    }

    /// Returns the Q-network.
    pub fn qnet(&self) -> &DqnModel<Q> {
        &self.qnet
    }

    /// Returns Q-values of shape `[1, n_actions]` for an observation.
    pub fn q_values(&self, obs: &E::Obs) -> Tensor
    where
        E::Obs: Into<Tensor>,
    {
        tch::no_grad(|| self.qnet.forward(&obs.clone().into()))
    }
}

impl<E, Q> Policy<E> for GreedyPolicy<E, Q>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim,
{
    fn sample(&mut self, obs: &E::Obs) -> Result<E::Act> {
        let q = self.q_values(obs);
        trace!("Q-values: {:?}", Vec::<f32>::try_from(&q.flatten(0, -1)));
        let a = q.f_argmax(-1, true)?;
        Ok(a.into())
    }
}

impl<E, Q> Configurable<E> for GreedyPolicy<E, Q>
where
    E: Env,
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    type Config = GreedyPolicyConfig<Q::Config>;

    /// Builds the Q-network and loads its parameters from `config.model_path`.
    fn build(config: Self::Config) -> Result<Self> {
        let device = config
            .device
            .map(tch::Device::from)
            .unwrap_or_else(tch::Device::cuda_if_available);
        let qnet = DqnModel::from_file(config.model_config, device, &config.model_path)?;
        info!(
            "Greedy policy with {} actions on {:?}",
            qnet.out_dim(),
            device
        );

        Ok(Self::new(qnet))
    }
}
