use super::AtariCnnConfig;
use crate::model::SubModel;
use tch::{nn, nn::Module, Device, Kind, Tensor};

/// Convolutional neural network for Atari games, which has the same architecture of the DQN paper.
///
/// Parameters are named after the indices of an equivalent PyTorch `nn.Sequential`
/// stored under `network`, i.e., `network.0.weight`, ..., `network.9.bias`,
/// so that parameters exported from PyTorch can be loaded without renaming.
pub struct AtariCnn {
    device: Device,
    seq: nn::Sequential,
}

impl AtariCnn {
    fn stride(s: i64) -> nn::ConvConfig {
        nn::ConvConfig {
            stride: s,
            ..Default::default()
        }
    }

    /// Scales pixel intensities in `[0, 255]` to `[0, 1]`.
    pub fn normalize(xs: &Tensor) -> Tensor {
        xs.to_kind(Kind::Float) / 255.0
    }

    fn create_net(var_store: &nn::VarStore, n_stack: i64, out_dim: i64) -> nn::Sequential {
        let p = &(var_store.root() / "network");
        nn::seq()
            .add_fn(Self::normalize)
            .add(nn::conv2d(p / "0", n_stack, 32, 8, Self::stride(4)))
            .add_fn(|xs| xs.relu())
            .add(nn::conv2d(p / "2", 32, 64, 4, Self::stride(2)))
            .add_fn(|xs| xs.relu())
            .add(nn::conv2d(p / "4", 64, 64, 3, Self::stride(1)))
            .add_fn(|xs| xs.relu().flat_view())
            .add(nn::linear(p / "7", 3136, 512, Default::default()))
            .add_fn(|xs| xs.relu())
            .add(nn::linear(p / "9", 512, out_dim, Default::default()))
    }
}

impl SubModel for AtariCnn {
    type Config = AtariCnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    /// Returns action values of shape `[batch, out_dim]`.
    ///
    /// An unbatched input of shape `[n_stack, 84, 84]` is treated as a batch of one.
    fn forward(&self, x: &Self::Input) -> Tensor {
        let x = x.to_device(self.device);
        let x = if x.dim() == 3 { x.unsqueeze(0) } else { x };
        self.seq.forward(&x)
    }

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Self {
        Self {
            device: var_store.device(),
            seq: Self::create_net(var_store, config.n_stack, config.out_dim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    fn cnn(out_dim: i64) -> (nn::VarStore, AtariCnn) {
        let vs = nn::VarStore::new(Device::Cpu);
        let config = AtariCnnConfig {
            n_stack: 4,
            out_dim,
        };
        let cnn = AtariCnn::build(&vs, config);
        (vs, cnn)
    }

    #[test]
    fn output_has_one_value_per_action() {
        let (_vs, cnn) = cnn(6);

        let xs = Tensor::zeros([2, 4, 84, 84], (Kind::Uint8, Device::Cpu));
        assert_eq!(cnn.forward(&xs).size(), vec![2, 6]);

        let x = Tensor::zeros([4, 84, 84], (Kind::Uint8, Device::Cpu));
        assert_eq!(cnn.forward(&x).size(), vec![1, 6]);
    }

    #[test]
    fn normalized_pixels_lie_in_unit_interval() {
        let pixels = (0..=255u8).collect::<Vec<_>>();
        let xs = AtariCnn::normalize(&Tensor::from_slice(&pixels));
        let xs = Vec::<f32>::try_from(&xs).unwrap();

        assert!(xs.iter().all(|&x| (0.0..=1.0).contains(&x)));
        assert_eq!(xs[0], 0.0);
        assert_eq!(xs[255], 1.0);
    }

    #[test]
    fn parameters_follow_sequential_layout() {
        let (vs, _cnn) = cnn(4);
        let mut names = vs.variables().into_keys().collect::<Vec<_>>();
        names.sort();

        let expected = ["0", "2", "4", "7", "9"]
            .iter()
            .flat_map(|ix| {
                vec![
                    format!("network.{}.bias", ix),
                    format!("network.{}.weight", ix),
                ]
            })
            .collect::<Vec<_>>();
        assert_eq!(names, expected);
        assert_eq!(vs.variables()["network.7.weight"].size(), vec![512, 3136]);
    }
}
