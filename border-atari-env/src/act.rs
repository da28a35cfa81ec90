//! Action of [`BorderAtariEnv`](crate::BorderAtariEnv).
use border_core::Act;

/// Index into the minimal action set of the game.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderAtariAct {
    pub act: u8,
}

impl BorderAtariAct {
    pub fn new(act: u8) -> Self {
        Self { act }
    }
}

impl Act for BorderAtariAct {
    fn len(&self) -> usize {
        1
    }
}

impl From<u8> for BorderAtariAct {
    fn from(act: u8) -> Self {
        Self { act }
    }
}

#[cfg(feature = "tch")]
impl From<tch::Tensor> for BorderAtariAct {
    /// Takes the first element of a tensor of action indices, like the output
    /// of `argmax` with a batch of one.
    fn from(t: tch::Tensor) -> Self {
        let a = t.flatten(0, -1).int64_value(&[0]);
        Self { act: a as u8 }
    }
}

#[cfg(all(test, feature = "tch"))]
mod tests {
    use super::*;

    #[test]
    fn from_argmax() {
        let q = tch::Tensor::from_slice(&[0.1f32, 0.7, 0.7, 0.2]).reshape(&[1, 4]);
        let a: BorderAtariAct = q.argmax(-1, true).into();
        assert_eq!(a, BorderAtariAct::new(1));
    }
}
