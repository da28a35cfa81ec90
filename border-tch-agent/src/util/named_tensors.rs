use crate::dqn::WeightLoadError;
use log::trace;
use std::{collections::HashMap, iter::FromIterator, path::Path};
use tch::{nn::VarStore, Device, TchError, Tensor};

/// Named tensors read from a parameter file, to be copied into a [`VarStore`].
pub struct NamedTensors {
    pub named_tensors: HashMap<String, Tensor>,
}

impl NamedTensors {
    /// Reads named tensors from a file onto the given device.
    ///
    /// The format is chosen by the extension: `.safetensors`, `.npz`, or otherwise
    /// the libtorch archive format written by [`VarStore::save`].
    pub fn read(path: &Path, device: Device) -> Result<Self, WeightLoadError> {
        if !path.is_file() {
            return Err(WeightLoadError::FileNotFound(path.to_path_buf()));
        }

        let unreadable = |source: TchError| WeightLoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        };
        let named_tensors = match path.extension().and_then(|e| e.to_str()) {
            Some("safetensors") => Tensor::read_safetensors(path).map_err(unreadable)?,
            Some("npz") => Tensor::read_npz(path).map_err(unreadable)?,
            _ => Tensor::load_multi_with_device(path, device).map_err(unreadable)?,
        };

        Ok(Self {
            named_tensors: HashMap::from_iter(named_tensors.into_iter().map(|(k, v)| {
                trace!("Read tensor {} {:?}", k, v.size());
                (k, v.to_device(device))
            })),
        })
    }

    /// Copies data of a [`VarStore`] to CPU.
    pub fn copy_from(vs: &VarStore) -> Self {
        let src = vs.variables();

        tch::no_grad(|| NamedTensors {
            named_tensors: HashMap::from_iter(src.iter().map(|(k, v)| {
                let v = v.detach().to(Device::Cpu).data();
                (k.clone(), v)
            })),
        })
    }

    /// Checks that the tensors match the variables of a [`VarStore`] one to one
    /// with identical shapes.
    pub fn check_compatible(&self, vs: &VarStore) -> Result<(), WeightLoadError> {
        let dest = vs.variables();

        let mut names = dest.keys().collect::<Vec<_>>();
        names.sort();
        for name in names {
            let src = self
                .named_tensors
                .get(name)
                .ok_or_else(|| WeightLoadError::MissingParameter(name.clone()))?;
            let (expected, found) = (dest[name].size(), src.size());
            if expected != found {
                return Err(WeightLoadError::ShapeMismatch {
                    name: name.clone(),
                    expected,
                    found,
                });
            }
        }

        let mut unexpected = self
            .named_tensors
            .keys()
            .filter(|name| !dest.contains_key(*name))
            .collect::<Vec<_>>();
        unexpected.sort();
        match unexpected.first() {
            Some(name) => Err(WeightLoadError::UnexpectedParameter((*name).clone())),
            None => Ok(()),
        }
    }

    /// Copies the tensors into a [`VarStore`] after [`NamedTensors::check_compatible`].
    pub fn copy_to(&self, vs: &mut VarStore) -> Result<(), WeightLoadError> {
        self.check_compatible(vs)?;
        let dest = &mut vs.variables();

        tch::no_grad(|| {
            for (name, src) in self.named_tensors.iter() {
                if let Some(dest) = dest.get_mut(name) {
                    dest.f_copy_(src).map_err(|source| WeightLoadError::Copy {
                        name: name.clone(),
                        source,
                    })?;
                }
            }
            Ok::<(), WeightLoadError>(())
        })
    }
}
