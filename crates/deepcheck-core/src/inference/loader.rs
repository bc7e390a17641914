//! Model weight loading from safetensors files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use safetensors::SafeTensors;
use tracing::debug;

use crate::error::{DetectError, Result};

/// Loads a safetensors file and creates a `VarBuilder` over its tensors.
///
/// # Errors
///
/// Returns [`DetectError::ModelLoad`] if the file cannot be read or is not
/// valid safetensors data.
pub fn load_safetensors(path: impl AsRef<Path>, device: &Device) -> Result<VarBuilder<'static>> {
    let path = path.as_ref();
    read_tensors(path, device).map_err(DetectError::ModelLoad)
}

fn read_tensors(path: &Path, device: &Device) -> anyhow::Result<VarBuilder<'static>> {
    debug!("Loading safetensors from {}", path.display());

    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read model file: {}", path.display()))?;

    let tensors = SafeTensors::deserialize(&data)
        .with_context(|| format!("Failed to parse safetensors: {}", path.display()))?;

    let mut tensor_map: HashMap<String, Tensor> = HashMap::new();
    for name in tensors.names() {
        let view = tensors
            .tensor(name)
            .with_context(|| format!("Failed to get tensor '{name}'"))?;

        let dtype = safetensors_dtype_to_candle(view.dtype())?;
        let tensor = Tensor::from_raw_buffer(view.data(), dtype, view.shape(), device)
            .with_context(|| format!("Failed to create tensor '{name}'"))?;

        tensor_map.insert(name.clone(), tensor);
    }

    debug!("Loaded {} tensors from {}", tensor_map.len(), path.display());
    Ok(VarBuilder::from_tensors(tensor_map, DType::F32, device))
}

fn safetensors_dtype_to_candle(dtype: safetensors::Dtype) -> anyhow::Result<DType> {
    use safetensors::Dtype as S;
    match dtype {
        S::F32 => Ok(DType::F32),
        S::F64 => Ok(DType::F64),
        S::F16 => Ok(DType::F16),
        S::BF16 => Ok(DType::BF16),
        S::I64 => Ok(DType::I64),
        S::U8 => Ok(DType::U8),
        S::U32 => Ok(DType::U32),
        other => anyhow::bail!("Unsupported dtype: {other:?}"),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_safetensors(name: &str, shape: Vec<usize>, values: &[f32]) -> NamedTempFile {
        use safetensors::tensor::TensorView;

        let bytes: &[u8] = bytemuck::cast_slice(values);
        let view = TensorView::new(safetensors::Dtype::F32, shape, bytes).expect("valid view");
        let serialized =
            safetensors::serialize(HashMap::from([(name.to_string(), view)]), &None)
                .expect("serialize");

        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(&serialized).expect("write");
        file
    }

    #[test]
    fn test_load_safetensors() {
        let file = write_safetensors("dense.weight", vec![2, 2], &[1.0, 2.0, 3.0, 4.0]);
        let vb = load_safetensors(file.path(), &Device::Cpu).expect("loads");

        let t = vb.get((2, 2), "dense.weight").expect("tensor present");
        let values = t.to_vec2::<f32>().expect("f32 values");
        assert_eq!(values, vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
    }

    #[test]
    fn test_load_missing_file_is_model_load_error() {
        let result = load_safetensors("/nonexistent/g1.safetensors", &Device::Cpu);
        assert!(matches!(result, Err(DetectError::ModelLoad(_))));
    }

    #[test]
    fn test_load_garbage_is_model_load_error() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"not a safetensors file").expect("write");

        let result = load_safetensors(file.path(), &Device::Cpu);
        assert!(matches!(result, Err(DetectError::ModelLoad(_))));
    }
}
