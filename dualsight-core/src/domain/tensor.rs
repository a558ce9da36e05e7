//! The fixed-layout model input tensor.

use crate::core::errors::{ClassifyError, ClassifyResult};
use ndarray::{Array4, ArrayView4};

/// Four dimensional f32 tensor in NCHW order.
pub type Tensor4D = Array4<f32>;

/// Number of color planes in an encoded tensor (R, G, B).
pub const TENSOR_CHANNELS: usize = 3;

/// A single image encoded as a `[1, 3, H, W]` float32 tensor.
///
/// Data is planar: the whole R plane, then G, then B, each in row-major
/// pixel order. The shape is validated when the tensor is built and cannot
/// change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    data: Tensor4D,
}

impl ImageTensor {
    /// Builds a tensor from planar data of `3 * height * width` values.
    pub fn from_planar(height: usize, width: usize, data: Vec<f32>) -> ClassifyResult<Self> {
        if height == 0 || width == 0 {
            return Err(ClassifyError::invalid_input(format!(
                "tensor spatial dims must be non-zero, got {height}x{width}"
            )));
        }
        let expected = TENSOR_CHANNELS * height * width;
        if data.len() != expected {
            return Err(ClassifyError::invalid_input(format!(
                "planar data has {} values, expected {expected} for shape [1, 3, {height}, {width}]",
                data.len()
            )));
        }
        let data = Array4::from_shape_vec((1, TENSOR_CHANNELS, height, width), data)?;
        Ok(Self { data })
    }

    /// Wraps an existing NCHW array after checking it holds one RGB image.
    pub fn from_array(data: Tensor4D) -> ClassifyResult<Self> {
        let shape = data.shape();
        if shape[0] != 1 || shape[1] != TENSOR_CHANNELS || shape[2] == 0 || shape[3] == 0 {
            return Err(ClassifyError::invalid_input(format!(
                "expected tensor shape [1, 3, H, W], got {shape:?}"
            )));
        }
        Ok(Self {
            data: data.as_standard_layout().into_owned(),
        })
    }

    /// Tensor shape as `[1, 3, H, W]`.
    pub fn shape(&self) -> [usize; 4] {
        let s = self.data.shape();
        [s[0], s[1], s[2], s[3]]
    }

    /// Spatial size as `(height, width)`.
    pub fn spatial(&self) -> (usize, usize) {
        let [_, _, h, w] = self.shape();
        (h, w)
    }

    /// Borrowed view suitable for binding as a session input.
    pub fn view(&self) -> ArrayView4<'_, f32> {
        self.data.view()
    }

    /// Flat planar values.
    pub fn as_slice(&self) -> &[f32] {
        // Always standard layout: built from a Vec or via `as_standard_layout`.
        self.data.as_slice().unwrap_or(&[])
    }

    /// Values of a single color plane (0 = R, 1 = G, 2 = B).
    pub fn plane(&self, channel: usize) -> Option<&[f32]> {
        if channel >= TENSOR_CHANNELS {
            return None;
        }
        let (h, w) = self.spatial();
        let len = h * w;
        self.as_slice().get(channel * len..(channel + 1) * len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_planar_validates_length() {
        assert!(ImageTensor::from_planar(2, 2, vec![0.0; 12]).is_ok());
        assert!(ImageTensor::from_planar(2, 2, vec![0.0; 11]).is_err());
        assert!(ImageTensor::from_planar(0, 2, vec![]).is_err());
    }

    #[test]
    fn test_planes_are_contiguous() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let tensor = ImageTensor::from_planar(2, 2, data).unwrap();
        assert_eq!(tensor.shape(), [1, 3, 2, 2]);
        assert_eq!(tensor.plane(0).unwrap(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(tensor.plane(2).unwrap(), &[8.0, 9.0, 10.0, 11.0]);
        assert!(tensor.plane(3).is_none());
    }

    #[test]
    fn test_from_array_rejects_batches() {
        let batch = Tensor4D::zeros((2, 3, 4, 4));
        assert!(ImageTensor::from_array(batch).is_err());
        let gray = Tensor4D::zeros((1, 1, 4, 4));
        assert!(ImageTensor::from_array(gray).is_err());
        let ok = Tensor4D::zeros((1, 3, 4, 4));
        assert_eq!(ImageTensor::from_array(ok).unwrap().spatial(), (4, 4));
    }
}
