use safetensors::tensor::{Dtype, TensorView, View};
use std::borrow::Cow;

/// An owned, little-endian tensor as stored in the container file.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTensor {
    dtype: Dtype,
    shape: Vec<usize>,
    data: Vec<u8>,
}

impl StoredTensor {
    pub fn from_f64(shape: Vec<usize>, values: &[f64]) -> Self {
        Self {
            dtype: Dtype::F64,
            shape,
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    pub fn from_i64(shape: Vec<usize>, values: &[i64]) -> Self {
        Self {
            dtype: Dtype::I64,
            shape,
            data: values.iter().flat_map(|v| v.to_le_bytes()).collect(),
        }
    }

    /// Packs labels as newline-separated UTF-8 bytes in a flat `U8` tensor.
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let data = labels
            .iter()
            .map(|label| label.as_ref())
            .collect::<Vec<_>>()
            .join("\n")
            .into_bytes();
        Self {
            dtype: Dtype::U8,
            shape: vec![data.len()],
            data,
        }
    }

    pub(crate) fn from_view(view: &TensorView<'_>) -> Self {
        Self {
            dtype: view.dtype(),
            shape: view.shape().to_vec(),
            data: view.data().to_vec(),
        }
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decodes an `F64` tensor; `None` for any other dtype.
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        if self.dtype != Dtype::F64 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(8)
                .map(|chunk| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(chunk);
                    f64::from_le_bytes(bytes)
                })
                .collect(),
        )
    }

    /// Decodes an `I64` tensor; `None` for any other dtype.
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        if self.dtype != Dtype::I64 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(8)
                .map(|chunk| {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(chunk);
                    i64::from_le_bytes(bytes)
                })
                .collect(),
        )
    }

    /// Unpacks a tensor built by [`StoredTensor::from_labels`]; `None` for any other dtype or invalid UTF-8.
    pub fn to_labels(&self) -> Option<Vec<String>> {
        if self.dtype != Dtype::U8 {
            return None;
        }
        let text = std::str::from_utf8(&self.data).ok()?;
        if text.is_empty() {
            return Some(Vec::new());
        }
        Some(text.split('\n').map(str::to_string).collect())
    }
}

impl View for &StoredTensor {
    fn dtype(&self) -> Dtype {
        self.dtype
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.data)
    }

    fn data_len(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_values_decode_bit_exactly() {
        let values = [0.1, -2.5e-300, f64::MAX, 1.0 / 3.0];
        let tensor = StoredTensor::from_f64(vec![2, 2], &values);
        assert_eq!(tensor.shape(), &[2, 2]);
        assert_eq!(tensor.bytes().len(), 32);
        let decoded = tensor.to_f64_vec().unwrap();
        for (a, b) in values.iter().zip(&decoded) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        assert!(tensor.to_i64_vec().is_none());
    }

    #[test]
    fn i64_values_decode() {
        let tensor = StoredTensor::from_i64(vec![2, 2], &[0, 1, 1, 2]);
        assert_eq!(tensor.dtype(), Dtype::I64);
        assert_eq!(tensor.to_i64_vec().unwrap(), vec![0, 1, 1, 2]);
        assert!(tensor.to_f64_vec().is_none());
    }

    #[test]
    fn labels_are_packed_as_bytes() {
        let tensor = StoredTensor::from_labels(&["A:1", "A:52A", "B:7:CA"]);
        assert_eq!(tensor.dtype(), Dtype::U8);
        assert_eq!(tensor.shape(), &[tensor.bytes().len()]);
        assert_eq!(tensor.to_labels().unwrap(), vec!["A:1", "A:52A", "B:7:CA"]);
        assert!(tensor.to_f64_vec().is_none());
        assert!(StoredTensor::from_f64(vec![1], &[1.0]).to_labels().is_none());
    }
}
