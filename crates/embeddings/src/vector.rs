use std::ops::Deref;

/// Fixed-length embedding vector. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector(Box<[f32]>);

impl EmbeddingVector {
    /// Wrap raw components.
    pub fn new(values: Vec<f32>) -> Self {
        Self(values.into_boxed_slice())
    }

    /// Number of components.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

impl Deref for EmbeddingVector {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl AsRef<[f32]> for EmbeddingVector {
    fn as_ref(&self) -> &[f32] {
        &self.0
    }
}
