//! Row-major `f32` tensor.
//!
//! The network only needs rank 1 (bias vectors) and rank 2 (`[batch, features]`)
//! tensors, but the shape is kept as a general list so constructors can reject
//! anything the layers cannot consume.
//!
//! Arithmetic helpers panic on shape mismatch: they sit on the forward/backward
//! hot path where a wrong shape is a programmer error. Constructors that take
//! caller data return [`Result`].

use std::fmt;

use crate::matmul::{MatRef, matmul_into};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Tensor {
    /// Build a tensor from a flat row-major buffer.
    pub fn from_vec(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let expected = checked_numel(shape)?;
        if data.len() != expected {
            return Err(Error::ShapeMismatch(format!(
                "buffer of length {} cannot have shape {shape:?} ({expected} elements)",
                data.len()
            )));
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }

    /// Build a `[rows.len(), cols]` matrix from per-row vectors.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(Error::ShapeMismatch(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            shape: vec![rows.len(), cols],
        })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![0.0; shape.iter().product()],
            shape: shape.to_vec(),
        }
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Leading dimension of a matrix. Panics if the tensor is not rank 2.
    #[inline]
    pub fn rows(&self) -> usize {
        self.assert_matrix();
        self.shape[0]
    }

    /// Trailing dimension of a matrix. Panics if the tensor is not rank 2.
    #[inline]
    pub fn cols(&self) -> usize {
        self.assert_matrix();
        self.shape[1]
    }

    #[inline]
    pub fn row(&self, idx: usize) -> &[f32] {
        let cols = self.cols();
        &self.data[idx * cols..(idx + 1) * cols]
    }

    #[inline]
    pub fn row_mut(&mut self, idx: usize) -> &mut [f32] {
        let cols = self.cols();
        &mut self.data[idx * cols..(idx + 1) * cols]
    }

    /// One slice per row; a `[n, 0]` matrix yields `n` empty rows.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f32]> {
        let cols = self.cols();
        (0..self.rows()).map(move |r| &self.data[r * cols..(r + 1) * cols])
    }

    /// `self · other` for `[m, k] · [k, n]`.
    pub fn matmul(&self, other: &Tensor) -> Tensor {
        self.matmul_views(self.as_mat(), other.as_mat())
    }

    /// `selfᵀ · other` for `[k, m]ᵀ · [k, n]`.
    pub fn t_matmul(&self, other: &Tensor) -> Tensor {
        self.matmul_views(self.as_mat().t(), other.as_mat())
    }

    /// `self · otherᵀ` for `[m, k] · [n, k]ᵀ`.
    pub fn matmul_t(&self, other: &Tensor) -> Tensor {
        self.matmul_views(self.as_mat(), other.as_mat().t())
    }

    fn matmul_views(&self, a: MatRef<'_>, b: MatRef<'_>) -> Tensor {
        assert_eq!(
            a.cols, b.rows,
            "cannot multiply [{}, {}] by [{}, {}]",
            a.rows, a.cols, b.rows, b.cols
        );
        let mut out = Tensor::zeros(&[a.rows, b.cols]);
        matmul_into(a, b, &mut out.data);
        out
    }

    /// Adds a `[cols]` vector to every row of a `[rows, cols]` matrix.
    pub fn add_row(&mut self, bias: &Tensor) {
        let cols = self.cols();
        assert_eq!(
            bias.shape(),
            &[cols],
            "bias shape {:?} cannot broadcast over {:?}",
            bias.shape(),
            self.shape
        );
        for row in self.data.chunks_exact_mut(cols.max(1)) {
            for (v, &b) in row.iter_mut().zip(&bias.data) {
                *v += b;
            }
        }
    }

    /// Column sums of a `[rows, cols]` matrix, i.e. the sum over the batch axis.
    pub fn sum_rows(&self) -> Tensor {
        let cols = self.cols();
        let mut out = Tensor::zeros(&[cols]);
        for row in self.rows_iter() {
            for (acc, &v) in out.data.iter_mut().zip(row) {
                *acc += v;
            }
        }
        out
    }

    pub fn map(&self, f: impl Fn(f32) -> f32) -> Tensor {
        Tensor {
            data: self.data.iter().map(|&v| f(v)).collect(),
            shape: self.shape.clone(),
        }
    }

    /// Elementwise combination of two same-shaped tensors.
    pub fn zip_map(&self, other: &Tensor, f: impl Fn(f32, f32) -> f32) -> Tensor {
        self.assert_same_shape(other, "zip_map");
        Tensor {
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            shape: self.shape.clone(),
        }
    }

    /// `self += alpha * other`.
    pub fn axpy(&mut self, alpha: f32, other: &Tensor) {
        self.assert_same_shape(other, "axpy");
        for (v, &o) in self.data.iter_mut().zip(&other.data) {
            *v = alpha.mul_add(o, *v);
        }
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    /// Index of the largest entry in each row; ties resolve to the first index.
    ///
    /// Panics on zero-width rows of a non-empty matrix.
    pub fn argmax_rows(&self) -> Vec<usize> {
        assert!(
            self.rows() == 0 || self.cols() > 0,
            "argmax_rows: rows of shape {:?} have no entries",
            self.shape
        );
        self.rows_iter()
            .map(|row| {
                let mut best = 0;
                for (i, &v) in row.iter().enumerate() {
                    if v > row[best] {
                        best = i;
                    }
                }
                best
            })
            .collect()
    }

    /// Copies the given rows (in order) into a new `[indices.len(), cols]` matrix.
    pub fn gather_rows(&self, indices: &[usize]) -> Tensor {
        let cols = self.cols();
        let mut data = Vec::with_capacity(indices.len() * cols);
        for &idx in indices {
            data.extend_from_slice(self.row(idx));
        }
        Tensor {
            data,
            shape: vec![indices.len(), cols],
        }
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    #[inline]
    pub(crate) fn assert_same_shape(&self, other: &Tensor, op: &str) {
        assert_eq!(
            self.shape, other.shape,
            "{op}: shape {:?} does not match {:?}",
            self.shape, other.shape
        );
    }

    #[inline]
    fn assert_matrix(&self) {
        assert_eq!(
            self.shape.len(),
            2,
            "expected a [rows, cols] matrix, got shape {:?}",
            self.shape
        );
    }

    #[inline]
    fn as_mat(&self) -> MatRef<'_> {
        MatRef::row_major(&self.data, self.rows(), self.cols())
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor{:?}", self.shape)
    }
}

fn checked_numel(shape: &[usize]) -> Result<usize> {
    shape.iter().try_fold(1_usize, |acc, &d| {
        acc.checked_mul(d)
            .ok_or_else(|| Error::ShapeMismatch(format!("shape {shape:?} overflows usize")))
    })
}
