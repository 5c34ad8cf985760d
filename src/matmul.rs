//! Strided matrix multiplication used by [`Tensor`](crate::Tensor).
//!
//! Transposes are free: a [`MatRef`] carries its own row/column strides, so
//! `xᵀ · g` and `g · Wᵀ` in the Linear backward pass never copy a matrix.
//!
//! - default: a safe triple loop
//! - optional: the `matrixmultiply` backend (feature `matrixmultiply`)

/// Borrowed row-major matrix view with explicit strides.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatRef<'a> {
    pub data: &'a [f32],
    pub rows: usize,
    pub cols: usize,
    pub row_stride: usize,
    pub col_stride: usize,
}

impl<'a> MatRef<'a> {
    #[inline]
    pub fn row_major(data: &'a [f32], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self {
            data,
            rows,
            cols,
            row_stride: cols,
            col_stride: 1,
        }
    }

    /// Same storage viewed as the transpose.
    #[inline]
    pub fn t(self) -> Self {
        Self {
            data: self.data,
            rows: self.cols,
            cols: self.rows,
            row_stride: self.col_stride,
            col_stride: self.row_stride,
        }
    }

    #[cfg_attr(feature = "matrixmultiply", allow(dead_code))]
    #[inline]
    fn at(&self, r: usize, c: usize) -> f32 {
        self.data[r * self.row_stride + c * self.col_stride]
    }
}

/// `out = a · b`, with `out` row-major `(a.rows, b.cols)` and overwritten.
///
/// Callers validate `a.cols == b.rows`; this only re-checks in debug builds.
pub(crate) fn matmul_into(a: MatRef<'_>, b: MatRef<'_>, out: &mut [f32]) {
    debug_assert_eq!(a.cols, b.rows);
    debug_assert_eq!(out.len(), a.rows * b.cols);

    let (m, k, n) = (a.rows, a.cols, b.cols);
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        out.fill(0.0);
        return;
    }

    #[cfg(feature = "matrixmultiply")]
    {
        // SAFETY: both views index inside their slices for every (i, p) and (p, j)
        // with i < m, p < k, j < n; `out` holds exactly m * n elements.
        unsafe {
            matrixmultiply::sgemm(
                m,
                k,
                n,
                1.0,
                a.data.as_ptr(),
                a.row_stride as isize,
                a.col_stride as isize,
                b.data.as_ptr(),
                b.row_stride as isize,
                b.col_stride as isize,
                0.0,
                out.as_mut_ptr(),
                n as isize,
                1,
            );
        }
    }

    #[cfg(not(feature = "matrixmultiply"))]
    for i in 0..m {
        let row = &mut out[i * n..(i + 1) * n];
        for (j, slot) in row.iter_mut().enumerate() {
            let mut acc = 0.0_f32;
            for p in 0..k {
                acc = a.at(i, p).mul_add(b.at(p, j), acc);
            }
            *slot = acc;
        }
    }
}
