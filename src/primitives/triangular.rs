//! Packed lower-triangular matrices.
//!
//! ## Purpose
//!
//! Receptive fields store the factor of their distance metric, together with
//! the per-element learning rates and meta-learning traces that share its
//! shape, as square lower-triangular matrices. This module provides that
//! storage and the handful of products the metric code needs.
//!
//! ## Design notes
//!
//! * **Packing rule**: Row `i` holds the `i + 1` entries `(i, 0) ..= (i, i)`,
//!   stored contiguously. Row `i` starts at offset `i * (i + 1) / 2`, so an
//!   `n x n` matrix occupies `n * (n + 1) / 2` values.
//! * **Implicit zeros**: Entries above the diagonal are never stored; reading
//!   them yields zero and writing them is a logic error.
//! * **Factor convention**: A metric factor `L` represents `D = L * Lᵀ`
//!   (equivalently `D = Mᵀ * M` with `M = Lᵀ` upper triangular). Any such
//!   product is symmetric positive semi-definite by construction.
//!
//! ## Invariants
//!
//! * `data.len() == dim * (dim + 1) / 2`.
//!
//! ## Non-goals
//!
//! * This is not a general matrix type; only the operations used by LWPR exist.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// LowerTriangular
// ============================================================================

/// Square lower-triangular matrix in packed row storage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LowerTriangular<T> {
    dim: usize,
    data: Vec<T>,
}

impl<T: Float> LowerTriangular<T> {
    /// Number of stored values for a matrix of the given dimension.
    #[inline]
    pub const fn packed_len(dim: usize) -> usize {
        dim * (dim + 1) / 2
    }

    #[inline]
    const fn offset(row: usize) -> usize {
        row * (row + 1) / 2
    }

    /// All-zero matrix.
    pub fn zeros(dim: usize) -> Self {
        Self::filled(dim, T::zero())
    }

    /// Matrix with every stored (lower) entry set to `value`.
    pub fn filled(dim: usize, value: T) -> Self {
        Self {
            dim,
            data: vec![value; Self::packed_len(dim)],
        }
    }

    /// `scale * I`.
    pub fn scaled_identity(dim: usize, scale: T) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.set(i, i, scale);
        }
        m
    }

    /// Diagonal matrix with the given diagonal.
    pub fn from_diagonal(diag: &[T]) -> Self {
        let mut m = Self::zeros(diag.len());
        for (i, &v) in diag.iter().enumerate() {
            m.set(i, i, v);
        }
        m
    }

    /// Take the lower triangle of a dense row-major `dim x dim` matrix.
    pub fn from_dense(dense: &[T], dim: usize) -> Self {
        debug_assert_eq!(dense.len(), dim * dim);
        let mut data = Vec::with_capacity(Self::packed_len(dim));
        for i in 0..dim {
            data.extend_from_slice(&dense[i * dim..i * dim + i + 1]);
        }
        Self { dim, data }
    }

    /// Rebuild from raw packed storage. Returns `None` if the length is wrong.
    pub fn from_packed(dim: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == Self::packed_len(dim)).then_some(Self { dim, data })
    }

    /// Matrix dimension.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Packed storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Entry `(i, j)`; zero above the diagonal.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        if j > i {
            T::zero()
        } else {
            self.data[Self::offset(i) + j]
        }
    }

    /// Set entry `(i, j)` with `j <= i`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        debug_assert!(j <= i, "write above the diagonal at ({}, {})", i, j);
        self.data[Self::offset(i) + j] = value;
    }

    /// Stored part of row `i` (`i + 1` entries).
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = Self::offset(i);
        &self.data[start..start + i + 1]
    }

    /// Largest absolute stored entry.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &v| acc.max(v.abs()))
    }

    /// Trace of `L * Lᵀ`, i.e. the sum of squares of all entries.
    pub fn gram_trace(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &v| acc + v * v)
    }

    /// `out = Lᵀ * x`.
    pub fn transpose_mul_into(&self, x: &[T], out: &mut [T]) {
        debug_assert_eq!(x.len(), self.dim);
        debug_assert_eq!(out.len(), self.dim);
        out.iter_mut().for_each(|o| *o = T::zero());
        for i in 0..self.dim {
            let xi = x[i];
            for (o, &l) in out.iter_mut().zip(self.row(i)) {
                *o = *o + l * xi;
            }
        }
    }

    /// Write `L * Lᵀ` into a dense row-major `dim x dim` buffer.
    pub fn gram_into(&self, out: &mut [T]) {
        let n = self.dim;
        debug_assert_eq!(out.len(), n * n);
        for a in 0..n {
            let row_a = self.row(a);
            for b in 0..=a {
                let row_b = self.row(b);
                let s = row_a[..=b]
                    .iter()
                    .zip(row_b)
                    .fold(T::zero(), |acc, (&p, &q)| acc + p * q);
                out[a * n + b] = s;
                out[b * n + a] = s;
            }
        }
    }

    /// Dense row-major copy with explicit zeros above the diagonal.
    pub fn to_dense(&self) -> Vec<T> {
        let n = self.dim;
        let mut dense = vec![T::zero(); n * n];
        for i in 0..n {
            dense[i * n..i * n + i + 1].copy_from_slice(self.row(i));
        }
        dense
    }
}
