//! JSON persistence of LWPR models.
//!
//! ## Purpose
//!
//! This module saves and restores the complete state of an [`LwprModel`]
//! (hyperparameters, normalization, running statistics and every receptive
//! field) so that a restored model predicts and keeps learning exactly like
//! the original.
//!
//! ## Design notes
//!
//! * **serde**: The state types derive `Serialize`/`Deserialize` behind the
//!   `serde` feature; this module only adds the JSON entry points.
//! * **Structural validation**: A decoded model is checked for consistent
//!   dimensions before it is returned, so malformed input fails with
//!   `IoError` instead of producing a model that panics later.
//!
//! ## Non-goals
//!
//! * Binary or XML encodings.

// Feature-gated imports
use std::io::{Read, Write};
use std::string::{String, ToString};

// External dependencies
use serde::de::DeserializeOwned;
use serde::Serialize;

// Internal dependencies
use crate::adapters::online::LwprModel;
use crate::algorithms::receptive_field::ReceptiveField;
use crate::math::linalg::FloatLinalg;
use crate::primitives::errors::LwprError;
use crate::primitives::triangular::LowerTriangular;

impl<T> LwprModel<T>
where
    T: FloatLinalg + Serialize + DeserializeOwned,
{
    /// Encode the model as a JSON string.
    pub fn to_json(&self) -> Result<String, LwprError> {
        serde_json::to_string(self).map_err(|e| LwprError::IoError(e.to_string()))
    }

    /// Decode a model from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LwprError> {
        let model: Self = serde_json::from_str(json).map_err(|e| LwprError::IoError(e.to_string()))?;
        model.check_structure()?;
        Ok(model)
    }

    /// Write the model as JSON.
    pub fn save_json<W: Write>(&self, writer: W) -> Result<(), LwprError> {
        serde_json::to_writer(writer, self).map_err(|e| LwprError::IoError(e.to_string()))
    }

    /// Read a model written by [`save_json`](Self::save_json).
    pub fn load_json<R: Read>(reader: R) -> Result<Self, LwprError> {
        let model: Self = serde_json::from_reader(reader).map_err(|e| LwprError::IoError(e.to_string()))?;
        model.check_structure()?;
        Ok(model)
    }

    /// Check that every stored array has the size the dimensions imply.
    fn check_structure(&self) -> Result<(), LwprError> {
        let (n_in, n_out) = (self.n_in, self.n_out);
        let fail = |what: &str| Err(LwprError::IoError(format!("inconsistent model: {}", what)));

        if n_in == 0 || n_out == 0 {
            return fail("zero dimension");
        }
        if self.norm_in.len() != n_in || self.mean_x.len() != n_in || self.var_x.len() != n_in {
            return fail("input statistics length");
        }
        if self.norm_out.len() != n_out || self.sub_models.len() != n_out {
            return fail("output count");
        }
        if self.norm_in.iter().chain(&self.norm_out).any(|&v| !(v > T::zero())) {
            return fail("non-positive normalization");
        }
        if !triangle_ok(&self.config.init_factor, n_in) {
            return fail("initial metric");
        }
        for sm in &self.sub_models {
            if !sm.fields().iter().all(|rf| field_ok(rf, n_in)) {
                return fail("receptive field shape");
            }
        }
        Ok(())
    }
}

fn triangle_ok<T>(m: &LowerTriangular<T>, n: usize) -> bool
where
    T: FloatLinalg,
{
    m.dim() == n && m.as_slice().len() == LowerTriangular::<T>::packed_len(n)
}

fn field_ok<T: FloatLinalg>(rf: &ReceptiveField<T>, n: usize) -> bool {
    rf.center.len() == n
        && rf.metric.len() == n * n
        && rf.mean_x.len() == n
        && rf.var_x.len() == n
        && triangle_ok(&rf.factor, n)
        && triangle_ok(&rf.alpha, n)
        && triangle_ok(&rf.meta_b, n)
        && triangle_ok(&rf.meta_h, n)
        && rf.directions.len() <= n
        && rf.directions.iter().all(|d| {
            d.u.len() == n && d.p.len() == n && d.sxres_yres.len() == n && d.ss_xres.len() == n
        })
}
