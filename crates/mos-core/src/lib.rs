//! Single-device analyses built on the mos-devices kernels: operating
//! point, terminal sweeps, a run store and PSF-style text export.

pub mod analysis;
pub mod engine;
pub mod error;
pub mod psf;
pub mod result_store;

pub use error::{CoreError, Result};
