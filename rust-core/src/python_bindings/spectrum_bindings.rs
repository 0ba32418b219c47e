//! Python bindings for one-off spectral transforms

use pyo3::prelude::*;
use numpy::{PyArray1, PyReadonlyArray1};
use crate::spectrum::{SpectralTransform, TransformConfig};

/// Transform one frame with the default Hann window and raw modulus scale
///
/// Args:
///     signal: Frame as numpy array, length a power of two
///     sample_rate_hz: Sample rate in Hz
///
/// Returns:
///     Tuple of (frequencies, magnitudes) numpy arrays, N/2 entries each
#[pyfunction]
pub fn transform<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    sample_rate_hz: f64,
) -> PyResult<(&'py PyArray1<f64>, &'py PyArray1<f64>)> {
    let samples = signal
        .as_slice()
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

    let mut transform = SpectralTransform::new(TransformConfig {
        frame_size: samples.len(),
        ..Default::default()
    })
    .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

    let bins = transform
        .transform(&samples.to_vec().into(), sample_rate_hz)
        .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(e.to_string()))?;

    let frequencies: Vec<f64> = bins.iter().map(|b| b.frequency).collect();
    let magnitudes: Vec<f64> = bins.iter().map(|b| b.magnitude).collect();

    Ok((
        PyArray1::from_vec(py, frequencies),
        PyArray1::from_vec(py, magnitudes),
    ))
}
