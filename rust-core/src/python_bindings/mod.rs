//! PyO3 bindings for Python integration

use pyo3::prelude::*;

mod session_bindings;
mod spectrum_bindings;

/// Python module definition
#[pymodule]
fn vibration_monitor(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<session_bindings::PyMonitorSession>()?;
    m.add_function(wrap_pyfunction!(spectrum_bindings::transform, m)?)?;

    Ok(())
}
