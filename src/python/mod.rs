use pyo3::prelude::*;
use pyo3::wrap_pymodule;
use rdice_core::python::regional;

#[pymodule]
#[pyo3(name = "_lib")]
fn rdice(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_wrapped(wrap_pymodule!(regional))?;

    set_path(m, "rdice._lib.regional", "regional")?;
    Ok(())
}

/// Register a submodule in `sys.modules` so it can be imported by its dotted path.
fn set_path(m: &Bound<'_, PyModule>, path: &str, module: &str) -> PyResult<()> {
    let modules = m.py().import_bound("sys")?.getattr("modules")?;
    modules.set_item(path, m.getattr(module)?)
}
