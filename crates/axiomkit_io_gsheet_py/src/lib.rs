use axiomkit_io_gsheet::{
    GSheetError, SpecSheetFormatConfig, SpecSheetFormatOutcome, SpecSheetFormatOverrides,
    format_sheet,
};
use pyo3::prelude::*;
use pyo3::types::PyDict;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "axiomkit.gsheet.format_sheet.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "SheetFormatOutcome")]
#[derive(Debug, Clone)]
struct PySheetFormatOutcome {
    #[pyo3(get)]
    success: bool,
    #[pyo3(get)]
    message: String,
}

impl From<SpecSheetFormatOutcome> for PySheetFormatOutcome {
    fn from(outcome: SpecSheetFormatOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
        }
    }
}

#[pymethods]
impl PySheetFormatOutcome {
    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict_outcome = PyDict::new(py);
        dict_outcome.set_item("success", self.success)?;
        dict_outcome.set_item("message", self.message.as_str())?;
        Ok(dict_outcome)
    }

    fn __bool__(&self) -> bool {
        self.success
    }

    fn __repr__(&self) -> String {
        format!(
            "SheetFormatOutcome(success={}, message={:?})",
            if self.success { "True" } else { "False" },
            self.message
        )
    }
}

/// Environment config with explicit keyword arguments layered on top.
fn derive_bridge_config(
    client_email: Option<String>,
    private_key: Option<String>,
    spreadsheet_id: Option<String>,
    sheet_id: Option<i64>,
) -> Result<SpecSheetFormatConfig, GSheetError> {
    SpecSheetFormatConfig::from_env_with(SpecSheetFormatOverrides {
        client_email,
        private_key,
        spreadsheet_id,
        sheet_id,
    })
}

fn run_format_sheet(
    config: SpecSheetFormatConfig,
) -> Result<SpecSheetFormatOutcome, GSheetError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| GSheetError::Runtime(err.to_string()))?;
    Ok(runtime.block_on(format_sheet(&config)))
}

#[pyfunction(name = "format_sheet")]
#[pyo3(signature = (
    client_email = None,
    private_key = None,
    spreadsheet_id = None,
    sheet_id = None
))]
fn format_sheet_py(
    py: Python<'_>,
    client_email: Option<String>,
    private_key: Option<String>,
    spreadsheet_id: Option<String>,
    sheet_id: Option<i64>,
) -> PySheetFormatOutcome {
    let outcome = py.allow_threads(|| {
        derive_bridge_config(client_email, private_key, spreadsheet_id, sheet_id)
            .and_then(run_format_sheet)
            .unwrap_or_else(|err| {
                tracing::error!(error = %err, "failed to format sheet");
                SpecSheetFormatOutcome::failed()
            })
    });
    PySheetFormatOutcome::from(outcome)
}

#[pyfunction(name = "init_logging")]
#[pyo3(signature = (level = None))]
fn init_logging_py(level: Option<&str>) -> bool {
    axiomkit_log::init_logging(level)
}

#[pymodule]
fn _axiomkit_io_gsheet_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PySheetFormatOutcome>()?;
    module.add_function(wrap_pyfunction!(format_sheet_py, module)?)?;
    module.add_function(wrap_pyfunction!(init_logging_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
