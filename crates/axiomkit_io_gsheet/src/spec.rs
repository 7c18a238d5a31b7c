//! Shared Sheets formatting specification models and error types.

use std::fmt;

use serde_json::{Map, Value, json};

use crate::conf::{
    C_ENV_CLIENT_EMAIL, C_ENV_PRIVATE_KEY, C_ENV_SHEET_TAB_ID, C_ENV_SPREADSHEET_ID,
    C_MSG_FORMAT_FAILURE, C_MSG_FORMAT_SUCCESS, C_OAUTH_TOKEN_URI, C_SHEETS_API_BASE,
    N_SHEET_ID_DEFAULT,
};
use crate::util::{derive_fields_mask, parse_sheet_id};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// RGB color with channels in `0.0..=1.0`, as the Sheets API expects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpecColor {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl SpecColor {
    pub const WHITE: SpecColor = SpecColor {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };

    /// Build a color from fractional channels, clamped to `0.0..=1.0`.
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: red.clamp(0.0, 1.0),
            green: green.clamp(0.0, 1.0),
            blue: blue.clamp(0.0, 1.0),
        }
    }

    pub fn to_sheets_api(&self) -> Value {
        json!({ "red": self.red, "green": self.green, "blue": self.blue })
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumHorizontalAlign {
    Left,
    Center,
    Right,
}

impl EnumHorizontalAlign {
    pub fn as_sheets_api(&self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Center => "CENTER",
            Self::Right => "RIGHT",
        }
    }
}

/// Vertical alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumVerticalAlign {
    Top,
    Middle,
    Bottom,
}

impl EnumVerticalAlign {
    pub fn as_sheets_api(&self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Middle => "MIDDLE",
            Self::Bottom => "BOTTOM",
        }
    }
}

/// Cell text wrapping strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumWrapStrategy {
    /// Text spills into empty neighbor cells.
    OverflowCell,
    /// Text is cut at the cell border.
    Clip,
    /// Text wraps onto additional lines.
    Wrap,
}

impl EnumWrapStrategy {
    pub fn as_sheets_api(&self) -> &'static str {
        match self {
            Self::OverflowCell => "OVERFLOW_CELL",
            Self::Clip => "CLIP",
            Self::Wrap => "WRAP",
        }
    }
}

/// Cell format specification; `None` fields are left untouched remotely.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCellFormat {
    /// Background fill color.
    pub bg_color: Option<SpecColor>,
    /// Font color.
    pub font_color: Option<SpecColor>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<EnumHorizontalAlign>,
    /// Vertical alignment.
    pub valign: Option<EnumVerticalAlign>,
    /// Text wrap.
    pub wrap_strategy: Option<EnumWrapStrategy>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            bg_color: other.bg_color.or(self.bg_color),
            font_color: other.font_color.or(self.font_color),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.or(self.align),
            valign: other.valign.or(self.valign),
            wrap_strategy: other.wrap_strategy.or(self.wrap_strategy),
        }
    }

    /// Whether any text-format property is set.
    pub fn has_text_format(&self) -> bool {
        self.font_color.is_some() || self.bold.is_some() || self.italic.is_some()
    }

    /// Convert format into a Sheets `CellFormat` object (`userEnteredFormat` payload).
    pub fn to_sheets_api(&self) -> Value {
        let mut dict_fmt = Map::new();

        if let Some(value) = &self.bg_color {
            dict_fmt.insert("backgroundColor".to_string(), value.to_sheets_api());
        }

        if self.has_text_format() {
            let mut dict_text = Map::new();
            if let Some(value) = &self.font_color {
                dict_text.insert("foregroundColor".to_string(), value.to_sheets_api());
            }
            if let Some(value) = self.bold {
                dict_text.insert("bold".to_string(), Value::Bool(value));
            }
            if let Some(value) = self.italic {
                dict_text.insert("italic".to_string(), Value::Bool(value));
            }
            dict_fmt.insert("textFormat".to_string(), Value::Object(dict_text));
        }

        if let Some(value) = self.align {
            dict_fmt.insert(
                "horizontalAlignment".to_string(),
                Value::from(value.as_sheets_api()),
            );
        }
        if let Some(value) = self.valign {
            dict_fmt.insert(
                "verticalAlignment".to_string(),
                Value::from(value.as_sheets_api()),
            );
        }
        if let Some(value) = self.wrap_strategy {
            dict_fmt.insert(
                "wrapStrategy".to_string(),
                Value::from(value.as_sheets_api()),
            );
        }

        Value::Object(dict_fmt)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RangeSpecification

/// Rectangular range on one tab; unbounded sides are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecGridRange {
    /// Target tab id.
    pub sheet_id: i64,
    /// Inclusive row start.
    pub row_start_inclusive: Option<usize>,
    /// Exclusive row end.
    pub row_end_exclusive: Option<usize>,
    /// Inclusive column start.
    pub col_start_inclusive: Option<usize>,
    /// Exclusive column end.
    pub col_end_exclusive: Option<usize>,
}

impl SpecGridRange {
    /// Whole tab.
    pub fn whole_sheet(sheet_id: i64) -> Self {
        Self {
            sheet_id,
            row_start_inclusive: None,
            row_end_exclusive: None,
            col_start_inclusive: None,
            col_end_exclusive: None,
        }
    }

    /// Full-width row band `[row_start_inclusive, row_end_exclusive)`.
    pub fn rows(sheet_id: i64, row_start_inclusive: usize, row_end_exclusive: usize) -> Self {
        Self {
            row_start_inclusive: Some(row_start_inclusive),
            row_end_exclusive: Some(row_end_exclusive),
            ..Self::whole_sheet(sheet_id)
        }
    }

    pub fn to_sheets_api(&self) -> Value {
        let mut dict_range = Map::new();
        dict_range.insert("sheetId".to_string(), Value::from(self.sheet_id));
        for (key, value) in [
            ("startRowIndex", self.row_start_inclusive),
            ("endRowIndex", self.row_end_exclusive),
            ("startColumnIndex", self.col_start_inclusive),
            ("endColumnIndex", self.col_end_exclusive),
        ] {
            if let Some(idx) = value {
                dict_range.insert(key.to_string(), Value::from(idx));
            }
        }
        Value::Object(dict_range)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OperationSpecification

/// One declarative formatting instruction inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSheetFormatOperation {
    /// Freeze the leading `n_rows_frozen` rows.
    FreezeRows { sheet_id: i64, n_rows_frozen: usize },
    /// Apply a cell format to a rectangular range.
    StyleRange {
        range: SpecGridRange,
        format: SpecCellFormat,
    },
    /// Set `[col_start_inclusive, col_end_exclusive)` to a fixed pixel width.
    ResizeColumns {
        sheet_id: i64,
        col_start_inclusive: usize,
        col_end_exclusive: usize,
        width_px: u32,
    },
    /// Wrap text across the whole tab with the given vertical alignment.
    EnableWrap {
        sheet_id: i64,
        valign: EnumVerticalAlign,
    },
}

impl EnumSheetFormatOperation {
    /// Stable snake-case tag, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FreezeRows { .. } => "freeze_rows",
            Self::StyleRange { .. } => "style_range",
            Self::ResizeColumns { .. } => "resize_columns",
            Self::EnableWrap { .. } => "enable_wrap",
        }
    }

    /// Tab addressed by this operation.
    pub fn sheet_id(&self) -> i64 {
        match self {
            Self::FreezeRows { sheet_id, .. }
            | Self::ResizeColumns { sheet_id, .. }
            | Self::EnableWrap { sheet_id, .. } => *sheet_id,
            Self::StyleRange { range, .. } => range.sheet_id,
        }
    }

    /// Convert into one Sheets `Request` object.
    pub fn to_sheets_api(&self) -> Result<Value, GSheetError> {
        match self {
            Self::FreezeRows {
                sheet_id,
                n_rows_frozen,
            } => Ok(json!({
                "updateSheetProperties": {
                    "properties": {
                        "sheetId": sheet_id,
                        "gridProperties": { "frozenRowCount": n_rows_frozen },
                    },
                    "fields": "gridProperties.frozenRowCount",
                }
            })),
            Self::StyleRange { range, format } => derive_repeat_cell_request(range, format),
            Self::ResizeColumns {
                sheet_id,
                col_start_inclusive,
                col_end_exclusive,
                width_px,
            } => {
                if col_start_inclusive >= col_end_exclusive {
                    return Err(GSheetError::InvalidOperation(format!(
                        "empty column range [{col_start_inclusive}, {col_end_exclusive})"
                    )));
                }
                if *width_px == 0 {
                    return Err(GSheetError::InvalidOperation(
                        "column width must be > 0 px".to_string(),
                    ));
                }
                Ok(json!({
                    "updateDimensionProperties": {
                        "range": {
                            "sheetId": sheet_id,
                            "dimension": "COLUMNS",
                            "startIndex": col_start_inclusive,
                            "endIndex": col_end_exclusive,
                        },
                        "properties": { "pixelSize": width_px },
                        "fields": "pixelSize",
                    }
                }))
            }
            Self::EnableWrap { sheet_id, valign } => derive_repeat_cell_request(
                &SpecGridRange::whole_sheet(*sheet_id),
                &SpecCellFormat {
                    wrap_strategy: Some(EnumWrapStrategy::Wrap),
                    valign: Some(*valign),
                    ..Default::default()
                },
            ),
        }
    }
}

fn derive_repeat_cell_request(
    range: &SpecGridRange,
    format: &SpecCellFormat,
) -> Result<Value, GSheetError> {
    let fields = derive_fields_mask(format).ok_or_else(|| {
        GSheetError::InvalidOperation("style has no properties set".to_string())
    })?;
    Ok(json!({
        "repeatCell": {
            "range": range.to_sheets_api(),
            "cell": { "userEnteredFormat": format.to_sheets_api() },
            "fields": fields,
        }
    }))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConfigSpecification

/// Service identity and signing key.
#[derive(Clone, PartialEq, Eq)]
pub struct SpecServiceAccountCredentials {
    /// Service-account email (JWT issuer).
    pub client_email: String,
    /// PEM private key with real line breaks.
    pub private_key: String,
}

// Key material never reaches logs.
impl fmt::Debug for SpecServiceAccountCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Spreadsheet and tab addressed by one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSpreadsheetTarget {
    /// Opaque spreadsheet identifier.
    pub spreadsheet_id: String,
    /// Numeric tab id (`sheetId`).
    pub sheet_id: i64,
}

/// Remote endpoints, overridable for emulators and proxies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetsEndpoints {
    /// Sheets API base URL, e.g. `https://sheets.googleapis.com/v4`.
    pub sheets_api_base: String,
    /// OAuth2 token URI; also the JWT audience.
    pub token_uri: String,
}

impl Default for SpecSheetsEndpoints {
    fn default() -> Self {
        Self {
            sheets_api_base: C_SHEETS_API_BASE.to_string(),
            token_uri: C_OAUTH_TOKEN_URI.to_string(),
        }
    }
}

/// Raw invocation configuration. Missing values surface as a failed outcome.
#[derive(Clone, PartialEq, Eq)]
pub struct SpecSheetFormatConfig {
    pub client_email: Option<String>,
    /// Private key as supplied; literal `\n` sequences are allowed.
    pub private_key: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub sheet_id: i64,
    pub endpoints: SpecSheetsEndpoints,
}

impl Default for SpecSheetFormatConfig {
    fn default() -> Self {
        Self {
            client_email: None,
            private_key: None,
            spreadsheet_id: None,
            sheet_id: N_SHEET_ID_DEFAULT,
            endpoints: SpecSheetsEndpoints::default(),
        }
    }
}

impl fmt::Debug for SpecSheetFormatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecSheetFormatConfig")
            .field("client_email", &self.client_email)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_id", &self.sheet_id)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl SpecSheetFormatConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, GSheetError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GSheetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sheet_id = match lookup(C_ENV_SHEET_TAB_ID) {
            Some(val) if !val.trim().is_empty() => parse_sheet_id(&val, C_ENV_SHEET_TAB_ID)?,
            _ => N_SHEET_ID_DEFAULT,
        };

        Ok(Self {
            client_email: lookup(C_ENV_CLIENT_EMAIL),
            private_key: lookup(C_ENV_PRIVATE_KEY),
            spreadsheet_id: lookup(C_ENV_SPREADSHEET_ID),
            sheet_id,
            endpoints: SpecSheetsEndpoints::default(),
        })
    }

    /// Read configuration from the process environment under `overrides`.
    pub fn from_env_with(overrides: SpecSheetFormatOverrides) -> Result<Self, GSheetError> {
        Self::from_lookup_with(|name| std::env::var(name).ok(), overrides)
    }

    /// Layer explicit `overrides` over `lookup`.
    ///
    /// An explicit tab id means the tab variable is never read, so a malformed
    /// value there cannot fail the invocation.
    pub fn from_lookup_with<F>(
        lookup: F,
        overrides: SpecSheetFormatOverrides,
    ) -> Result<Self, GSheetError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let if_sheet_id_explicit = overrides.sheet_id.is_some();
        let config_env = Self::from_lookup(|name| {
            if if_sheet_id_explicit && name == C_ENV_SHEET_TAB_ID {
                None
            } else {
                lookup(name)
            }
        })?;

        Ok(Self {
            client_email: overrides.client_email.or(config_env.client_email),
            private_key: overrides.private_key.or(config_env.private_key),
            spreadsheet_id: overrides.spreadsheet_id.or(config_env.spreadsheet_id),
            sheet_id: overrides.sheet_id.unwrap_or(config_env.sheet_id),
            endpoints: config_env.endpoints,
        })
    }
}

/// Explicit caller values; each `Some` wins over its environment variable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SpecSheetFormatOverrides {
    pub client_email: Option<String>,
    pub private_key: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub sheet_id: Option<i64>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OutcomeAndErrors

/// Caller-facing result of one formatting invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetFormatOutcome {
    pub success: bool,
    pub message: String,
}

impl SpecSheetFormatOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: C_MSG_FORMAT_SUCCESS.to_string(),
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            message: C_MSG_FORMAT_FAILURE.to_string(),
        }
    }
}

/// Internal failure detail; collapsed to [`SpecSheetFormatOutcome::failed`] at the boundary.
#[derive(Debug, thiserror::Error)]
pub enum GSheetError {
    /// Required configuration value absent or blank.
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),
    /// Configuration value present but unusable.
    #[error("invalid configuration value {name}: {message}")]
    InvalidConfig {
        name: &'static str,
        message: String,
    },
    /// Operation cannot be expressed as a valid request.
    #[error("invalid format operation: {0}")]
    InvalidOperation(String),
    /// PEM key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
    /// Assertion signing failed.
    #[error("failed to sign assertion: {0}")]
    Signing(String),
    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Token endpoint refused the assertion.
    #[error("token exchange failed {status}: {body}")]
    TokenExchange { status: u16, body: String },
    /// Sheets API rejected the batch.
    #[error("Sheets API error {status}: {body}")]
    Api { status: u16, body: String },
    /// Async runtime could not be started.
    #[error("runtime error: {0}")]
    Runtime(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
