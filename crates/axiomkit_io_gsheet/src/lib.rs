//! `axiomkit_io_gsheet` v1:
//! Rust-side Google Sheets formatting kernel.
//!
//! Layout:
//! - `conf`      : constants and default template presets
//! - `spec`      : operations/config/outcome models and errors
//! - `util`      : pure helper functions (key normalization, request assembly)
//! - `auth`      : service-account JWT-bearer authentication
//! - `client`    : batch-update transport seam and HTTP implementation
//! - `formatter` : one-shot entrypoints returning a success/failure outcome
pub mod auth;
pub mod client;
pub mod conf;
pub mod formatter;
pub mod spec;
pub mod util;

pub use auth::{ServiceAccountAuthenticator, SpecAccessToken, SpecAssertionClaims, sign_assertion};
pub use client::{SheetsBatchUpdater, SheetsHttpClient, SpecBatchUpdateReply};
pub use conf::{
    C_ENV_CLIENT_EMAIL, C_ENV_PRIVATE_KEY, C_ENV_SHEET_TAB_ID, C_ENV_SPREADSHEET_ID,
    C_MSG_FORMAT_FAILURE, C_MSG_FORMAT_SUCCESS, N_SHEET_ID_DEFAULT, derive_default_header_format,
    derive_default_sheet_format_template,
};
pub use formatter::{format_sheet, format_sheet_from_env, format_sheet_with};
pub use spec::{
    EnumHorizontalAlign, EnumSheetFormatOperation, EnumVerticalAlign, EnumWrapStrategy,
    GSheetError, SpecCellFormat, SpecColor, SpecGridRange, SpecServiceAccountCredentials,
    SpecSheetFormatConfig, SpecSheetFormatOutcome, SpecSheetFormatOverrides, SpecSheetsEndpoints,
    SpecSpreadsheetTarget,
};
pub use util::{
    derive_batch_update_body, derive_batch_update_url, derive_fields_mask, normalize_private_key,
    parse_sheet_id, validate_sheet_format_config,
};
