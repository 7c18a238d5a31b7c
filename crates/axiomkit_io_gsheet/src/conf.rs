//! Sheets API constants and default format template factories.

use crate::spec::{
    EnumHorizontalAlign, EnumSheetFormatOperation, EnumVerticalAlign, SpecCellFormat, SpecColor,
    SpecGridRange,
};

/// Sheets API v4 base URL (without trailing slash).
pub const C_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
/// OAuth2 token endpoint used for service-account assertions.
pub const C_OAUTH_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Read/write spreadsheet scope.
pub const C_SCOPE_SPREADSHEETS: &str = "https://www.googleapis.com/auth/spreadsheets";
/// Grant type for the JWT-bearer token exchange.
pub const C_GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime of a signed assertion, in seconds (Google caps this at one hour).
pub const N_SECS_ASSERTION_LIFETIME: i64 = 3_600;

/// Environment variable holding the service-account email.
pub const C_ENV_CLIENT_EMAIL: &str = "GOOGLE_SERVICE_ACCOUNT_EMAIL";
/// Environment variable holding the PEM private key (may carry literal `\n`).
pub const C_ENV_PRIVATE_KEY: &str = "GOOGLE_PRIVATE_KEY";
/// Environment variable holding the spreadsheet identifier.
pub const C_ENV_SPREADSHEET_ID: &str = "GOOGLE_SHEET_ID";
/// Environment variable overriding the target tab id.
pub const C_ENV_SHEET_TAB_ID: &str = "GOOGLE_SHEET_TAB_ID";

/// First tab of a freshly created spreadsheet.
pub const N_SHEET_ID_DEFAULT: i64 = 0;
/// Number of header rows frozen and styled.
pub const N_NROWS_HEADER: usize = 1;
/// Zero-based index of the wide (free-text) column.
pub const N_IDX_COL_WIDE: usize = 8;
/// Pixel width of the wide column.
pub const N_PX_WIDTH_COL_WIDE: u32 = 400;
/// Pixel width of every column before the wide one.
pub const N_PX_WIDTH_COL_STANDARD: u32 = 150;

/// Outcome message on success.
pub const C_MSG_FORMAT_SUCCESS: &str = "Sheet formatted successfully!";
/// Outcome message on any failure.
pub const C_MSG_FORMAT_FAILURE: &str = "Failed to format sheet.";

/// Header row style: dark background, bold white centered text.
pub fn derive_default_header_format() -> SpecCellFormat {
    SpecCellFormat {
        bg_color: Some(SpecColor::new(0.2, 0.2, 0.2)),
        font_color: Some(SpecColor::WHITE),
        bold: Some(true),
        align: Some(EnumHorizontalAlign::Center),
        ..Default::default()
    }
}

/// Build the fixed five-step formatting template for one tab.
///
/// Order is part of the contract: freeze, header style, wide column,
/// standard columns, sheet-wide wrap.
pub fn derive_default_sheet_format_template(sheet_id: i64) -> Vec<EnumSheetFormatOperation> {
    vec![
        EnumSheetFormatOperation::FreezeRows {
            sheet_id,
            n_rows_frozen: N_NROWS_HEADER,
        },
        EnumSheetFormatOperation::StyleRange {
            range: SpecGridRange::rows(sheet_id, 0, N_NROWS_HEADER),
            format: derive_default_header_format(),
        },
        EnumSheetFormatOperation::ResizeColumns {
            sheet_id,
            col_start_inclusive: N_IDX_COL_WIDE,
            col_end_exclusive: N_IDX_COL_WIDE + 1,
            width_px: N_PX_WIDTH_COL_WIDE,
        },
        EnumSheetFormatOperation::ResizeColumns {
            sheet_id,
            col_start_inclusive: 0,
            col_end_exclusive: N_IDX_COL_WIDE,
            width_px: N_PX_WIDTH_COL_STANDARD,
        },
        EnumSheetFormatOperation::EnableWrap {
            sheet_id,
            valign: EnumVerticalAlign::Top,
        },
    ]
}
