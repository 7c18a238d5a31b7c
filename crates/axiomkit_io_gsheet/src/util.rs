//! Stateless helper utilities shared by the auth, client and formatter layers.

use serde_json::{Value, json};

use crate::conf::{C_ENV_CLIENT_EMAIL, C_ENV_PRIVATE_KEY, C_ENV_SPREADSHEET_ID};
use crate::spec::{
    EnumSheetFormatOperation, GSheetError, SpecCellFormat, SpecServiceAccountCredentials,
    SpecSheetFormatConfig, SpecSpreadsheetTarget,
};

////////////////////////////////////////////////////////////////////////////////
// #region CredentialNormalization

/// Replace every literal two-character `\n` escape with a real line break.
///
/// Keys stored in single-line env vars carry escaped newlines; keys that
/// already contain real line breaks come back unchanged.
pub fn normalize_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Return `value` untouched unless it is absent or blank.
fn select_required_value<'a>(
    value: Option<&'a str>,
    name: &'static str,
) -> Result<&'a str, GSheetError> {
    value
        .filter(|val| !val.trim().is_empty())
        .ok_or(GSheetError::MissingConfig(name))
}

/// Parse a tab id; must be a non-negative integer.
pub fn parse_sheet_id(raw: &str, name: &'static str) -> Result<i64, GSheetError> {
    let sheet_id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| GSheetError::InvalidConfig {
            name,
            message: format!("expected an integer tab id, got `{raw}`"),
        })?;
    if sheet_id < 0 {
        return Err(GSheetError::InvalidConfig {
            name,
            message: format!("tab id must be >= 0, got {sheet_id}"),
        });
    }
    Ok(sheet_id)
}

/// Resolve credentials and target from raw configuration.
pub fn validate_sheet_format_config(
    config: &SpecSheetFormatConfig,
) -> Result<(SpecServiceAccountCredentials, SpecSpreadsheetTarget), GSheetError> {
    let client_email =
        select_required_value(config.client_email.as_deref(), C_ENV_CLIENT_EMAIL)?.trim();
    // Key bytes are significant: only the escape normalization applies.
    let private_key = select_required_value(config.private_key.as_deref(), C_ENV_PRIVATE_KEY)?;
    let spreadsheet_id =
        select_required_value(config.spreadsheet_id.as_deref(), C_ENV_SPREADSHEET_ID)?.trim();

    if spreadsheet_id
        .chars()
        .any(|c| c == '/' || c == '?' || c == '#' || c.is_whitespace())
    {
        return Err(GSheetError::InvalidConfig {
            name: C_ENV_SPREADSHEET_ID,
            message: format!("`{spreadsheet_id}` is not a spreadsheet id"),
        });
    }
    if config.sheet_id < 0 {
        return Err(GSheetError::InvalidConfig {
            name: "sheet_id",
            message: format!("tab id must be >= 0, got {}", config.sheet_id),
        });
    }

    Ok((
        SpecServiceAccountCredentials {
            client_email: client_email.to_string(),
            private_key: normalize_private_key(private_key),
        },
        SpecSpreadsheetTarget {
            spreadsheet_id: spreadsheet_id.to_string(),
            sheet_id: config.sheet_id,
        },
    ))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RequestAssembly

/// Build `userEnteredFormat(<fields>)` from the properties set on `format`.
///
/// Returns `None` when nothing is set: an empty mask would reset the range.
pub fn derive_fields_mask(format: &SpecCellFormat) -> Option<String> {
    let mut l_fields = Vec::new();
    if format.bg_color.is_some() {
        l_fields.push("backgroundColor");
    }
    if format.has_text_format() {
        l_fields.push("textFormat");
    }
    if format.align.is_some() {
        l_fields.push("horizontalAlignment");
    }
    if format.valign.is_some() {
        l_fields.push("verticalAlignment");
    }
    if format.wrap_strategy.is_some() {
        l_fields.push("wrapStrategy");
    }

    if l_fields.is_empty() {
        return None;
    }
    Some(format!("userEnteredFormat({})", l_fields.join(",")))
}

/// Build the JSON body of one `spreadsheets.batchUpdate` call.
pub fn derive_batch_update_body(
    operations: &[EnumSheetFormatOperation],
) -> Result<Value, GSheetError> {
    if operations.is_empty() {
        return Err(GSheetError::InvalidOperation(
            "batch must contain >= 1 operation".to_string(),
        ));
    }
    let l_requests = operations
        .iter()
        .map(EnumSheetFormatOperation::to_sheets_api)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(json!({
        "requests": l_requests,
        "includeSpreadsheetInResponse": false,
    }))
}

/// `POST` target of a batch update for `spreadsheet_id`.
pub fn derive_batch_update_url(sheets_api_base: &str, spreadsheet_id: &str) -> String {
    format!(
        "{}/spreadsheets/{spreadsheet_id}:batchUpdate",
        sheets_api_base.trim_end_matches('/')
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
