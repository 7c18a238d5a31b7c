//! One-shot sheet formatting entrypoints.
//!
//! Every entrypoint returns a [`SpecSheetFormatOutcome`]; failure detail is
//! logged through `tracing` and never returned to the caller.

use crate::client::{SheetsBatchUpdater, SheetsHttpClient, SpecBatchUpdateReply};
use crate::conf::derive_default_sheet_format_template;
use crate::spec::{GSheetError, SpecSheetFormatConfig, SpecSheetFormatOutcome};
use crate::util::validate_sheet_format_config;

/// Apply the default template through `updater`.
///
/// Validates `config`, builds the five-step template for the configured tab and
/// submits it as exactly one batch. Configuration errors short-circuit before
/// `updater` is called.
pub async fn format_sheet_with<U>(
    updater: &U,
    config: &SpecSheetFormatConfig,
) -> SpecSheetFormatOutcome
where
    U: SheetsBatchUpdater + ?Sized,
{
    match apply_default_template(updater, config).await {
        Ok(reply) => {
            tracing::info!(
                spreadsheet_id = %reply.spreadsheet_id,
                n_replies = reply.n_replies,
                "sheet formatted"
            );
            SpecSheetFormatOutcome::succeeded()
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to format sheet");
            SpecSheetFormatOutcome::failed()
        }
    }
}

async fn apply_default_template<U>(
    updater: &U,
    config: &SpecSheetFormatConfig,
) -> Result<SpecBatchUpdateReply, GSheetError>
where
    U: SheetsBatchUpdater + ?Sized,
{
    let (credentials, target) = validate_sheet_format_config(config)?;
    let l_ops = derive_default_sheet_format_template(target.sheet_id);
    updater.batch_update(&credentials, &target, &l_ops).await
}

/// Apply the default template over HTTP using `config.endpoints`.
pub async fn format_sheet(config: &SpecSheetFormatConfig) -> SpecSheetFormatOutcome {
    let client = SheetsHttpClient::new(config.endpoints.clone());
    format_sheet_with(&client, config).await
}

/// Read configuration from the environment, then [`format_sheet`].
pub async fn format_sheet_from_env() -> SpecSheetFormatOutcome {
    match SpecSheetFormatConfig::from_env() {
        Ok(config) => format_sheet(&config).await,
        Err(err) => {
            tracing::error!(error = %err, "failed to format sheet");
            SpecSheetFormatOutcome::failed()
        }
    }
}
