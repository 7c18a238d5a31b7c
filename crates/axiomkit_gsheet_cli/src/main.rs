//! `axiomkit-gsheet`: operator CLI for the Sheets formatting kernel.

use std::process::ExitCode;

use axiomkit_io_gsheet::{
    C_ENV_CLIENT_EMAIL, C_ENV_PRIVATE_KEY, C_ENV_SHEET_TAB_ID, C_ENV_SPREADSHEET_ID,
    C_MSG_FORMAT_FAILURE, GSheetError, N_SHEET_ID_DEFAULT, SpecSheetFormatConfig,
    SpecSheetsEndpoints, derive_batch_update_body, derive_default_sheet_format_template,
    format_sheet, parse_sheet_id,
};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "axiomkit-gsheet",
    version,
    about = "Apply the axiomkit format template to a Google Sheet"
)]
struct Cli {
    /// Log filter (overridden by `RUST_LOG`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: EnumCommand,
}

#[derive(Debug, Subcommand)]
enum EnumCommand {
    /// Submit the five-step format template as one batch update.
    Format(SpecFormatArgs),
}

#[derive(Debug, Args)]
struct SpecFormatArgs {
    #[arg(long, env = C_ENV_SPREADSHEET_ID)]
    spreadsheet_id: Option<String>,

    #[arg(long, env = C_ENV_CLIENT_EMAIL)]
    client_email: Option<String>,

    /// PEM key; literal `\n` sequences are accepted.
    #[arg(long, env = C_ENV_PRIVATE_KEY, hide_env_values = true)]
    private_key: Option<String>,

    /// Numeric tab id (`sheetId`); defaults to the first tab.
    #[arg(long, env = C_ENV_SHEET_TAB_ID, allow_hyphen_values = true)]
    sheet_id: Option<String>,

    #[arg(long)]
    sheets_api_base: Option<String>,

    #[arg(long)]
    token_uri: Option<String>,

    /// Print the batch body instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

impl SpecFormatArgs {
    // A bad tab id ends in the failure outcome, never a clap usage error.
    fn into_config(self) -> Result<SpecSheetFormatConfig, GSheetError> {
        let sheet_id = match self.sheet_id.as_deref() {
            Some(val) if !val.trim().is_empty() => parse_sheet_id(val, C_ENV_SHEET_TAB_ID)?,
            _ => N_SHEET_ID_DEFAULT,
        };
        let endpoints_default = SpecSheetsEndpoints::default();
        Ok(SpecSheetFormatConfig {
            client_email: self.client_email,
            private_key: self.private_key,
            spreadsheet_id: self.spreadsheet_id,
            sheet_id,
            endpoints: SpecSheetsEndpoints {
                sheets_api_base: self
                    .sheets_api_base
                    .unwrap_or(endpoints_default.sheets_api_base),
                token_uri: self.token_uri.unwrap_or(endpoints_default.token_uri),
            },
        })
    }
}

fn render_dry_run(sheet_id: i64) -> Result<String, GSheetError> {
    let body = derive_batch_update_body(&derive_default_sheet_format_template(sheet_id))?;
    serde_json::to_string_pretty(&body)
        .map_err(|err| GSheetError::InvalidOperation(err.to_string()))
}

async fn run_format(args: SpecFormatArgs) -> ExitCode {
    let if_dry_run = args.dry_run;
    let config = match args.into_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "failed to format sheet");
            println!("{C_MSG_FORMAT_FAILURE}");
            return ExitCode::FAILURE;
        }
    };

    if if_dry_run {
        return match render_dry_run(config.sheet_id) {
            Ok(txt) => {
                println!("{txt}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to render batch body");
                ExitCode::FAILURE
            }
        };
    }

    let outcome = format_sheet(&config).await;
    println!("{}", outcome.message);
    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    axiomkit_log::init_logging(Some(&cli.log_level));

    match cli.command {
        EnumCommand::Format(args) => run_format(args).await,
    }
}
