use colored::{control, Colorize};

use costreport::core::config::{
    ConfigError, ANTHROPIC_ADMIN_KEY, OPENAI_ADMIN_KEY, OPENAI_ORG_ID, OPENAI_PROJECT_ID,
};
use costreport::core::dates::DateError;
use costreport::core::providers::fetch::FetchError;
use costreport::core::providers::Provider;

fn missing_env_hints(var: &str) -> Vec<String> {
    let mut hints = vec![format!("Set {var} in your environment: export {var}=...")];
    match var {
        OPENAI_ADMIN_KEY => hints.push(format!(
            "Create an OpenAI admin key at {}",
            Provider::OpenAi.console_url()
        )),
        OPENAI_ORG_ID => hints.push(
            "Find your organization ID under Settings > Organization > General on platform.openai.com"
                .to_string(),
        ),
        OPENAI_PROJECT_ID => hints.push(
            "Find the project ID under Settings > Organization > Projects on platform.openai.com"
                .to_string(),
        ),
        ANTHROPIC_ADMIN_KEY => hints.push(format!(
            "Create an Anthropic admin key (sk-ant-admin...) at {}",
            Provider::Claude.console_url()
        )),
        _ => {}
    }
    hints
}

/// Remediation hints for a failed run, keyed on the underlying error.
pub fn hints_for(err: &anyhow::Error) -> Vec<String> {
    for cause in err.chain() {
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return match config_err {
                ConfigError::MissingEnv(var) => missing_env_hints(var),
                ConfigError::UnknownProvider(_) => {
                    vec!["Use --provider openai or --provider claude".to_string()]
                }
                ConfigError::InsecureEndpoint { .. } => {
                    vec!["API base overrides must start with https://".to_string()]
                }
                ConfigError::ReadError(_) | ConfigError::ParseError(_) => vec![
                    "Check the settings file at ~/.config/costreport/config.toml".to_string(),
                ],
            };
        }
        if cause.downcast_ref::<DateError>().is_some() {
            return vec![
                "Dates use YYYY-MM-DD and the end date must be after the start date".to_string(),
                "For a single day, pass the following day as the end date".to_string(),
            ];
        }
        if let Some(FetchError::Unauthorized(provider)) = cause.downcast_ref::<FetchError>() {
            return vec![format!(
                "{provider} cost reports require an admin API key, not a regular API key"
            )];
        }
    }
    Vec::new()
}

/// Format the error chain plus hints for stderr.
pub fn format_error(err: &anyhow::Error, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines = vec![format!("{} {:#}", "Error:".red().bold(), err)];
    for hint in hints_for(err) {
        lines.push(format!("  {} {}", "hint:".yellow(), hint));
    }
    lines.join("\n")
}
