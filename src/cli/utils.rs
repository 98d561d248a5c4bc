use serde_json::{json, Value};

use crate::auth::{FetchError, Navigation};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(fields))) = (response.as_object_mut(), data) {
                target.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a guard decision for a path
pub fn output_navigation(
    output_format: &OutputFormat,
    path: &str,
    navigation: &Navigation,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                "path": path,
                "navigation": navigation,
            }))?);
        }
        OutputFormat::Text => match navigation {
            Navigation::Proceed => println!("{} → allowed", path),
            Navigation::Redirect(to) => println!("{} → redirect to {}", path, to),
        },
    }
    Ok(())
}

/// Short code for a failed backend call, used in JSON error output
pub fn fetch_error_code(err: &FetchError) -> &'static str {
    match err {
        FetchError::AuthExpired { .. } => "AUTH_EXPIRED",
        FetchError::Status { .. } => "BACKEND_ERROR",
        FetchError::Transport(_) => "TRANSPORT_ERROR",
        FetchError::Decode(_) => "MALFORMED_RESPONSE",
        FetchError::InvalidPath(_) | FetchError::InvalidToken(_) | FetchError::Config(_) => "INVALID_REQUEST",
    }
}
