use crate::utils::error::{BridgeError, ErrorCode, Result};
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

/// `{"ok": true, ...payload}`
#[derive(Debug, Serialize)]
pub struct Success<'a, T: Serialize> {
    ok: bool,
    #[serde(flatten)]
    payload: &'a T,
}

/// `{"ok": false, "code": ..., "message": ...}`
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    ok: bool,
    pub code: ErrorCode,
    pub message: String,
}

impl Failure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            code,
            message: message.into(),
        }
    }
}

impl From<&BridgeError> for Failure {
    fn from(err: &BridgeError) -> Self {
        Failure::new(err.code(), err.to_string())
    }
}

pub fn success_json<T: Serialize>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string(&Success { ok: true, payload })?)
}

pub fn failure_json(failure: &Failure) -> String {
    // A struct of an enum and a String always serializes.
    serde_json::to_string(failure).unwrap_or_else(|_| {
        format!(
            r#"{{"ok":false,"code":"{}","message":"unserializable error"}}"#,
            failure.code
        )
    })
}

pub const EXIT_FAILURE: u8 = 1;

/// Writes the single envelope line for `result` to `out` and returns the
/// process exit code: 0 on success, 1 on any failure.
pub fn write_envelope<T, W>(out: &mut W, result: &Result<T>) -> u8
where
    T: Serialize,
    W: Write,
{
    let (line, exit_code) = match result {
        Ok(payload) => match success_json(payload) {
            Ok(line) => (line, 0),
            Err(e) => (failure_json(&Failure::from(&e)), EXIT_FAILURE),
        },
        Err(e) => {
            tracing::error!("❌ {} ({})", e, e.code());
            (failure_json(&Failure::from(e)), EXIT_FAILURE)
        }
    };

    if let Err(e) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
        tracing::error!("failed to write envelope: {}", e);
        return EXIT_FAILURE;
    }
    exit_code
}

pub fn emit<T: Serialize>(result: &Result<T>) -> ExitCode {
    ExitCode::from(write_envelope(&mut std::io::stdout().lock(), result))
}

/// Failure envelope for arguments the CLI parser rejected.
pub fn emit_usage_error(message: impl Into<String>) -> ExitCode {
    let failure = Failure::new(ErrorCode::InvalidInput, message);
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{}", failure_json(&failure)) {
        tracing::error!("failed to write envelope: {}", e);
    }
    ExitCode::from(EXIT_FAILURE)
}
