//! Sign mode - print a presigned GET URL for each BUCKET KEY pair

use s3sign_core::sign::sign_all;
use s3sign_core::{ObjectRef, ObjectStore, PresignedUrl};
use serde::Serialize;

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Output structure for sign mode (JSON format)
#[derive(Debug, Serialize)]
struct SignOutput {
    urls: Vec<PresignedUrl>,
    failed: usize,
}

/// Execute sign mode
///
/// Every pair is attempted. Failures are reported as they happen and turn
/// the final exit code into a general error.
pub async fn execute(
    store: &dyn ObjectStore,
    objects: &[ObjectRef],
    formatter: &Formatter,
) -> ExitCode {
    let mut urls = Vec::new();

    let failed = sign_all(store, objects, |object, result| match result {
        Ok(signed) if formatter.is_json() => urls.push(signed),
        Ok(signed) => formatter.println(&signed.url),
        Err(e) => formatter.error(&format!("Failed to sign request for {object}: {e}")),
    })
    .await;

    if formatter.is_json() {
        formatter.json(&SignOutput { urls, failed });
    }

    if failed > 0 {
        ExitCode::GeneralError
    } else {
        ExitCode::Success
    }
}
