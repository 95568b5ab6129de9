//! Out-of-band delivery of confirmation codes.
//!
//! There is no SMTP integration; codes are emitted to the structured log
//! where an operator (or the test suite) can pick them up. The signup
//! response never contains the code.

use tracing::info;

/// Records a confirmation code dispatch for the given address.
pub fn send_confirmation_code(email: &str, username: &str, code: &str) {
    info!(
        target: "critique_server::mail",
        email,
        username,
        code,
        "confirmation code issued"
    );
}
