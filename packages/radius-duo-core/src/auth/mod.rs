//! Second-factor authentication flow.
//!
//! Drives the preauth/push protocol against a [`SecondFactor`] service and
//! maps every outcome onto a FreeRADIUS exec exit code.

mod flow;
mod outcome;
mod request;

pub use flow::{SecondFactor, authenticate};
pub use outcome::{AuthOutcome, ExitStatus, PreauthOutcome, Verdict};
pub use request::{ArgumentError, AuthRequest, HttpsTimeout, PUSH_DEVICE};
