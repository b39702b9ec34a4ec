use std::fmt::Display;

use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use serde::Serialize;
use thiserror::Error;

/// Every user-triggered operation that can fail. The taxonomy is flat:
/// a failure is identified only by which operation produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitContact,
    SignIn,
    FederatedSignIn,
    SendPasswordReset,
    ResetPassword,
    SignOut,
    ViewContact,
    MarkContactRead,
    DeleteContact,
    CreateDesign,
    DeleteDesign,
    CreateAd,
    ToggleAd,
    DeleteAd,
    SetMaintenance,
}

impl Operation {
    pub fn failure_text(self) -> &'static str {
        match self {
            Operation::SubmitContact => "Could not send your message",
            Operation::SignIn => "Sign-in failed",
            Operation::FederatedSignIn => "Google sign-in failed",
            Operation::SendPasswordReset => "Could not send the password reset email",
            Operation::ResetPassword => "Could not reset the password",
            Operation::SignOut => "Could not sign out",
            Operation::ViewContact => "Could not open the message",
            Operation::MarkContactRead => "Could not mark the message as read",
            Operation::DeleteContact => "Could not delete the message",
            Operation::CreateDesign => "Could not add the design",
            Operation::DeleteDesign => "Could not delete the design",
            Operation::CreateAd => "Could not add the ad",
            Operation::ToggleAd => "Could not change the ad status",
            Operation::DeleteAd => "Could not delete the ad",
            Operation::SetMaintenance => "Could not update maintenance mode",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .op.failure_text(), .cause)]
pub struct OpError {
    pub op: Operation,
    pub cause: String,
}

impl OpError {
    pub fn new(op: Operation, cause: impl Display) -> Self {
        OpError {
            op,
            cause: cause.to_string(),
        }
    }
}

pub type OpResult<T> = Result<T, OpError>;

/// Tags a collaborator error with the operation it interrupted.
pub trait OrFail<T> {
    fn or_fail(self, op: Operation) -> OpResult<T>;
}

impl<T, E: Display> OrFail<T> for Result<T, E> {
    fn or_fail(self, op: Operation) -> OpResult<T> {
        self.map_err(|e| OpError::new(op, e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        }
    }
}

/// What the UI shows after an operation. Routes build one from an
/// `OpResult` and hand it to the page as a `Flash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Failures are logged here, once, before reaching the user.
    pub fn from_result<T>(result: &OpResult<T>, on_success: impl FnOnce(&T) -> String) -> Self {
        match result {
            Ok(value) => Notice::success(on_success(value)),
            Err(e) => Notice::failure(e),
        }
    }

    pub fn failure(err: &OpError) -> Self {
        log::error!("{:?} failed: {}", err.op, err.cause);
        Notice::error(err.to_string())
    }

    pub fn flash(self, to: Redirect) -> Flash<Redirect> {
        Flash::new(to, self.kind.as_str(), self.message)
    }

    pub fn from_flash(flash: &FlashMessage<'_>) -> Self {
        let kind = match flash.kind() {
            "success" => NoticeKind::Success,
            "error" => NoticeKind::Error,
            _ => NoticeKind::Info,
        };
        Notice {
            kind,
            message: flash.message().to_string(),
        }
    }
}
