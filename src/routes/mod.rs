use rocket::request::FlashMessage;

use crate::error::Notice;

pub mod admin;
pub mod auth;
pub mod live;
pub mod public;

/// Notice carried over a redirect, if any.
pub(crate) fn flash_notice(flash: Option<FlashMessage<'_>>) -> Option<Notice> {
    flash.as_ref().map(Notice::from_flash)
}
