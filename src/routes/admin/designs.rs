use rocket::form::Form;
use rocket::fs::TempFile;
use rocket::response::{Flash, Redirect};
use rocket::tokio::io::AsyncReadExt;
use rocket::State;
use rocket_dyn_templates::Template;

use super::{back_to, confirm_page, removal_notice, ConfirmForm};
use crate::config::SiteConfig;
use crate::error::{Notice, OpResult, Operation, OrFail};
use crate::models::DesignDraft;
use crate::security::auth::AdminUser;
use crate::site::console::{Confirmation, ImageUpload};
use crate::site::AdminConsole;

#[derive(FromForm)]
pub struct DesignForm<'r> {
    #[field(default = String::new())]
    pub title: String,
    #[field(default = String::new())]
    pub category: String,
    pub image: Option<TempFile<'r>>,
}

/// Reads the whole upload into memory.
async fn read_upload(file: &TempFile<'_>) -> OpResult<ImageUpload> {
    let mut bytes = Vec::with_capacity(file.len() as usize);
    if file.len() > 0 {
        let reader = file.open().await.or_fail(Operation::CreateDesign)?;
        rocket::tokio::pin!(reader);
        reader.read_to_end(&mut bytes).await.or_fail(Operation::CreateDesign)?;
    }

    let file_name = file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().to_string())
        .or_else(|| file.name().map(str::to_string))
        .unwrap_or_default();

    Ok(ImageUpload {
        bytes,
        content_type: file.content_type().map(|ct| ct.to_string()),
        file_name,
    })
}

#[post("/designs", data = "<form>")]
pub async fn design_create(
    _admin: AdminUser,
    form: Form<DesignForm<'_>>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Flash<Redirect> {
    let draft = DesignDraft {
        title: form.title.clone(),
        category: form.category.clone(),
    };
    let upload = match &form.image {
        Some(file) => read_upload(file).await,
        None => Ok(ImageUpload::default()),
    };

    let result = upload.and_then(|image| console.create_design(&draft, &image));
    back_to(config, "designs", Notice::from_result(&result, |_| "Design added.".to_string()))
}

#[get("/designs/<key>/delete")]
pub fn design_delete_confirm(admin: AdminUser, key: &str, config: &State<SiteConfig>) -> Template {
    confirm_page(
        &admin,
        config,
        "Are you sure you want to delete this design?",
        key,
        &format!("{}/designs/{}/delete", config.admin_base(), key),
        "designs",
    )
}

#[post("/designs/<key>/delete", data = "<form>")]
pub fn design_delete(
    _admin: AdminUser,
    key: &str,
    form: Form<ConfirmForm>,
    config: &State<SiteConfig>,
    console: &State<AdminConsole>,
) -> Flash<Redirect> {
    let answer = Confirmation::from_answer(form.confirm.as_deref());
    let notice = removal_notice(console.delete_design(key, answer), "Design deleted.");
    back_to(config, "designs", notice)
}
