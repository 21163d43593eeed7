use std::collections::HashMap;

use axum::{body::Bytes, extract::Multipart};

use crate::error::ApiError;

use super::model::NewUser;

const TEXT_FIELDS: [&str; 5] = ["name", "email", "institution", "position", "phone"];
const IMAGE_FIELD: &str = "image";

/// File part of the add-user form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// Filename exactly as sent by the client.
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// The add-user form after multipart decoding.
#[derive(Debug, Clone)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub institution: String,
    pub position: String,
    pub phone: String,
    /// `None` when the image part is absent or has an empty filename.
    pub image: Option<ImageUpload>,
}

impl UserForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut text = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(invalid_form)?;

                if !filename.is_empty() {
                    image = Some(ImageUpload {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            } else if TEXT_FIELDS.contains(&name.as_str()) {
                let value = field.text().await.map_err(invalid_form)?;
                text.insert(name, value);
            }
        }

        let mut take = |key: &'static str| text.remove(key).ok_or(ApiError::MissingField(key));

        Ok(Self {
            name: take("name")?,
            email: take("email")?,
            institution: take("institution")?,
            position: take("position")?,
            phone: take("phone")?,
            image,
        })
    }

    /// Build the upstream payload, consuming the text fields.
    pub fn into_new_user(self, image_url: String) -> NewUser {
        NewUser {
            name: self.name,
            email: self.email,
            institution: self.institution,
            position: self.position,
            phone: self.phone,
            image_url,
        }
    }
}

fn invalid_form(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::InvalidForm {
        status: err.status(),
        message: err.body_text(),
    }
}
