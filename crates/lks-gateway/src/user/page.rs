use maud::{DOCTYPE, Markup, html};

use super::model::User;

const DELETE_SCRIPT: &str = r#"
async function deleteUser(id) {
    if (!confirm("Delete this user?")) return;
    const response = await fetch(`/users/${id}`, { method: "DELETE" });
    const body = await response.json().catch(() => ({}));
    if (!response.ok) {
        alert(body.error || body.message || `Delete failed (${response.status})`);
        return;
    }
    window.location.reload();
}
"#;

/// Resolve a stored image reference to something an `<img>` can load.
pub fn image_src(image_url: Option<&str>, bucket_base_url: &str) -> Option<String> {
    match image_url {
        None | Some("") => None,
        Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
            Some(url.to_string())
        }
        Some(key) => Some(format!("{bucket_base_url}{}", key.trim_start_matches('/'))),
    }
}

pub fn index_page(users: &[User], bucket_base_url: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Users" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { "Users" }
                    (user_table(users, bucket_base_url))
                    (add_user_form())
                }
                script { (maud::PreEscaped(DELETE_SCRIPT)) }
            }
        }
    }
}

fn user_table(users: &[User], bucket_base_url: &str) -> Markup {
    html! {
        @if users.is_empty() {
            p.empty { "No users found." }
        } @else {
            table {
                thead {
                    tr {
                        th { "Photo" }
                        th { "Name" }
                        th { "Email" }
                        th { "Institution" }
                        th { "Position" }
                        th { "Phone" }
                        th {}
                    }
                }
                tbody {
                    @for user in users {
                        tr {
                            td {
                                @if let Some(src) = image_src(user.image_url.as_deref(), bucket_base_url) {
                                    img src=(src) alt=(user.name.as_deref().unwrap_or_default()) width="48" height="48";
                                }
                            }
                            td { (user.name.as_deref().unwrap_or_default()) }
                            td { (user.email.as_deref().unwrap_or_default()) }
                            td { (user.institution.as_deref().unwrap_or_default()) }
                            td { (user.position.as_deref().unwrap_or_default()) }
                            td { (user.phone.as_deref().unwrap_or_default()) }
                            td {
                                @if let Some(id) = user.id {
                                    button type="button" onclick=(format!("deleteUser({id})")) { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn add_user_form() -> Markup {
    html! {
        h2 { "Add user" }
        form method="post" action="/users" enctype="multipart/form-data" {
            label { "Name" input type="text" name="name" required; }
            label { "Email" input type="email" name="email" required; }
            label { "Institution" input type="text" name="institution" required; }
            label { "Position" input type="text" name="position" required; }
            label { "Phone" input type="tel" name="phone" required; }
            label { "Photo" input type="file" name="image" accept="image/*"; }
            button type="submit" { "Save" }
        }
    }
}

const STYLE: &str = "
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; margin-bottom: 2rem; }
th, td { border-bottom: 1px solid #ddd; padding: .5rem; text-align: left; }
img { object-fit: cover; border-radius: 50%; }
form { display: grid; gap: .5rem; max-width: 24rem; }
label { display: grid; gap: .25rem; }
.empty { color: #666; }
";
