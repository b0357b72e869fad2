//! Page templates, compiled into the binary.

use salvo::writing::Text;
use tera::{Context, Tera};

use crate::error::AppError;
use crate::identity::Viewer;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("feed.html", include_str!("../templates/feed.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("group.html", include_str!("../templates/group.html")),
    ("follow.html", include_str!("../templates/follow.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("post.html", include_str!("../templates/post.html")),
    ("post_form.html", include_str!("../templates/post_form.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    ("about_author.html", include_str!("../templates/about_author.html")),
    ("about_tech.html", include_str!("../templates/about_tech.html")),
    ("404.html", include_str!("../templates/404.html")),
    ("500.html", include_str!("../templates/500.html")),
];

/// Compiles every page template.
pub fn load() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

/// A context carrying what the base layout needs.
#[must_use]
pub fn context(viewer: &Viewer) -> Context {
    let mut ctx = Context::new();
    ctx.insert("viewer", &viewer.as_user());
    ctx
}

/// Renders `name` as an HTML response body.
pub fn render(tera: &Tera, name: &str, ctx: &Context) -> Result<Text<String>, AppError> {
    Ok(Text::Html(tera.render(name, ctx)?))
}
