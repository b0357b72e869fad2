use salvo::prelude::*;

use crate::error::AppError;
use crate::identity::Viewer;
use crate::state::AppState;
use crate::templates;

#[handler]
pub async fn author(depot: &mut Depot) -> Result<Text<String>, AppError> {
    render_static(depot, "about_author.html")
}

#[handler]
pub async fn tech(depot: &mut Depot) -> Result<Text<String>, AppError> {
    render_static(depot, "about_tech.html")
}

fn render_static(depot: &Depot, name: &str) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    templates::render(&state.templates, name, &templates::context(&Viewer::from_depot(depot)))
}
