use std::sync::Arc;

use salvo::http::StatusCode;
use salvo::prelude::*;
use tera::Tera;

use crate::identity::Viewer;
use crate::templates;

/// Catcher hoop that renders the site's 404 and 500 pages.
///
/// It owns the templates because unmatched routes never reach the state hoop.
#[derive(Clone, Debug)]
pub struct ErrorPage {
    templates: Arc<Tera>,
}

impl ErrorPage {
    pub fn new(templates: Arc<Tera>) -> Self {
        Self { templates }
    }

    fn write(&self, status: StatusCode, req: &Request, depot: &Depot, res: &mut Response) -> bool {
        let name = match status {
            StatusCode::NOT_FOUND => "404.html",
            s if s.is_server_error() => "500.html",
            _ => return false,
        };
        let mut ctx = templates::context(&Viewer::from_depot(depot));
        ctx.insert("path", req.uri().path());
        match templates::render(&self.templates, name, &ctx) {
            Ok(page) => {
                res.render(page);
                true
            }
            Err(e) => {
                tracing::error!(error = %e, template = name, "failed to render error page");
                false
            }
        }
    }
}

#[async_trait]
impl Handler for ErrorPage {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        let Some(status) = res.status_code else {
            return;
        };
        if self.write(status, req, depot, res) {
            ctrl.skip_rest();
        }
    }
}

/// `GET /404/`
#[handler]
pub async fn page_not_found(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    show(StatusCode::NOT_FOUND, req, depot, res);
}

/// `GET /500/`
#[handler]
pub async fn server_error(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    show(StatusCode::INTERNAL_SERVER_ERROR, req, depot, res);
}

fn show(status: StatusCode, req: &Request, depot: &Depot, res: &mut Response) {
    res.status_code(status);
    match crate::state::AppState::from_depot(depot) {
        Ok(state) => {
            ErrorPage::new(state.templates.clone()).write(status, req, depot, res);
        }
        Err(e) => tracing::error!(error = %e, "error pages need the application state"),
    }
}
