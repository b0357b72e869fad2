//! Log in, sign up and log out.
//!
//! Passwords are stored as argon2 PHC strings. A successful login or sign up
//! writes the user id under [`SESSION_USER_KEY`] in the salvo session.

use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use salvo::prelude::*;
use salvo::session::SessionDepotExt;
use yatube_store::{FieldErrors, NewUser, StoreError, User};

use crate::access::safe_next;
use crate::error::AppError;
use crate::identity::{SESSION_USER_KEY, Viewer};
use crate::state::AppState;
use crate::{templates, urls};

pub const MIN_PASSWORD_LEN: usize = 8;

const BAD_CREDENTIALS: &str = "Please enter a correct username and password.";
const PASSWORD_TOO_SHORT: &str = "This password is too short. It must contain at least 8 characters.";

/// `GET /auth/login/`
#[handler]
pub async fn login_form(req: &mut Request, depot: &mut Depot) -> Result<Text<String>, AppError> {
    let next = req.query::<String>("next").unwrap_or_default();
    render_login(depot, "", &next, None)
}

/// `POST /auth/login/`
#[handler]
pub async fn login(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let form = req.form_data().await?;
    let username = form.fields.get("username").map(|u| u.trim().to_owned()).unwrap_or_default();
    let password = form.fields.get("password").cloned().unwrap_or_default();
    let next = form.fields.get("next").cloned().unwrap_or_default();

    let state = AppState::from_depot(depot)?;
    let user = match state.store.find_user_by_username(&username).await? {
        Some(user) if verify_password(&user, &password) => user,
        _ => {
            tracing::warn!(%username, "failed login");
            res.render(render_login(depot, &username, &next, Some(BAD_CREDENTIALS))?);
            return Ok(());
        }
    };
    start_session(depot, &user)?;
    urls::redirect(res, safe_next(Some(&next)));
    Ok(())
}

/// `GET /auth/signup/`
#[handler]
pub async fn signup_form(depot: &mut Depot) -> Result<Text<String>, AppError> {
    render_signup(depot, "", &FieldErrors::new())
}

/// `POST /auth/signup/`: registers the user and logs them in.
#[handler]
pub async fn signup(req: &mut Request, depot: &mut Depot, res: &mut Response) -> Result<(), AppError> {
    let form = req.form_data().await?;
    let username = form.fields.get("username").cloned().unwrap_or_default();
    let password = form.fields.get("password").cloned().unwrap_or_default();

    if password.chars().count() < MIN_PASSWORD_LEN {
        res.render(render_signup(depot, &username, &FieldErrors::single("password", PASSWORD_TOO_SHORT))?);
        return Ok(());
    }
    let password_hash = hash_password(&password)?;
    let state = AppState::from_depot(depot)?;
    let user = match state
        .store
        .create_user(NewUser {
            username: username.clone(),
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Validation(errors)) => {
            res.render(render_signup(depot, &username, &errors)?);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    start_session(depot, &user)?;
    urls::redirect(res, urls::INDEX);
    Ok(())
}

/// `GET /auth/logout/`
#[handler]
pub async fn logout(depot: &mut Depot, res: &mut Response) {
    if let Some(session) = depot.session_mut() {
        session.remove(SESSION_USER_KEY);
    }
    urls::redirect(res, urls::INDEX);
}

fn start_session(depot: &mut Depot, user: &User) -> Result<(), AppError> {
    match depot.session_mut() {
        Some(session) => session.insert(SESSION_USER_KEY, user.id.0)?,
        None => tracing::warn!("no session handler installed, login is not persisted"),
    }
    tracing::info!(user = %user.username, "logged in");
    Ok(())
}

/// Hashes `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

fn verify_password(user: &User, password: &str) -> bool {
    match PasswordHash::new(&user.password_hash) {
        Ok(hash) => Argon2::default().verify_password(password.as_bytes(), &hash).is_ok(),
        Err(e) => {
            tracing::error!(error = %e, user = %user.username, "stored password hash is malformed");
            false
        }
    }
}

fn render_login(depot: &Depot, username: &str, next: &str, error: Option<&str>) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let mut ctx = templates::context(&Viewer::from_depot(depot));
    ctx.insert("username", username);
    ctx.insert("next", next);
    ctx.insert("error", &error);
    templates::render(&state.templates, "login.html", &ctx)
}

fn render_signup(depot: &Depot, username: &str, errors: &FieldErrors) -> Result<Text<String>, AppError> {
    let state = AppState::from_depot(depot)?;
    let mut ctx = templates::context(&Viewer::from_depot(depot));
    ctx.insert("username", username);
    ctx.insert("username_errors", errors.get("username"));
    ctx.insert("password_errors", errors.get("password"));
    templates::render(&state.templates, "signup.html", &ctx)
}
