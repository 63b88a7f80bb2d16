use crate::api::{render, render_with_status};
use crate::auth::{login_cookie, logout_cookie};
use crate::config::Config;
use crate::db::DbPool;
use crate::error::{AppError, Result};
use crate::models::{LoginForm, SignupForm};
use crate::services::users;
use crate::views::{LoginTemplate, SignupTemplate};
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};

#[utoipa::path(
    get,
    path = "/signup",
    responses(
        (status = 200, description = "Sign-up form", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn signup_form() -> Result<HttpResponse> {
    render(SignupTemplate {
        current_user: None,
        error: String::new(),
    })
}

#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = SignupForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "User created and logged in, redirect to /"),
        (status = 400, description = "Invalid form", content_type = "text/html", body = String),
        (status = 409, description = "Username or email already taken", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn signup(
    form: web::Form<SignupForm>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let user = match users::signup(pool.get_ref(), form.into_inner().into(), config.auth.bcrypt_cost)
        .await
    {
        Ok(user) => user,
        Err(AppError::Integrity(_)) => {
            return render_with_status(
                StatusCode::CONFLICT,
                SignupTemplate {
                    current_user: None,
                    error: "Username or email already taken".to_string(),
                },
            );
        }
        Err(AppError::Validation(msg)) => {
            return render_with_status(
                StatusCode::BAD_REQUEST,
                SignupTemplate {
                    current_user: None,
                    error: msg,
                },
            );
        }
        Err(e) => return Err(e),
    };

    let cookie =
        login_cookie(&config.auth, user.id).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish())
}

#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 200, description = "Login form", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn login_form() -> Result<HttpResponse> {
    render(LoginTemplate {
        current_user: None,
        error: String::new(),
    })
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in, redirect to /"),
        (status = 401, description = "Invalid credentials", content_type = "text/html", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    form: web::Form<LoginForm>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse> {
    let user = match users::authenticate(pool.get_ref(), &form.username, &form.password).await? {
        Some(user) => user,
        None => {
            log::info!("Failed login for {:?}", form.username);
            return render_with_status(
                StatusCode::UNAUTHORIZED,
                LoginTemplate {
                    current_user: None,
                    error: "Invalid credentials.".to_string(),
                },
            );
        }
    };

    let cookie =
        login_cookie(&config.auth, user.id).map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/"))
        .cookie(cookie)
        .finish())
}

#[utoipa::path(
    get,
    path = "/logout",
    responses(
        (status = 303, description = "Session cleared, redirect to /login")
    ),
    tag = "auth"
)]
pub async fn logout() -> HttpResponse {
    HttpResponse::SeeOther()
        .append_header((header::LOCATION, "/login"))
        .cookie(logout_cookie())
        .finish()
}
