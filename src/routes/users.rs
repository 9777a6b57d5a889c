use crate::{
    auth::{
        recovery, session, Authenticate, CurrentUser, ForgotPasswordRequest, LoginRequest,
        RegisterRequest, RequireRole, ResetPasswordRequest, UpdateRoleRequest, VerifyOtpRequest,
    },
    error::AppError,
    models::{AuthenticatedUser, Role},
    response,
    state::AppState,
};
use actix_web::{get, http::StatusCode, patch, post, web, Responder};
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Creates a member account and returns a session token.
///
/// ## Responses:
/// - `201 Created`: `{ code, message, token }`.
/// - `400 Bad Request`: invalid payload or the email is already registered.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let (_, token) =
        session::register(state.store.as_ref(), &state.auth, register_data.into_inner()).await?;

    response::with_payload(
        StatusCode::CREATED,
        "User created successfully",
        "token",
        &token,
    )
}

/// Login user
///
/// Verifies credentials and issues a fresh token; any earlier token of the same
/// user stops working.
///
/// ## Responses:
/// - `200 OK`: `{ code, message, token }`.
/// - `400 Bad Request`: unknown email or wrong password.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = session::login(state.store.as_ref(), &state.auth, login_data.into_inner()).await?;

    response::with_payload(StatusCode::OK, "Login successful", "token", &token)
}

/// Mails a one-time recovery code to a registered address.
#[post("/password/forgot")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    recovery::forgot_password(
        state.store.as_ref(),
        state.mailer.as_ref(),
        &state.auth,
        &body.email,
    )
    .await?;

    Ok(response::message(StatusCode::OK, "OTP sent to your email"))
}

/// Exchanges a valid code for a reset token.
#[post("/password/otp")]
pub async fn verify_otp(
    state: web::Data<AppState>,
    body: web::Json<VerifyOtpRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    let token = recovery::verify_otp(state.store.as_ref(), &state.auth, &body.email, &body.otp)
        .await?;

    response::with_payload(StatusCode::OK, "OTP verified", "token", &token)
}

#[post("/password/reset")]
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<impl Responder, AppError> {
    body.validate()?;

    recovery::reset_password(state.store.as_ref(), &state.auth, &body.token, &body.password)
        .await?;

    Ok(response::message(
        StatusCode::OK,
        "Password reset successfully",
    ))
}

/// The caller's identity without any secret fields.
#[get("/profile", wrap = "Authenticate")]
pub async fn profile(user: CurrentUser) -> Result<impl Responder, AppError> {
    response::with_payload(StatusCode::OK, "Profile fetched", "data", &user.into_inner())
}

#[get("/logout", wrap = "Authenticate")]
pub async fn logout(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    session::logout(state.store.as_ref(), user.id).await?;
    log::info!("user {} logged out", user.id);

    Ok(response::message(StatusCode::OK, "Logged out successfully"))
}

/// Sets the role of another account. Admins only.
///
/// ## Responses:
/// - `200 OK`: `{ code, message, data }` with the updated identity.
/// - `400 Bad Request`: role missing or not one of `admin`, `member`.
/// - `403 Forbidden`: caller is not an admin.
/// - `404 Not Found`: no such user.
#[patch(
    "/update-role/{id}",
    wrap = "RequireRole::admin()",
    wrap = "Authenticate"
)]
pub async fn update_role(
    state: web::Data<AppState>,
    user_id: web::Path<Uuid>,
    body: web::Json<UpdateRoleRequest>,
) -> Result<impl Responder, AppError> {
    let role = body
        .role
        .as_deref()
        .and_then(Role::parse)
        .ok_or_else(|| AppError::BadRequest("Role must be one of: admin, member".into()))?;
    let user_id = user_id.into_inner();

    if !state.store.update_role(user_id, role).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    log::info!("user {} is now {}", user.id, role.as_str());

    response::with_payload(
        StatusCode::OK,
        "Role updated successfully",
        "data",
        &AuthenticatedUser::from(user),
    )
}
