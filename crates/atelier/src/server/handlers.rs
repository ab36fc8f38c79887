//! Request handlers.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use tracing::{debug, info};

use super::forms::UploadForm;
use super::{views, AppState, ServerError, SESSION_COOKIE};
use crate::auth::{admin_gate, require_admin, require_user, Access, Auth, Credentials, User};
use crate::backend::Backend;
use crate::content::{ContentWriter, ValueType, SAVED};
use crate::error::{self, Error};
use crate::pages::{page_for_route, render_page, SiteTemplates};
use crate::status::Status;
use crate::store::{Cart, Catalog, Orders, ProductForm, ADDED_TO_CART, ORDER_SAVED};

/// GET /
pub async fn home(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    render(&state, "home")
}

/// GET /{page}
pub async fn page(
    State(state): State<AppState>,
    Path(route): Path<String>,
) -> Result<Html<String>, ServerError> {
    let Some(page) = page_for_route(&route) else {
        return Err(Error::UnknownPage { page: route }.into());
    };
    render(&state, page)
}

fn render(state: &AppState, page: &str) -> Result<Html<String>, ServerError> {
    let backend = state.backend()?;
    let html = render_page(&backend.storage, &state.templates, page)?;
    Ok(Html(html))
}

/// GET /admin
pub async fn admin(State(state): State<AppState>, headers: HeaderMap) -> Result<Html<String>, ServerError> {
    let token = session_token(&headers);
    let backend = state.backend()?;
    match admin_gate(&backend.storage, token.as_deref())? {
        Access::SignIn { status } => Ok(Html(views::sign_in(status.as_ref()))),
        Access::Admin { user } => Ok(Html(admin_overview(&backend, &user, None)?)),
    }
}

fn admin_overview(backend: &Backend, user: &User, status: Option<&Status>) -> error::Result<String> {
    let products = Catalog::new(backend).list_all()?;
    Ok(views::admin_overview(user, &products, status))
}

/// Sign-in form fields.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Password.
    #[serde(default)]
    pub password: String,
}

/// Where to go after signing in or out.
#[derive(Debug, Default, Deserialize)]
pub struct Landing {
    /// `/cart` for the storefront, anything else for the admin panel.
    #[serde(default)]
    pub next: Option<String>,
}

impl Landing {
    fn path(&self) -> &'static str {
        match self.next.as_deref() {
            Some(CART_PATH) => CART_PATH,
            _ => "/admin",
        }
    }
}

const CART_PATH: &str = "/cart";

/// POST /admin/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Query(landing): Query<Landing>,
    Form(form): Form<SignInForm>,
) -> Result<Response, ServerError> {
    let backend = state.backend()?;
    let session = match Credentials::new(&form.email, &form.password)
        .and_then(|credentials| Auth::new(&backend.storage).sign_in(&credentials))
    {
        Ok(session) => session,
        Err(e) if e.is_auth_error() => {
            let status = Status::from_error(&e);
            let html = if landing.path() == CART_PATH {
                storefront(&backend, None, Some(&status))?
            } else {
                views::sign_in(Some(&status))
            };
            return Ok(Html(html).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %session.user_id, "signed in");
    let cookie = session_cookie(&session.token, state.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(landing.path())).into_response())
}

/// POST /admin/sign-out
pub async fn sign_out(
    State(state): State<AppState>,
    Query(landing): Query<Landing>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    if let Some(token) = session_token(&headers) {
        let backend = state.backend()?;
        Auth::new(&backend.storage).sign_out(&token)?;
        debug!("signed out");
    }
    let cookie = session_cookie("", state.secure_cookies);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(landing.path())).into_response())
}

/// `Set-Cookie` value for a session token; an empty token clears the cookie.
fn session_cookie(token: &str, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    if token.is_empty() {
        cookie.push_str("; Max-Age=0");
    }
    cookie
}

/// Turn an operation's outcome into the status shown with the page. Errors
/// the visitor can act on stay on the page with their status code; the rest
/// become an error page.
fn settle<T>(result: error::Result<T>, success: &str) -> Result<(StatusCode, Status), ServerError> {
    match result {
        Ok(_) => Ok((StatusCode::OK, Status::success(success))),
        Err(e) => {
            let err = ServerError(e);
            let code = err.status_code();
            if code.is_server_error() {
                return Err(err);
            }
            Ok((code, Status::from_error(&err.0)))
        }
    }
}

/// GET /admin/content/{page}
pub async fn content_editor(
    State(state): State<AppState>,
    Path(page): Path<String>,
    headers: HeaderMap,
) -> Result<Html<String>, ServerError> {
    let token = session_token(&headers);
    let backend = state.backend()?;
    match admin_gate(&backend.storage, token.as_deref())? {
        Access::SignIn { status } => Ok(Html(views::sign_in(status.as_ref()))),
        Access::Admin { .. } => Ok(Html(editor(&backend, &state.templates, &page, None)?)),
    }
}

fn editor(backend: &Backend, templates: &SiteTemplates, page: &str, status: Option<&Status>) -> error::Result<String> {
    let markup = templates.load(page)?;
    let fields = ContentWriter::new(backend).fields(page, &markup)?;
    Ok(views::content_editor(page, &fields, status))
}

/// POST /admin/content/{page}
///
/// Saves the `value` field, or the picked `image` when there is one.
pub async fn save_content(
    State(state): State<AppState>,
    Path(page): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let token = session_token(&headers);
    let backend = state.backend()?;
    require_admin(&backend.storage, token.as_deref())?;

    let result = field_type(&form).and_then(|value_type| {
        let writer = ContentWriter::new(&backend);
        let key = form.text("key");
        match form.upload() {
            Some(upload) => writer.save_upload(&page, key, value_type, upload),
            None => writer.save(&page, key, form.text("value"), value_type),
        }
    });
    let (code, status) = settle(result, SAVED)?;
    let html = editor(&backend, &state.templates, &page, Some(&status))?;
    Ok((code, Html(html)).into_response())
}

fn field_type(form: &UploadForm) -> error::Result<ValueType> {
    match form.text("type") {
        "" if form.upload().is_some() => Ok(ValueType::Src),
        "" => Ok(ValueType::Text),
        name => name.parse(),
    }
}

/// A content key named by a form.
#[derive(Debug, Deserialize)]
pub struct KeyForm {
    /// Content key.
    #[serde(default)]
    pub key: String,
}

/// POST /admin/content/{page}/reset
pub async fn reset_content(
    State(state): State<AppState>,
    Path(page): Path<String>,
    headers: HeaderMap,
    Form(form): Form<KeyForm>,
) -> Result<Response, ServerError> {
    let token = session_token(&headers);
    let backend = state.backend()?;
    require_admin(&backend.storage, token.as_deref())?;

    let status = if ContentWriter::new(&backend).reset(&page, &form.key)? {
        Status::success("Restored the template value.")
    } else {
        Status::info("Nothing was saved for this field.")
    };
    let html = editor(&backend, &state.templates, &page, Some(&status))?;
    Ok(Html(html).into_response())
}

/// POST /admin/products
///
/// Creates a product, or updates the one named by the `id` field.
pub async fn save_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, ServerError> {
    let form = UploadForm::read(multipart).await?;
    let token = session_token(&headers);
    let backend = state.backend()?;
    let user = require_admin(&backend.storage, token.as_deref())?;

    let product = ProductForm {
        name: form.text("name").to_string(),
        price: form.text("price").to_string(),
        description: form.text("description").to_string(),
        categories: form.text("categories").to_string(),
        inventory: form.text("inventory").to_string(),
        is_active: form.checked("active"),
    };
    let id = Some(form.text("id").trim()).filter(|id| !id.is_empty());
    let result = Catalog::new(&backend).save(id, &product, form.upload());
    let (code, status) = settle(result, "Product saved.")?;
    Ok((code, Html(admin_overview(&backend, &user, Some(&status))?)).into_response())
}

/// POST /admin/products/{id}/delete
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let token = session_token(&headers);
    let backend = state.backend()?;
    let user = require_admin(&backend.storage, token.as_deref())?;

    let (code, status) = settle(Catalog::new(&backend).delete(&id), "Product deleted.")?;
    Ok((code, Html(admin_overview(&backend, &user, Some(&status))?)).into_response())
}

/// GET /cart
pub async fn cart(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Html<String>, ServerError> {
    let token = session_token(&headers);
    let backend = state.backend()?;
    let user = match token {
        Some(token) => Auth::new(&backend.storage).current_user(&token)?,
        None => None,
    };
    Ok(Html(storefront(&backend, user.as_ref(), None)?))
}

fn storefront(backend: &Backend, user: Option<&User>, status: Option<&Status>) -> error::Result<String> {
    let products = Catalog::new(backend).list_active()?;
    let Some(user) = user else {
        return Ok(views::storefront(None, &products, None, &[], status));
    };
    let cart = Cart::new(&backend.storage, user).view()?;
    let orders = Orders::new(&backend.storage, user).history()?;
    Ok(views::storefront(Some(user), &products, Some(&cart), &orders, status))
}

/// A cart line named by a form.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    /// Product in the cart.
    #[serde(default)]
    pub product_id: String,
    /// New quantity, for updates.
    #[serde(default)]
    pub quantity: String,
}

/// Which cart operation a POST performs.
#[derive(Debug, Clone, Copy)]
enum CartAction {
    Add,
    Set,
    Remove,
    Checkout,
}

fn cart_action(
    state: &AppState,
    headers: &HeaderMap,
    action: CartAction,
    form: &CartForm,
) -> Result<Response, ServerError> {
    let token = session_token(headers);
    let backend = state.backend()?;
    let user = require_user(&backend.storage, token.as_deref())?;

    let cart = Cart::new(&backend.storage, &user);
    let (code, status) = match action {
        CartAction::Add => settle(cart.add(&form.product_id), ADDED_TO_CART)?,
        CartAction::Set => {
            let result = form
                .quantity
                .trim()
                .parse::<i64>()
                .map_err(|_| Error::validation("Enter a quantity."))
                .and_then(|quantity| cart.set_quantity(&form.product_id, quantity));
            settle(result, "Cart updated.")?
        }
        CartAction::Remove => settle(cart.remove(&form.product_id), "Removed from cart.")?,
        CartAction::Checkout => {
            settle(Orders::new(&backend.storage, &user).checkout(), ORDER_SAVED)?
        }
    };
    let html = storefront(&backend, Some(&user), Some(&status))?;
    Ok((code, Html(html)).into_response())
}

/// POST /cart/add
pub async fn cart_add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CartForm>,
) -> Result<Response, ServerError> {
    cart_action(&state, &headers, CartAction::Add, &form)
}

/// POST /cart/set
pub async fn cart_set(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CartForm>,
) -> Result<Response, ServerError> {
    cart_action(&state, &headers, CartAction::Set, &form)
}

/// POST /cart/remove
pub async fn cart_remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CartForm>,
) -> Result<Response, ServerError> {
    cart_action(&state, &headers, CartAction::Remove, &form)
}

/// POST /cart/checkout
pub async fn cart_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let form = CartForm {
        product_id: String::new(),
        quantity: String::new(),
    };
    cart_action(&state, &headers, CartAction::Checkout, &form)
}

/// Session token from the request's cookies.
fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_session_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; atelier_session=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("atelier_session="));
        assert_eq!(session_token(&headers), None);
    }
}
