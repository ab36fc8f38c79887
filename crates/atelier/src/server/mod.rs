//! Page server.
//!
//! Serves the site pages with their overrides applied, the static assets,
//! uploaded bucket objects, the admin editor and the storefront.

pub mod forms;
pub mod handlers;
pub mod views;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::backend::Backend;
use crate::buckets::PUBLIC_PREFIX;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pages::SiteTemplates;
use crate::status::Status;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "atelier_session";

/// Largest request body accepted, sized for image uploads.
pub const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    backend: Arc<Mutex<Backend>>,
    templates: Arc<SiteTemplates>,
    assets_dir: PathBuf,
    buckets_dir: PathBuf,
    secure_cookies: bool,
}

impl AppState {
    /// Bundle a backend with the site's templates and assets.
    #[must_use]
    pub fn new(backend: Backend, templates: SiteTemplates, assets_dir: impl Into<PathBuf>) -> Self {
        let buckets_dir = backend.buckets.root().to_path_buf();
        Self {
            backend: Arc::new(Mutex::new(backend)),
            templates: Arc::new(templates),
            assets_dir: assets_dir.into(),
            buckets_dir,
            secure_cookies: false,
        }
    }

    /// Mark the session cookie `Secure`, for sites served over HTTPS.
    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Lock the backend for the duration of one handler's queries.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a previous holder panicked.
    pub fn backend(&self) -> Result<MutexGuard<'_, Backend>> {
        self.backend
            .lock()
            .map_err(|_| Error::internal("backend lock poisoned"))
    }
}

/// Create the application router.
pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.assets_dir);
    let objects = ServeDir::new(&state.buckets_dir);

    Router::new()
        .route("/", get(handlers::home))
        .route("/admin", get(handlers::admin))
        .route("/admin/sign-in", post(handlers::sign_in))
        .route("/admin/sign-out", post(handlers::sign_out))
        .route(
            "/admin/content/{page}",
            get(handlers::content_editor).post(handlers::save_content),
        )
        .route("/admin/content/{page}/reset", post(handlers::reset_content))
        .route("/admin/products", post(handlers::save_product))
        .route("/admin/products/{id}/delete", post(handlers::delete_product))
        .route("/cart", get(handlers::cart))
        .route("/cart/add", post(handlers::cart_add))
        .route("/cart/set", post(handlers::cart_set))
        .route("/cart/remove", post(handlers::cart_remove))
        .route("/cart/checkout", post(handlers::cart_checkout))
        .route("/{page}", get(handlers::page))
        .nest_service("/assets", assets)
        .nest_service(PUBLIC_PREFIX, objects)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the backend and serve the site until the process is stopped.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened or the address cannot
/// be bound.
pub async fn serve(config: &Config) -> Result<()> {
    let backend = Backend::open(config)?;
    let templates = SiteTemplates::new(&config.site.templates_dir);
    let state = AppState::new(backend, templates, &config.site.assets_dir)
        .with_secure_cookies(config.backend.project_url.starts_with("https://"));

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "serving site");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// A library error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ServerError(pub Error);

impl From<Error> for ServerError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ServerError {
    /// HTTP status for the error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::UnknownPage { .. } | Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::NotSignedIn | Error::InvalidCredentials | Error::MissingCredentials => {
                StatusCode::UNAUTHORIZED
            }
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Validation { .. }
            | Error::ProductUnavailable { .. }
            | Error::OutOfStock { .. }
            | Error::UnknownValueType(_)
            | Error::EmptyCart => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        (status, Html(views::error_page(&Status::from_error(&self.0)))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::Utc;
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{Auth, Credentials};
    use crate::buckets::SITE_IMAGES;
    use crate::content::{ContentOverride, ValueType, GLOBAL_PAGE};
    use crate::store::{Catalog, ProductForm, ORDER_SAVED};

    const BOUNDARY: &str = "atelier-form-boundary";

    /// One part of a multipart body: name, optional file name, contents.
    type Part<'a> = (&'a str, Option<&'a str>, &'a str);

    fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, contents) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(contents.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    struct TestSite {
        _dir: tempfile::TempDir,
        state: AppState,
    }

    impl TestSite {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let templates = dir.path().join("templates");
            let assets = dir.path().join("assets");
            std::fs::create_dir_all(&templates).unwrap();
            std::fs::create_dir_all(assets.join("css")).unwrap();
            std::fs::write(assets.join("css/styles.css"), "body{}").unwrap();
            std::fs::write(
                templates.join("index.html"),
                r#"<nav><a href="booking.html" data-content-href-key="nav-book" data-content-scope="global">Book</a></nav><h1 data-content-key="hero-title">Welcome</h1>"#,
            )
            .unwrap();
            std::fs::write(
                templates.join("booking.html"),
                r#"<h1 data-content-key="title">Book a visit</h1>"#,
            )
            .unwrap();

            let backend = Backend::in_memory(dir.path().join("buckets"), "http://127.0.0.1:8080").unwrap();
            let state = AppState::new(backend, SiteTemplates::new(&templates), &assets);
            Self { _dir: dir, state }
        }

        fn save(&self, page: &str, key: &str, value: &str, value_type: ValueType) {
            let backend = self.state.backend().unwrap();
            backend
                .storage
                .upsert_content(&ContentOverride {
                    page: page.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                    value_type,
                    updated_at: Utc::now(),
                })
                .unwrap();
        }

        fn session(&self, admin: bool) -> String {
            let backend = self.state.backend().unwrap();
            let auth = Auth::new(&backend.storage);
            let email = if admin { "owner@studio.test" } else { "client@studio.test" };
            let session = auth
                .sign_up(&Credentials::new(email, "pw").unwrap())
                .unwrap();
            if admin {
                auth.grant_admin(email).unwrap();
            }
            session.token
        }

        async fn get(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, String) {
            let mut builder = Request::builder().method("GET").uri(uri);
            if let Some(token) = cookie {
                builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
            }
            let response = router(self.state.clone())
                .oneshot(builder.body(Body::empty()).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, String::from_utf8_lossy(&bytes).into_owned())
        }

        async fn post(
            &self,
            uri: &str,
            cookie: Option<&str>,
            content_type: &str,
            body: Vec<u8>,
        ) -> (StatusCode, axum::http::HeaderMap, String) {
            let mut builder = Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, content_type);
            if let Some(token) = cookie {
                builder = builder.header(header::COOKIE, format!("{SESSION_COOKIE}={token}"));
            }
            let response = router(self.state.clone())
                .oneshot(builder.body(Body::from(body)).unwrap())
                .await
                .unwrap();
            let status = response.status();
            let headers = response.headers().clone();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, headers, String::from_utf8_lossy(&bytes).into_owned())
        }

        async fn form(&self, uri: &str, cookie: Option<&str>, body: &str) -> (StatusCode, String) {
            let (status, _, body) = self
                .post(uri, cookie, "application/x-www-form-urlencoded", body.as_bytes().to_vec())
                .await;
            (status, body)
        }

        async fn multipart(&self, uri: &str, cookie: Option<&str>, parts: &[Part<'_>]) -> (StatusCode, String) {
            let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
            let (status, _, body) = self
                .post(uri, cookie, &content_type, multipart_body(parts))
                .await;
            (status, body)
        }

        fn stock(&self, name: &str, price: &str) -> String {
            let backend = self.state.backend().unwrap();
            let form = ProductForm {
                name: name.to_string(),
                price: price.to_string(),
                is_active: true,
                ..ProductForm::default()
            };
            Catalog::new(&backend).save(None, &form, None).unwrap().id
        }
    }

    #[tokio::test]
    async fn test_home_renders_overrides() {
        let site = TestSite::new();
        site.save("home", "hero-title", "Fresh cuts", ValueType::Text);
        site.save(GLOBAL_PAGE, "nav-book", "contact.html", ValueType::Href);

        let (status, body) = site.get("/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(">Fresh cuts</h1>"));
        assert!(body.contains(r#"href="/contact""#));
    }

    #[tokio::test]
    async fn test_page_routes() {
        let site = TestSite::new();
        site.save("booking", "title", "Reserve", ValueType::Text);

        for uri in ["/booking", "/booking.html"] {
            let (status, body) = site.get(uri, None).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.contains(">Reserve</h1>"));
        }
        let (status, _) = site.get("/index.html", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_page_is_404() {
        let site = TestSite::new();
        let (status, body) = site.get("/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Unknown page."));
        let (status, _) = site.get("/global", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_known_page_without_template_is_500() {
        let site = TestSite::new();
        let (status, body) = site.get("/faq", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("Unable to load page template."));
    }

    #[tokio::test]
    async fn test_serves_assets_and_objects() {
        let site = TestSite::new();
        {
            let backend = site.state.backend().unwrap();
            backend
                .buckets
                .upload(SITE_IMAGES, "content/a.txt", b"object", true)
                .unwrap();
        }

        let (status, body) = site.get("/assets/css/styles.css", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "body{}");

        let (status, body) = site
            .get("/storage/v1/object/public/site-images/content/a.txt", None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "object");
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let site = TestSite::new();

        let (status, body) = site.get("/admin", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sign in to manage the site"));

        let client = site.session(false);
        let (_, body) = site.get("/admin", Some(&client)).await;
        assert!(body.contains("Sign in to manage the site"));
        assert!(body.contains("You do not have admin access."));
        assert!(!body.contains("Admin Dashboard</h1>"));

        let owner = site.session(true);
        let (_, body) = site.get("/admin", Some(&owner)).await;
        assert!(body.contains("Admin Dashboard</h1>"));
        assert!(body.contains("owner@studio.test"));
    }

    #[tokio::test]
    async fn test_sign_in_sets_cookie() {
        let site = TestSite::new();
        site.session(true);

        let request = Request::builder()
            .method("POST")
            .uri("/admin/sign-in")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=owner%40studio.test&password=pw"))
            .unwrap();
        let response = router(site.state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("atelier_session="));

        let request = Request::builder()
            .method("POST")
            .uri("/admin/sign-in")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("email=owner%40studio.test&password=wrong"))
            .unwrap();
        let response = router(site.state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Invalid login credentials"));
    }

    #[tokio::test]
    async fn test_content_editor_save_and_reset() {
        let site = TestSite::new();
        let owner = site.session(true);

        let (status, body) = site.get("/admin/content/home", Some(&owner)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("data-key=\"hero-title\""));
        let (_, body) = site.get("/admin/content/home", None).await;
        assert!(body.contains("Sign in to manage the site"));

        let (status, body) = site
            .multipart(
                "/admin/content/home",
                Some(&owner),
                &[
                    ("key", None, "hero-title"),
                    ("type", None, "text"),
                    ("value", None, "Fresh cuts"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("status--success"));
        assert!(body.contains("Saved."));
        let (_, page) = site.get("/", None).await;
        assert!(page.contains(">Fresh cuts</h1>"));

        let (status, body) = site
            .form("/admin/content/home/reset", Some(&owner), "key=hero-title")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Restored the template value."));
        let (_, page) = site.get("/", None).await;
        assert!(page.contains(">Welcome</h1>"));
    }

    #[tokio::test]
    async fn test_content_editor_uploads_image() {
        let site = TestSite::new();
        let owner = site.session(true);

        let (status, body) = site
            .multipart(
                "/admin/content/home",
                Some(&owner),
                &[
                    ("key", None, "hero-image"),
                    ("type", None, "src"),
                    ("value", None, ""),
                    ("image", Some("Hero.JPG"), "jpeg"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Saved."));

        let stored = {
            let backend = site.state.backend().unwrap();
            backend.storage.get_content("home", "hero-image").unwrap().unwrap()
        };
        assert_eq!(stored.value_type, ValueType::Src);
        let path = stored.value.strip_prefix("http://127.0.0.1:8080").unwrap();
        assert!(path.starts_with("/storage/v1/object/public/site-images/content/hero-image-"));
        let (status, object) = site.get(path, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(object, "jpeg");
    }

    #[tokio::test]
    async fn test_content_editor_rejects_bad_input() {
        let site = TestSite::new();
        let owner = site.session(true);

        let (status, body) = site
            .multipart(
                "/admin/content/home",
                Some(&owner),
                &[("key", None, "hero-title"), ("type", None, "color"), ("value", None, "x")],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("status--error"));

        let (status, _) = site
            .multipart("/admin/content/nowhere", Some(&owner), &[("key", None, "a")])
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_admin_posts_pass_the_gate() {
        let site = TestSite::new();
        let client = site.session(false);
        let parts: &[Part<'_>] = &[("name", None, "Gel"), ("price", None, "9")];

        let (status, body) = site.multipart("/admin/products", None, parts).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Sign in to continue."));
        let (status, body) = site.multipart("/admin/products", Some(&client), parts).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("You do not have admin access."));
        let (status, _) = site
            .form("/admin/content/home/reset", Some(&client), "key=hero-title")
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let backend = site.state.backend().unwrap();
        assert_eq!(backend.storage.stats().unwrap().products, 0);
    }

    #[tokio::test]
    async fn test_product_admin_routes() {
        let site = TestSite::new();
        let owner = site.session(true);

        let (status, body) = site
            .multipart(
                "/admin/products",
                Some(&owner),
                &[
                    ("id", None, ""),
                    ("name", None, "Curl Cream"),
                    ("price", None, "18"),
                    ("inventory", None, "5"),
                    ("active", None, "on"),
                    ("image", Some("cream.png"), "png"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Product saved."));
        assert!(body.contains("Curl Cream"));
        assert!(body.contains("$18.00"));

        let product = {
            let backend = site.state.backend().unwrap();
            Catalog::new(&backend).list_all().unwrap().remove(0)
        };
        assert_eq!(product.inventory_count, Some(5));
        assert!(product.is_active);
        assert!(product
            .image_url
            .unwrap()
            .contains("/product-images/products/curl-cream-"));

        let (status, body) = site
            .multipart(
                "/admin/products",
                Some(&owner),
                &[("name", None, ""), ("price", None, "18")],
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Enter a product name and price."));

        let uri = format!("/admin/products/{}/delete", product.id);
        let (status, body) = site.form(&uri, Some(&owner), "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Product deleted."));
        assert!(body.contains("No products yet."));
        let (status, _) = site.form(&uri, Some(&owner), "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storefront_cart_and_checkout() {
        let site = TestSite::new();
        let product_id = site.stock("Curl Cream", "18");
        let client = site.session(false);

        let (status, body) = site.get("/cart", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Sign in to add items to your cart."));
        assert!(body.contains("Curl Cream"));
        let add = format!("product_id={product_id}");
        let (status, _) = site.form("/cart/add", None, &add).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = site.form("/cart/add", Some(&client), &add).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Added to cart."));
        assert!(body.contains("Signed in as client@studio.test."));

        let set = format!("product_id={product_id}&quantity=3");
        let (status, body) = site.form("/cart/set", Some(&client), &set).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Cart updated."));
        assert!(body.contains("$54.00"));

        let bad = format!("product_id={product_id}&quantity=lots");
        let (status, body) = site.form("/cart/set", Some(&client), &bad).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Enter a quantity."));

        let (status, body) = site.form("/cart/checkout", Some(&client), "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(ORDER_SAVED));
        assert!(body.contains("Your cart is empty."));
        assert!(body.contains("<h2>Orders</h2>"));

        let (status, body) = site.form("/cart/checkout", Some(&client), "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("status--error"));

        site.form("/cart/add", Some(&client), &add).await;
        let (status, body) = site.form("/cart/remove", Some(&client), &add).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Removed from cart."));
        let (status, _) = site.form("/cart/remove", Some(&client), &add).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storefront_sign_in_lands_on_cart() {
        let site = TestSite::new();
        site.session(false);

        let (status, headers, _) = site
            .post(
                "/admin/sign-in?next=/cart",
                None,
                "application/x-www-form-urlencoded",
                b"email=client%40studio.test&password=pw".to_vec(),
            )
            .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/cart");

        let (status, body) = site
            .form("/admin/sign-in?next=/cart", None, "email=client%40studio.test&password=no")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Invalid login credentials"));
        assert!(body.contains("Shop the collection"));
    }

    #[tokio::test]
    async fn test_session_cookie_attributes() {
        let site = TestSite::new();
        site.session(true);
        let sign_in = b"email=owner%40studio.test&password=pw".to_vec();
        let form = "application/x-www-form-urlencoded";

        let (_, headers, _) = site.post("/admin/sign-in", None, form, sign_in.clone()).await;
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("; HttpOnly"));
        assert!(cookie.contains("; SameSite=Lax"));
        assert!(!cookie.contains("Secure"));

        let secure = TestSite {
            _dir: tempfile::tempdir().unwrap(),
            state: site.state.clone().with_secure_cookies(true),
        };
        let (_, headers, _) = secure.post("/admin/sign-in", None, form, sign_in).await;
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("atelier_session="));
        assert!(cookie.ends_with("; Secure"));

        let (_, headers, _) = secure.post("/admin/sign-out", None, form, Vec::new()).await;
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert_eq!(
            cookie,
            "atelier_session=; Path=/; HttpOnly; SameSite=Lax; Secure; Max-Age=0"
        );
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ServerError(Error::UnknownPage { page: "x".into() }).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ServerError(Error::Forbidden).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServerError(Error::internal("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
