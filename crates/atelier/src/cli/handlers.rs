//! Command handlers.
//!
//! Each handler writes its data to `out` and reports its outcome as a
//! [`Status`]. Failures are turned into an error status where they happen.

use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info};

use super::commands::{
    AuthCommand, CartCommand, ConfigCommand, ContentCommand, CredentialArgs, OrdersCommand,
    ProductArgs, ProductCommand, ServeCommand, StatusCommand,
};
use super::session::{SessionFile, StoredSession};
use super::Command;
use crate::auth::{require_admin, require_user, Auth, Credentials, User};
use crate::backend::Backend;
use crate::buckets::Upload;
use crate::config::Config;
use crate::content::{scan, ContentWriter, ValueType, GLOBAL_PAGE, SAVED};
use crate::error::{Error, Result};
use crate::pages::{self, SiteTemplates};
use crate::status::Status;
use crate::store::{format_usd, Cart, Catalog, Orders, ProductForm, ADDED_TO_CART, ORDER_SAVED};

/// Run a command and report how it went.
pub fn run(command: Command, config: &Config, out: &mut dyn Write) -> Status {
    let mut ctx = Context::new(config, out);
    let result = match command {
        Command::Serve(cmd) => handle_serve(&ctx, cmd),
        Command::Status(cmd) => handle_status(&mut ctx, &cmd),
        Command::Content(cmd) => handle_content(&mut ctx, cmd),
        Command::Auth(cmd) => handle_auth(&mut ctx, cmd),
        Command::Product(cmd) => handle_product(&mut ctx, cmd),
        Command::Cart(cmd) => handle_cart(&mut ctx, cmd),
        Command::Orders(cmd) => handle_orders(&mut ctx, &cmd),
        Command::Config(cmd) => handle_config(&mut ctx, cmd),
    };
    result.unwrap_or_else(|e| Status::from_error(&e))
}

struct Context<'a> {
    config: &'a Config,
    session: SessionFile,
    out: &'a mut dyn Write,
}

impl<'a> Context<'a> {
    fn new(config: &'a Config, out: &'a mut dyn Write) -> Self {
        Self {
            config,
            session: SessionFile::new(config.session_path()),
            out,
        }
    }

    fn backend(&self) -> Result<Backend> {
        Backend::open(self.config)
    }

    fn templates(&self) -> SiteTemplates {
        SiteTemplates::new(&self.config.site.templates_dir)
    }

    fn token(&self) -> Result<Option<String>> {
        self.session.token()
    }

    fn json(&mut self, value: &impl serde::Serialize) -> Result<()> {
        writeln!(self.out, "{}", serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}

fn handle_serve(ctx: &Context<'_>, cmd: ServeCommand) -> Result<Status> {
    let mut config = ctx.config.clone();
    if let Some(bind) = cmd.bind {
        config.server.bind = bind;
        config.validate()?;
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(crate::server::serve(&config))?;
    Ok(Status::info("Server stopped."))
}

fn handle_status(ctx: &mut Context<'_>, cmd: &StatusCommand) -> Result<Status> {
    let backend = ctx.backend()?;
    let stats = backend.storage.stats()?;

    if cmd.json {
        let status = serde_json::json!({
            "database_path": backend.storage.path(),
            "buckets_dir": backend.buckets.root(),
            "project_url": ctx.config.backend.project_url,
            "stats": stats,
        });
        ctx.json(&status)?;
    } else {
        let out = &mut ctx.out;
        writeln!(out, "atelier status")?;
        writeln!(out, "--------------")?;
        writeln!(out, "Project:       {}", ctx.config.backend.project_url)?;
        writeln!(out, "Database:      {}", backend.storage.path().display())?;
        writeln!(out, "Buckets:       {}", backend.buckets.root().display())?;
        writeln!(out, "Size:          {} bytes", stats.db_size_bytes)?;
        writeln!(out)?;
        writeln!(out, "Content:       {}", stats.content_overrides)?;
        writeln!(out, "Users:         {}", stats.users)?;
        writeln!(out, "Products:      {}", stats.products)?;
        writeln!(out, "Cart items:    {}", stats.cart_items)?;
        writeln!(out, "Orders:        {}", stats.orders)?;
        if let Some(newest) = stats.newest_order {
            writeln!(out, "Newest order:  {}", newest.format("%Y-%m-%d %H:%M"))?;
        }
    }
    Ok(Status::success("Backend is ready."))
}

fn handle_content(ctx: &mut Context<'_>, cmd: ContentCommand) -> Result<Status> {
    match cmd {
        ContentCommand::Scan { page, json } => {
            let markup = ctx.templates().load(&page)?;
            let defaults = scan(&markup, &page)?;
            if json {
                ctx.json(&defaults)?;
            } else {
                for default in &defaults {
                    writeln!(
                        ctx.out,
                        "{:<24} {:<10} {:<6} {}",
                        default.key, default.value_type, default.scope, default.default_value
                    )?;
                }
            }
            Ok(Status::success(format!("Loaded {} items.", defaults.len())))
        }
        ContentCommand::Show { page, json } => {
            let backend = ctx.backend()?;
            require_admin(&backend.storage, ctx.token()?.as_deref())?;
            let markup = ctx.templates().load(&page)?;
            let fields = ContentWriter::new(&backend).fields(&page, &markup)?;
            if json {
                ctx.json(&fields)?;
            } else {
                for field in &fields {
                    let marker = if field.saved { "*" } else { " " };
                    writeln!(
                        ctx.out,
                        "{marker} {:<24} {:<10} {}",
                        field.key, field.value_type, field.value
                    )?;
                }
            }
            Ok(Status::success(format!("Loaded {} items.", fields.len())))
        }
        ContentCommand::Set {
            page,
            key,
            value,
            value_type,
            file,
        } => {
            let backend = ctx.backend()?;
            require_admin(&backend.storage, ctx.token()?.as_deref())?;
            let value_type = match value_type {
                Some(arg) => arg.into(),
                None => scanned_type(ctx, &page, &key)?
                    .unwrap_or(if file.is_some() { ValueType::Src } else { ValueType::Text }),
            };

            let writer = ContentWriter::new(&backend);
            let saved = match (value, file) {
                (_, Some(path)) => {
                    let upload = Upload::from_path(&path)?;
                    writer.save_upload(&page, &key, value_type, &upload)?
                }
                (Some(value), None) => writer.save(&page, &key, &value, value_type)?,
                (None, None) => return Err(Error::validation("Enter a value or choose a file.")),
            };
            writeln!(ctx.out, "{}", saved.value)?;
            Ok(Status::success(SAVED))
        }
        ContentCommand::Reset { page, key } => {
            let backend = ctx.backend()?;
            require_admin(&backend.storage, ctx.token()?.as_deref())?;
            if ContentWriter::new(&backend).reset(&page, &key)? {
                Ok(Status::success("Restored the template value."))
            } else {
                Ok(Status::info("Nothing was saved for this field."))
            }
        }
        ContentCommand::Render { page, output } => {
            if page == GLOBAL_PAGE {
                return Err(Error::UnknownPage { page });
            }
            let backend = ctx.backend()?;
            let html = pages::render_page(&backend.storage, &ctx.templates(), &page)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, html)?;
                    Ok(Status::success(format!("Wrote {}.", path.display())))
                }
                None => {
                    write!(ctx.out, "{html}")?;
                    Ok(Status::success(format!("Rendered {page}.")))
                }
            }
        }
    }
}

/// The type the template gives `key`, if the key is found there.
fn scanned_type(ctx: &Context<'_>, page: &str, key: &str) -> Result<Option<ValueType>> {
    let markup = ctx.templates().load(page)?;
    Ok(scan(&markup, page)?
        .into_iter()
        .find(|d| d.key == key)
        .map(|d| d.value_type))
}

fn handle_auth(ctx: &mut Context<'_>, cmd: AuthCommand) -> Result<Status> {
    match cmd {
        AuthCommand::SignUp(args) => {
            let (credentials, backend) = credentials(ctx, &args)?;
            let session = Auth::new(&backend.storage).sign_up(&credentials)?;
            remember(ctx, session.token, &credentials)?;
            Ok(Status::success(format!("Signed up as {}.", credentials.email())))
        }
        AuthCommand::SignIn(args) => {
            let (credentials, backend) = credentials(ctx, &args)?;
            let session = Auth::new(&backend.storage).sign_in(&credentials)?;
            remember(ctx, session.token, &credentials)?;
            Ok(Status::success(format!("Signed in as {}.", credentials.email())))
        }
        AuthCommand::SignOut => {
            let Some(token) = ctx.token()? else {
                return Ok(Status::info("Not signed in."));
            };
            let backend = ctx.backend()?;
            Auth::new(&backend.storage).sign_out(&token)?;
            ctx.session.clear()?;
            Ok(Status::success("Signed out."))
        }
        AuthCommand::Whoami => {
            let backend = ctx.backend()?;
            let user = require_user(&backend.storage, ctx.token()?.as_deref())?;
            let is_admin = Auth::new(&backend.storage)
                .profile(&user)?
                .is_some_and(|p| p.is_admin);
            writeln!(ctx.out, "{}", user.email)?;
            let role = if is_admin { "admin" } else { "customer" };
            Ok(Status::info(format!("Signed in as {} ({role}).", user.email)))
        }
        AuthCommand::GrantAdmin { email } => {
            let backend = ctx.backend()?;
            let user = Auth::new(&backend.storage).grant_admin(&email)?;
            Ok(Status::success(format!("{} is now an admin.", user.email)))
        }
    }
}

fn credentials(ctx: &Context<'_>, args: &CredentialArgs) -> Result<(Credentials, Backend)> {
    let credentials = Credentials::new(&args.email, &args.password)?;
    Ok((credentials, ctx.backend()?))
}

fn remember(ctx: &Context<'_>, token: String, credentials: &Credentials) -> Result<()> {
    ctx.session.save(&StoredSession {
        token,
        email: credentials.email().to_string(),
    })?;
    debug!(path = %ctx.session.path().display(), "session remembered");
    Ok(())
}

fn handle_product(ctx: &mut Context<'_>, cmd: ProductCommand) -> Result<Status> {
    let backend = ctx.backend()?;
    match cmd {
        ProductCommand::List { all, json } => {
            let catalog = Catalog::new(&backend);
            let products = if all {
                require_admin(&backend.storage, ctx.token()?.as_deref())?;
                catalog.list_all()?
            } else {
                catalog.list_active()?
            };
            if json {
                ctx.json(&products)?;
            } else {
                for product in &products {
                    let stock = product
                        .inventory_count
                        .map_or_else(|| "-".to_string(), |n| n.to_string());
                    let listed = if product.is_active { "Active" } else { "Hidden" };
                    writeln!(
                        ctx.out,
                        "{}  {:<28} {:>10} {:>5}  {listed}",
                        product.id,
                        product.name,
                        format_usd(product.price_cents),
                        stock
                    )?;
                }
            }
            Ok(Status::success(format!("Loaded {} products.", products.len())))
        }
        ProductCommand::Save(args) => {
            require_admin(&backend.storage, ctx.token()?.as_deref())?;
            let image = args.image.as_deref().map(Upload::from_path).transpose()?;
            let form = product_form(&args);
            let product = Catalog::new(&backend).save(args.id.as_deref(), &form, image.as_ref())?;
            writeln!(ctx.out, "{}", product.id)?;
            Ok(Status::success("Product saved."))
        }
        ProductCommand::Delete { id } => {
            require_admin(&backend.storage, ctx.token()?.as_deref())?;
            Catalog::new(&backend).delete(&id)?;
            Ok(Status::success("Product deleted."))
        }
    }
}

fn product_form(args: &ProductArgs) -> ProductForm {
    ProductForm {
        name: args.name.clone(),
        price: args.price.clone(),
        description: args.description.clone(),
        categories: args.categories.clone(),
        inventory: args.inventory.clone(),
        is_active: !args.hidden,
    }
}

fn handle_cart(ctx: &mut Context<'_>, cmd: CartCommand) -> Result<Status> {
    let backend = ctx.backend()?;
    let user = require_user(&backend.storage, ctx.token()?.as_deref())?;
    let cart = Cart::new(&backend.storage, &user);
    match cmd {
        CartCommand::Show { json } => {
            let view = cart.view()?;
            if json {
                ctx.json(&view)?;
            }
            if view.is_empty() {
                return Ok(Status::info("Your cart is empty."));
            }
            if !json {
                for line in &view.lines {
                    writeln!(
                        ctx.out,
                        "{:>3} x {:<28} {:>10}",
                        line.quantity,
                        line.name,
                        format_usd(line.line_total()?)
                    )?;
                }
                writeln!(ctx.out, "Total: {}", view.total_display())?;
            }
            Ok(Status::success(format!("Loaded {} items.", view.lines.len())))
        }
        CartCommand::Add { product_id } => {
            let quantity = cart.add(&product_id)?;
            debug!(%product_id, quantity, "cart updated");
            Ok(Status::success(ADDED_TO_CART))
        }
        CartCommand::Set {
            product_id,
            quantity,
        } => {
            cart.set_quantity(&product_id, quantity)?;
            Ok(Status::success("Cart updated."))
        }
        CartCommand::Remove { product_id } => {
            cart.remove(&product_id)?;
            Ok(Status::success("Removed from cart."))
        }
        CartCommand::Checkout => {
            let order = Orders::new(&backend.storage, &user).checkout()?;
            writeln!(ctx.out, "{}  {}", order.id, format_usd(order.total_cents))?;
            Ok(Status::success(ORDER_SAVED))
        }
    }
}

fn handle_orders(ctx: &mut Context<'_>, cmd: &OrdersCommand) -> Result<Status> {
    let backend = ctx.backend()?;
    let user: User = require_user(&backend.storage, ctx.token()?.as_deref())?;
    let orders = Orders::new(&backend.storage, &user).history()?;
    if cmd.json {
        ctx.json(&orders)?;
    } else {
        for order in &orders {
            writeln!(
                ctx.out,
                "{}  {}  {:>10}  ({} items)",
                order.created_at.format("%Y-%m-%d %H:%M"),
                order.id,
                format_usd(order.total_cents),
                order.items.len()
            )?;
        }
    }
    Ok(Status::success(format!("Loaded {} orders.", orders.len())))
}

fn handle_config(ctx: &mut Context<'_>, cmd: ConfigCommand) -> Result<Status> {
    let config = ctx.config;
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                ctx.json(config)?;
            } else {
                let out = &mut ctx.out;
                writeln!(out, "Current Configuration")?;
                writeln!(out, "=====================")?;
                writeln!(out)?;
                writeln!(out, "[Backend]")?;
                writeln!(out, "  Project URL:        {}", config.backend.project_url)?;
                writeln!(out, "  Public key set:     {}", !config.backend.anon_key.trim().is_empty())?;
                writeln!(out)?;
                writeln!(out, "[Storage]")?;
                writeln!(out, "  Database path:      {}", config.database_path().display())?;
                writeln!(out, "  Buckets dir:        {}", config.buckets_dir().display())?;
                writeln!(out)?;
                writeln!(out, "[Site]")?;
                writeln!(out, "  Templates dir:      {}", config.site.templates_dir.display())?;
                writeln!(out, "  Assets dir:         {}", config.site.assets_dir.display())?;
                writeln!(out)?;
                writeln!(out, "[Server]")?;
                writeln!(out, "  Bind:               {}", config.server.bind)?;
            }
            Ok(Status::success("Configuration loaded."))
        }
        ConfigCommand::Path => {
            writeln!(ctx.out, "{}", Config::default_config_path().display())?;
            Ok(Status::info("Default configuration path."))
        }
        ConfigCommand::Validate { file } => {
            let path: PathBuf = file.unwrap_or_else(Config::default_config_path);
            info!(path = %path.display(), "validating configuration");
            Config::load_from(Some(path))?;
            Ok(Status::success("Configuration is valid."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::status::StatusLevel;
    use clap::Parser;

    struct TestEnv {
        dir: tempfile::TempDir,
        config: Config,
    }

    impl TestEnv {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let templates = dir.path().join("templates");
            std::fs::create_dir_all(&templates).unwrap();
            std::fs::write(
                templates.join("index.html"),
                r#"<h1 data-content-key="hero-title">Welcome</h1><img data-content-key="hero-image" src="assets/hero.jpg">"#,
            )
            .unwrap();

            let mut config = Config::default();
            config.storage.database_path = Some(dir.path().join("data/atelier.db"));
            config.storage.buckets_dir = Some(dir.path().join("data/storage"));
            config.site.templates_dir = templates;
            Self { dir, config }
        }

        fn run(&self, args: &[&str]) -> (Status, String) {
            let mut argv = vec!["atelier"];
            argv.extend_from_slice(args);
            let cli = Cli::try_parse_from(argv).unwrap();
            let mut out = Vec::new();
            let status = run(cli.command, &self.config, &mut out);
            (status, String::from_utf8(out).unwrap())
        }

        fn admin(&self) {
            self.run(&["auth", "sign-up", "-e", "owner@studio.test", "-p", "pw"]);
            self.run(&["auth", "grant-admin", "owner@studio.test"]);
        }
    }

    #[test]
    fn test_sign_up_remembers_session() {
        let env = TestEnv::new();
        let (status, _) = env.run(&["auth", "sign-up", "-e", "ana@studio.test", "-p", "pw"]);
        assert_eq!(status, Status::success("Signed up as ana@studio.test."));

        let (status, out) = env.run(&["auth", "whoami"]);
        assert_eq!(status.level, StatusLevel::Info);
        assert_eq!(out.trim(), "ana@studio.test");

        let (status, _) = env.run(&["auth", "sign-out"]);
        assert_eq!(status, Status::success("Signed out."));
        let (status, _) = env.run(&["auth", "sign-out"]);
        assert_eq!(status, Status::info("Not signed in."));
        let (status, _) = env.run(&["auth", "whoami"]);
        assert!(status.is_error());
    }

    #[test]
    fn test_wrong_password_is_error_status() {
        let env = TestEnv::new();
        env.run(&["auth", "sign-up", "-e", "ana@studio.test", "-p", "pw"]);
        let (status, _) = env.run(&["auth", "sign-in", "-e", "ana@studio.test", "-p", "nope"]);
        assert_eq!(status, Status::error("Invalid login credentials"));
    }

    #[test]
    fn test_content_set_requires_admin() {
        let env = TestEnv::new();
        env.run(&["auth", "sign-up", "-e", "ana@studio.test", "-p", "pw"]);
        let (status, _) = env.run(&["content", "set", "home", "hero-title", "Hi"]);
        assert_eq!(status, Status::error("You do not have admin access."));
    }

    #[test]
    fn test_content_set_and_render() {
        let env = TestEnv::new();
        env.admin();

        let (status, _) = env.run(&["content", "set", "home", "hero-title", "Fresh cuts"]);
        assert_eq!(status, Status::success(SAVED));

        let (status, out) = env.run(&["content", "show", "home"]);
        assert_eq!(status, Status::success("Loaded 2 items."));
        assert!(out.contains("Fresh cuts"));

        let (_, html) = env.run(&["content", "render", "home"]);
        assert!(html.contains(">Fresh cuts</h1>"));
    }

    #[test]
    fn test_content_reset() {
        let env = TestEnv::new();
        env.admin();
        env.run(&["content", "set", "home", "hero-title", "Fresh cuts"]);

        let (status, _) = env.run(&["content", "reset", "home", "hero-title"]);
        assert_eq!(status, Status::success("Restored the template value."));
        let (status, _) = env.run(&["content", "reset", "home", "hero-title"]);
        assert_eq!(status, Status::info("Nothing was saved for this field."));

        let (_, html) = env.run(&["content", "render", "home"]);
        assert!(html.contains(">Welcome</h1>"));
    }

    #[test]
    fn test_content_set_without_value() {
        let env = TestEnv::new();
        env.admin();
        let (status, _) = env.run(&["content", "set", "home", "hero-title"]);
        assert_eq!(status, Status::error("Enter a value or choose a file."));
    }

    #[test]
    fn test_content_upload_uses_template_type() {
        let env = TestEnv::new();
        env.admin();
        let photo = env.dir.path().join("Hero Shot.JPG");
        std::fs::write(&photo, b"jpeg").unwrap();

        let (status, out) = env.run(&[
            "content",
            "set",
            "home",
            "hero-image",
            "--file",
            photo.to_str().unwrap(),
        ]);
        assert_eq!(status, Status::success(SAVED));
        assert!(out.contains("/storage/v1/object/public/site-images/content/"));
    }

    #[test]
    fn test_render_rejects_global() {
        let env = TestEnv::new();
        let (status, _) = env.run(&["content", "render", "global"]);
        assert_eq!(status, Status::error("Unknown page."));
    }

    #[test]
    fn test_store_flow() {
        let env = TestEnv::new();
        env.admin();
        let (status, id) = env.run(&[
            "product", "save", "-n", "Curl Cream", "-p", "10", "--inventory", "5",
        ]);
        assert_eq!(status, Status::success("Product saved."));
        let id = id.trim().to_string();

        let (status, _) = env.run(&["cart", "add", &id]);
        assert_eq!(status, Status::success(ADDED_TO_CART));
        env.run(&["cart", "add", &id]);

        let (_, out) = env.run(&["cart", "show"]);
        assert!(out.contains("Total: $20.00"));

        let (status, out) = env.run(&["cart", "checkout"]);
        assert_eq!(status, Status::success(ORDER_SAVED));
        assert!(out.contains("$20.00"));

        let (status, _) = env.run(&["cart", "show"]);
        assert_eq!(status, Status::info("Your cart is empty."));
        let (status, _) = env.run(&["orders"]);
        assert_eq!(status, Status::success("Loaded 1 orders."));
    }

    #[test]
    fn test_product_save_validation() {
        let env = TestEnv::new();
        env.admin();
        let (status, _) = env.run(&["product", "save", "-n", "Gel", "-p", "free"]);
        assert_eq!(status, Status::error("Enter a product name and price."));
    }

    #[test]
    fn test_cart_requires_sign_in() {
        let env = TestEnv::new();
        let (status, _) = env.run(&["cart", "show"]);
        assert_eq!(status, Status::error("Sign in to continue."));
    }

    #[test]
    fn test_status_reports_counts() {
        let env = TestEnv::new();
        env.admin();
        let (status, out) = env.run(&["status", "--json"]);
        assert_eq!(status, Status::success("Backend is ready."));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["stats"]["users"], 1);
    }

    #[test]
    fn test_unconfigured_backend() {
        let mut env = TestEnv::new();
        env.config.backend.anon_key = String::new();
        let (status, _) = env.run(&["status"]);
        assert_eq!(
            status,
            Status::error("Set your backend project URL and public key before using the site.")
        );
    }
}
