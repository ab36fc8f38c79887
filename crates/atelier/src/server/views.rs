//! HTML for the admin screens and the storefront.

use std::fmt::Write;

use crate::auth::User;
use crate::content::{ContentField, ValueType};
use crate::pages::{page_info, PAGES};
use crate::status::Status;
use crate::store::{format_usd, CartView, Order, Product};

/// Escape text for use in element content or a quoted attribute.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<link rel=\"stylesheet\" href=\"/assets/css/styles.css\">\n\
         </head>\n<body>\n<main class=\"admin-shell\">\n{body}\n</main>\n</body>\n</html>\n",
        escape(title)
    )
}

fn status_line(status: &Status) -> String {
    format!(
        "<p class=\"status status--{}\" role=\"status\">{}</p>",
        status.level,
        escape(&status.message)
    )
}

/// The sign-in form, optionally with a message above it.
#[must_use]
pub fn sign_in(status: Option<&Status>) -> String {
    let body = format!(
        "<section class=\"admin-card\">\n<p class=\"section-kicker\">Admin Login</p>\n\
         <h1>Sign in to manage the site</h1>\n{}\n</section>",
        sign_in_form(status, "/admin/sign-in")
    );
    layout("Admin", &body)
}

fn sign_in_form(status: Option<&Status>, action: &str) -> String {
    let message = status.map(status_line).unwrap_or_default();
    format!(
        "{message}\n\
         <form class=\"admin-form\" method=\"post\" action=\"{action}\">\n\
         <label for=\"admin-email\">Email</label>\n\
         <input id=\"admin-email\" name=\"email\" type=\"email\" autocomplete=\"email\" required>\n\
         <label for=\"admin-password\">Password</label>\n\
         <input id=\"admin-password\" name=\"password\" type=\"password\" autocomplete=\"current-password\" required>\n\
         <button class=\"btn\" type=\"submit\">Sign In</button>\n</form>"
    )
}

/// The admin overview: editable pages, the product form and the product
/// table.
#[must_use]
pub fn admin_overview(user: &User, products: &[Product], status: Option<&Status>) -> String {
    let mut body = String::new();
    let _ = write!(
        body,
        "<section class=\"admin-card\">\n<h1>Admin Dashboard</h1>\n\
         <p>Signed in as {}</p>\n\
         <form method=\"post\" action=\"/admin/sign-out\"><button class=\"btn btn-secondary\" type=\"submit\">Sign Out</button></form>\n\
         </section>\n",
        escape(&user.email)
    );

    body.push_str("<section class=\"admin-card\">\n<h2>Site Content</h2>\n<ul class=\"admin-pages\">\n");
    for page in PAGES {
        let _ = writeln!(
            body,
            "<li data-page=\"{id}\"><a href=\"/admin/content/{id}\">{}</a> <code>{}</code></li>",
            escape(page.label),
            page.file,
            id = page.id,
        );
    }
    body.push_str("</ul>\n</section>\n");

    body.push_str("<section class=\"admin-card\" id=\"products\">\n<h2>Store Products</h2>\n");
    if let Some(status) = status {
        body.push_str(&status_line(status));
        body.push('\n');
    }
    body.push_str(
        "<form class=\"admin-form\" method=\"post\" action=\"/admin/products\" enctype=\"multipart/form-data\">\n\
         <label>Product id <input name=\"id\" placeholder=\"Leave blank for a new product\"></label>\n\
         <label>Name <input name=\"name\" required></label>\n\
         <label>Price <input name=\"price\" inputmode=\"decimal\" required></label>\n\
         <label>Description <textarea name=\"description\"></textarea></label>\n\
         <label>Categories <input name=\"categories\"></label>\n\
         <label>Inventory <input name=\"inventory\" type=\"number\" min=\"0\"></label>\n\
         <label><input name=\"active\" type=\"checkbox\" checked> Active</label>\n\
         <label>Image <input name=\"image\" type=\"file\" accept=\"image/*\"></label>\n\
         <button class=\"btn\" type=\"submit\">Save Product</button>\n</form>\n",
    );
    if products.is_empty() {
        body.push_str("<p>No products yet.</p>\n");
    } else {
        body.push_str(
            "<table class=\"admin-table\">\n<thead><tr><th>Name</th><th>Price</th>\
             <th>Inventory</th><th>Status</th><th></th></tr></thead>\n<tbody>\n",
        );
        for product in products {
            let id = escape(&product.id);
            let _ = writeln!(
                body,
                "<tr data-product-id=\"{id}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><form method=\"post\" action=\"/admin/products/{id}/delete\">\
                 <button class=\"btn btn-secondary btn-small\" type=\"submit\">Delete</button></form></td></tr>",
                escape(&product.name),
                format_usd(product.price_cents),
                product.inventory_count.unwrap_or(0),
                if product.is_active { "Active" } else { "Hidden" }
            );
        }
        body.push_str("</tbody>\n</table>\n");
    }
    body.push_str("</section>");

    layout("Admin Dashboard", &body)
}

/// The content editor for one page: a form per editable field.
#[must_use]
pub fn content_editor(page: &str, fields: &[ContentField], status: Option<&Status>) -> String {
    let label = page_info(page).map_or(page, |p| p.label);
    let page = escape(page);
    let mut body = String::new();
    let _ = write!(
        body,
        "<section class=\"admin-card\">\n<p class=\"section-kicker\"><a href=\"/admin\">Admin Dashboard</a></p>\n\
         <h1>{}</h1>\n",
        escape(label)
    );
    if let Some(status) = status {
        body.push_str(&status_line(status));
        body.push('\n');
    }
    if fields.is_empty() {
        body.push_str("<p>This page has no editable content.</p>\n");
    }

    for field in fields {
        let key = escape(&field.key);
        let value = escape(&field.value);
        let input = match field.value_type {
            ValueType::Text => format!("<textarea name=\"value\">{value}</textarea>"),
            _ => format!("<input name=\"value\" value=\"{value}\">"),
        };
        let upload = if field.value_type.accepts_upload() {
            "\n<input name=\"image\" type=\"file\" accept=\"image/*\">"
        } else {
            ""
        };
        let _ = writeln!(
            body,
            "<form class=\"content-field\" data-key=\"{key}\" method=\"post\" action=\"/admin/content/{page}\" enctype=\"multipart/form-data\">\n\
             <label><code>{key}</code> <small>{}</small></label>\n\
             <input type=\"hidden\" name=\"key\" value=\"{key}\">\n\
             <input type=\"hidden\" name=\"type\" value=\"{}\">\n\
             {input}{upload}\n\
             <button class=\"btn btn-small\" type=\"submit\">Save</button>\n</form>",
            field.value_type,
            field.value_type,
        );
        if field.saved {
            let _ = writeln!(
                body,
                "<form method=\"post\" action=\"/admin/content/{page}/reset\">\
                 <input type=\"hidden\" name=\"key\" value=\"{key}\">\
                 <button class=\"btn btn-secondary btn-small\" type=\"submit\">Use template value</button></form>"
            );
        }
    }
    body.push_str("</section>");

    layout("Edit Content", &body)
}

/// The storefront: products, the signed-in user's cart and their orders.
#[must_use]
pub fn storefront(
    user: Option<&User>,
    products: &[Product],
    cart: Option<&CartView>,
    orders: &[Order],
    status: Option<&Status>,
) -> String {
    let mut body = String::from("<section class=\"store-layout\">\n<div>\n<h1>Shop the collection</h1>\n");
    match user {
        Some(user) => {
            let _ = writeln!(
                body,
                "<p class=\"store-status\">Signed in as {}.</p>\n\
                 <form method=\"post\" action=\"/admin/sign-out?next=/cart\"><button class=\"btn btn-secondary btn-small\" type=\"submit\">Sign out</button></form>",
                escape(&user.email)
            );
        }
        None => body.push_str("<p class=\"store-status\">Sign in to add items to your cart.</p>\n"),
    }
    if let Some(status) = status {
        body.push_str(&status_line(status));
        body.push('\n');
    }

    body.push_str("<div class=\"store-grid\">\n");
    if products.is_empty() {
        body.push_str("<p class=\"small-note\">No products are available right now.</p>\n");
    }
    for product in products {
        let image = product.image_url.as_deref().map_or_else(
            || "<div class=\"product-art product-art--placeholder\"></div>".to_string(),
            |url| {
                format!(
                    "<div class=\"product-media\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></div>",
                    escape(url),
                    escape(&product.name)
                )
            },
        );
        let disabled = if user.is_some() && product.in_stock() { "" } else { " disabled" };
        let button = if product.in_stock() { "Add to Cart" } else { "Out of stock" };
        let _ = writeln!(
            body,
            "<article class=\"product-card\" data-product-id=\"{id}\">{image}\n\
             <h3>{}</h3>\n<p class=\"product-price\">{}</p>\n<p class=\"product-desc\">{}</p>\n\
             <form method=\"post\" action=\"/cart/add\"><input type=\"hidden\" name=\"product_id\" value=\"{id}\">\
             <button class=\"btn btn-secondary\" type=\"submit\"{disabled}>{button}</button></form>\n</article>",
            escape(&product.name),
            format_usd(product.price_cents),
            escape(product.description.as_deref().unwrap_or_default()),
            id = escape(&product.id),
        );
    }
    body.push_str("</div>\n</div>\n<aside class=\"cart-panel\">\n<h2>Cart</h2>\n");

    match (user, cart) {
        (Some(_), Some(cart)) => {
            if cart.is_empty() {
                body.push_str("<p class=\"small-note\">Your cart is empty.</p>\n");
            }
            for line in &cart.lines {
                let _ = writeln!(
                    body,
                    "<div class=\"cart-item\" data-product-id=\"{id}\"><h4>{}</h4><p class=\"small-note\">{} each</p>\n\
                     <form method=\"post\" action=\"/cart/set\"><input type=\"hidden\" name=\"product_id\" value=\"{id}\">\
                     <input name=\"quantity\" type=\"number\" min=\"0\" value=\"{}\">\
                     <button class=\"btn btn-small\" type=\"submit\">Update</button></form>\n\
                     <form method=\"post\" action=\"/cart/remove\"><input type=\"hidden\" name=\"product_id\" value=\"{id}\">\
                     <button class=\"btn btn-secondary btn-small\" type=\"submit\">Remove</button></form></div>",
                    escape(&line.name),
                    format_usd(line.price_cents),
                    line.quantity,
                    id = escape(&line.product_id),
                );
            }
            let disabled = if cart.is_empty() { " disabled" } else { "" };
            let _ = writeln!(
                body,
                "<div class=\"cart-total-row\"><span>Total</span> <strong>{}</strong></div>\n\
                 <form method=\"post\" action=\"/cart/checkout\"><button class=\"btn\" type=\"submit\"{disabled}>Place Order</button></form>",
                cart.total_display()
            );
        }
        _ => body.push_str(&sign_in_form(None, "/admin/sign-in?next=/cart")),
    }

    if !orders.is_empty() {
        body.push_str("\n<h2>Orders</h2>\n<ul class=\"order-list\">\n");
        for order in orders {
            let _ = writeln!(
                body,
                "<li data-order-id=\"{}\">{} &middot; {} items &middot; {}</li>",
                escape(&order.id),
                order.created_at.format("%Y-%m-%d %H:%M"),
                order.items.iter().map(|item| item.quantity).sum::<i64>(),
                format_usd(order.total_cents)
            );
        }
        body.push_str("</ul>\n");
    }
    body.push_str("</aside>\n</section>");

    layout("Store", &body)
}

/// A bare error page.
#[must_use]
pub fn error_page(status: &Status) -> String {
    layout("Error", &status_line(status))
}
