use actix_web::{get, web, HttpResponse, Responder};
use serde::Serialize;

use crate::{utils::html::escape_text, AppState};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Open,
    Public,
    Admin,
}

impl Access {
    fn label(&self) -> &'static str {
        match self {
            Access::Open => "none",
            Access::Public => "public",
            Access::Admin => "admin",
        }
    }
}

/// One documented endpoint. `versioned` paths live under the API prefix.
#[derive(Debug, Clone, Copy)]
pub struct RouteDoc {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
    pub summary: &'static str,
    pub versioned: bool,
}

const fn api(method: &'static str, path: &'static str, access: Access, summary: &'static str) -> RouteDoc {
    RouteDoc { method, path, access, summary, versioned: true }
}

const fn root(method: &'static str, path: &'static str, summary: &'static str) -> RouteDoc {
    RouteDoc { method, path, access: Access::Open, summary, versioned: false }
}

pub const ROUTE_TABLE: &[RouteDoc] = &[
    root("GET", "/", "Landing information"),
    root("GET", "/health", "Liveness report with version, environment and database status"),
    root("GET", "/api/docs", "This page"),
    root("GET", "/api/docs/routes.json", "Route table as JSON"),
    api("GET", "/projects", Access::Public, "List projects, optional status filter, newest first"),
    api("GET", "/projects/{id}", Access::Public, "Read one project"),
    api("POST", "/projects", Access::Admin, "Create a project"),
    api("PUT", "/projects/{id}", Access::Admin, "Partially update a project"),
    api("DELETE", "/projects/{id}", Access::Admin, "Delete a project"),
    api("POST", "/projects/upload", Access::Admin, "Upload up to 6 project images"),
    api("GET", "/news", Access::Public, "List news, newest publication first"),
    api("GET", "/news/{id}", Access::Public, "Read one news article"),
    api("POST", "/news", Access::Admin, "Create a news article"),
    api("PUT", "/news/{id}", Access::Admin, "Partially update a news article"),
    api("DELETE", "/news/{id}", Access::Admin, "Delete a news article"),
    api("POST", "/news/upload", Access::Admin, "Upload up to 6 news images"),
    api("POST", "/complaints", Access::Public, "Submit a complaint (JSON or form)"),
    api("GET", "/complaints", Access::Admin, "List complaints, newest first"),
    api("GET", "/complaints/{id}", Access::Admin, "Read one complaint"),
    api("DELETE", "/complaints/{id}", Access::Admin, "Delete a complaint"),
    api("POST", "/subscribers/subscribe", Access::Public, "Subscribe or resubscribe an email"),
    api("POST", "/subscribers/unsubscribe", Access::Public, "Unsubscribe an email"),
    api("GET", "/subscribers/count", Access::Public, "Count active subscribers"),
    api("GET", "/subscribers", Access::Admin, "List subscribers, optional subscribed filter"),
    api("POST", "/newsletter/send", Access::Admin, "Send a newsletter to a test address or all subscribers"),
    api("GET", "/newsletter/templates", Access::Admin, "List newsletter templates"),
    api("GET", "/newsletter/templates/{id}", Access::Admin, "Read one template"),
    api("POST", "/newsletter/templates", Access::Admin, "Create a template"),
    api("PUT", "/newsletter/templates/{id}", Access::Admin, "Partially update a template"),
    api("DELETE", "/newsletter/templates/{id}", Access::Admin, "Delete a template"),
    api("GET", "/newsletter/campaigns", Access::Admin, "List recorded campaigns"),
];

#[derive(Debug, Serialize)]
pub struct RouteEntry {
    pub method: &'static str,
    pub path: String,
    pub access: Access,
    pub summary: &'static str,
}

pub fn route_entries(api_prefix: &str) -> Vec<RouteEntry> {
    ROUTE_TABLE
        .iter()
        .map(|doc| RouteEntry {
            method: doc.method,
            path: if doc.versioned {
                format!("{}{}", api_prefix, doc.path)
            } else {
                doc.path.to_string()
            },
            access: doc.access,
            summary: doc.summary,
        })
        .collect()
}

fn render_page(title: &str, entries: &[RouteEntry]) -> String {
    let rows: String = entries
        .iter()
        .map(|entry| {
            format!(
                "<tr><td class=\"method {method}\">{method_upper}</td><td><code>{path}</code></td><td>{access}</td><td>{summary}</td></tr>",
                method = entry.method.to_lowercase(),
                method_upper = entry.method,
                path = escape_text(&entry.path),
                access = entry.access.label(),
                summary = escape_text(entry.summary),
            )
        })
        .collect();

    let title = escape_text(title);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} API</title>
<style>
body {{ font-family: -apple-system, Segoe UI, Roboto, sans-serif; margin: 2rem; color: #1f2933; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ text-align: left; padding: .5rem .75rem; border-bottom: 1px solid #e4e7eb; }}
.method {{ font-weight: 600; font-family: monospace; }}
.get {{ color: #2f855a; }} .post {{ color: #2b6cb0; }} .put {{ color: #b7791f; }} .delete {{ color: #c53030; }}
</style>
</head>
<body>
<h1>{title} API</h1>
<p>Admin routes require the <code>x-api-key</code> header (or <code>Authorization: Bearer</code>) carrying the admin key.</p>
<table>
<thead><tr><th>Method</th><th>Path</th><th>Access</th><th>Description</th></tr></thead>
<tbody>{rows}</tbody>
</table>
</body>
</html>"#
    )
}

#[get("/api/docs")]
pub async fn api_docs(state: web::Data<AppState>) -> impl Responder {
    let entries = route_entries(&state.config.api_prefix());

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&state.config.name, &entries))
}

#[get("/api/docs/routes.json")]
pub async fn api_routes(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(route_entries(&state.config.api_prefix()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versioned_routes_get_the_prefix() {
        let entries = route_entries("/api/v1");
        assert!(entries.iter().any(|e| e.path == "/api/v1/projects/upload"));
        assert!(entries.iter().any(|e| e.path == "/health"));
    }

    #[test]
    fn page_shows_literal_paths() {
        let html = render_page("Civic", &route_entries("/api/v1"));
        assert!(html.contains("<code>/api/v1/newsletter/send</code>"));
        assert!(!html.contains("&#47;"));
    }

    #[test]
    fn page_lists_every_route() {
        let entries = route_entries("/api/v1");
        let html = render_page("Civic", &entries);
        assert_eq!(html.matches("<tr><td").count(), ROUTE_TABLE.len());
    }
}
