//! # Routing Rewrite and Relocation (`commands::migrate::routes`)
//!
//! File: cli/src/commands/migrate/routes.rs
//!
//! ## Overview
//!
//! Lumen routes are registered on a `$router` object in `routes/web.php`;
//! Laravel uses the `Route` facade and expects API routes in
//! `routes/api.php`. This module converts one into the other with a fixed,
//! ordered list of text rules and then moves the result into the API slot.
//!
//! ## Rules
//!
//! `rewrite_routing` applies, in order:
//! 1. `strip_router_doc_comment`: drops the `@var ... Router $router` doc comment;
//! 2. `replace_router_prefix`: `$router->` becomes `Route::`;
//! 3. `strip_router_capture`: drops `use ($router)` from closures;
//! 4. `ensure_route_import`: adds the `Route` facade import after `<?php`
//!    and any leading `declare(...);`;
//! 5. `convert_controller_actions`: `'Controller@action'` strings become
//!    `[App\Http\Controllers\Controller::class, 'action']` callables.
//!
//! Each rule is a pure `&str -> String` function. The rewrite is purely
//! textual; the output is not checked to be valid PHP.
//!
use super::descriptor::ProjectDescriptor;
use crate::common::fs::io;
use crate::core::error::Result;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, info};

pub const WEB_ROUTES: &str = "routes/web.php";
pub const API_ROUTES: &str = "routes/api.php";
pub const ROUTE_IMPORT: &str = r"use Illuminate\Support\Facades\Route;";
const CONTROLLER_NAMESPACE: &str = r"App\Http\Controllers\";

/// Laravel's stock `routes/web.php`, written after the Lumen routes moved out.
pub const DEFAULT_WEB_ROUTES: &str = r#"<?php

use Illuminate\Support\Facades\Route;

/*
|--------------------------------------------------------------------------
| Web Routes
|--------------------------------------------------------------------------
|
| Here is where you can register web routes for your application.
| These routes are loaded by the RouteServiceProvider within a group which
| contains the "web" middleware group. Now create something great!
|
*/

Route::get('/', function () {
    return view('welcome');
});
"#;

static ROUTER_DOC_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/\*\*\s*@var\s+\\?Laravel\\Lumen\\Routing\\Router\s+\$router\s*\*/(?:[ \t]*\r?\n)?")
        .expect("router doc comment pattern is valid")
});

static ROUTER_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*use\s*\(\s*\$router\s*\)").expect("router capture pattern is valid")
});

static LEADING_DECLARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<\?php\s*(?:declare\s*\([^)]*\)\s*;[ \t]*)*")
        .expect("leading declare pattern is valid")
});

// Route::verb(<quoted path>, '<Controller>@<action>') with either quote style
// and an optional trailing comma.
static CONTROLLER_ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"Route::(get|post|put|delete|patch|options|any)\(\s*",
        r#"('(?:[^'\\\n]|\\.)*'|"(?:[^"\\\n]|\\.)*")"#,
        r"\s*,\s*",
        r"(?:'(\\{0,2}[A-Za-z_][A-Za-z0-9_\\]*)@([A-Za-z_][A-Za-z0-9_]*)'",
        r#"|"(\\{0,2}[A-Za-z_][A-Za-z0-9_\\]*)@([A-Za-z_][A-Za-z0-9_]*)")"#,
        r"\s*(?:,\s*)?\)",
    ))
    .expect("controller action pattern is valid")
});

pub fn strip_router_doc_comment(source: &str) -> String {
    ROUTER_DOC_COMMENT.replace_all(source, "").into_owned()
}

pub fn replace_router_prefix(source: &str) -> String {
    source.replace("$router->", "Route::")
}

pub fn strip_router_capture(source: &str) -> String {
    ROUTER_CAPTURE.replace_all(source, "").into_owned()
}

/// Adds the `Route` facade import right after a leading `<?php` tag, unless
/// the import is already present. `declare` statements directly after the
/// tag must stay first, so the import goes after them. Text without the tag
/// is returned as is.
pub fn ensure_route_import(source: &str) -> String {
    if source.contains(ROUTE_IMPORT) || !source.starts_with("<?php") {
        return source.to_string();
    }
    match LEADING_DECLARE.find(source).map(|m| m.as_str().trim_end()) {
        Some(head) if head != "<?php" => {
            format!("{}\n\n{}{}", head, ROUTE_IMPORT, &source[head.len()..])
        }
        _ => format!("<?php\n\n{}{}", ROUTE_IMPORT, &source["<?php".len()..]),
    }
}

pub fn convert_controller_actions(source: &str) -> String {
    CONTROLLER_ACTION
        .replace_all(source, |caps: &Captures| {
            let controller = caps
                .get(3)
                .or_else(|| caps.get(5))
                .map_or(String::new(), |m| m.as_str().replace(r"\\", r"\"));
            let action = caps.get(4).or_else(|| caps.get(6)).map_or("", |m| m.as_str());
            let qualified = if controller.starts_with('\\') {
                controller
            } else {
                format!("{}{}", CONTROLLER_NAMESPACE, controller)
            };
            format!("Route::{}({}, [{}::class, '{}'])", &caps[1], &caps[2], qualified, action)
        })
        .into_owned()
}

/// Applies every routing rule in order.
pub fn rewrite_routing(source: &str) -> String {
    let source = strip_router_doc_comment(source);
    let source = replace_router_prefix(&source);
    let source = strip_router_capture(&source);
    let source = ensure_route_import(&source);
    convert_controller_actions(&source)
}

/// Stage: rewrites the destination's `routes/web.php` in place.
pub fn convert_routes(descriptor: &ProjectDescriptor) -> Result<()> {
    let path = descriptor.destination_path(WEB_ROUTES);
    let source = io::read_file_to_string(&path)?;
    let converted = rewrite_routing(&source);
    io::write_string_to_file(&path, &converted)?;
    info!("Converted Lumen routes in {:?}", path);
    Ok(())
}

/// Stage: moves the converted routes to `routes/api.php` and restores a
/// stock `routes/web.php`.
///
/// An existing `routes/api.php` is deleted first. If the rename then fails
/// the old API routes are already gone.
pub fn relocate_routes(descriptor: &ProjectDescriptor) -> Result<()> {
    let web = descriptor.destination_path(WEB_ROUTES);
    let api = descriptor.destination_path(API_ROUTES);

    if io::remove_file_if_exists(&api)? {
        debug!("Removed scaffold {:?}", api);
    }
    io::rename_file(&web, &api)?;
    io::write_string_to_file(&web, DEFAULT_WEB_ROUTES)?;

    info!("Moved routes to {:?} and restored {:?}", api, web);
    Ok(())
}
