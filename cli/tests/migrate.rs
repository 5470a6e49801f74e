//! # lumigrate CLI Migrate Integration Tests
//!
//! File: cli/tests/migrate.rs
//!
//! ## Overview
//!
//! Runs `lumigrate migrate` against a small Lumen fixture. Composer is either
//! missing (stages that need it fail, the rest still run) or replaced by a
//! shell script that copies a Laravel skeleton fixture and simulates a PHP
//! version conflict on the first install.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const LUMEN_MANIFEST: &str = r#"{
    "name": "acme/shop-api",
    "require": {
        "php": "^8.0",
        "laravel/lumen-framework": "^9.0",
        "guzzlehttp/guzzle": "^7.4",
        "vendor/legacy": "^1.2"
    },
    "autoload": {
        "psr-4": {"App\\": "app/"},
        "classmap": ["database/seeds"]
    }
}"#;

const LARAVEL_MANIFEST: &str = r#"{
    "name": "laravel/laravel",
    "require": {
        "php": "^8.0.2",
        "guzzlehttp/guzzle": "^7.2",
        "laravel/framework": "^9.19"
    },
    "require-dev": {
        "phpunit/phpunit": "^9.5.10"
    },
    "autoload": {
        "psr-4": {"App\\": "app/", "Database\\Seeders\\": "database/seeders/"}
    }
}"#;

const LUMEN_ROUTES: &str = r#"<?php

/** @var \Laravel\Lumen\Routing\Router $router */

$router->get('/', function () use ($router) {
    return 'ok';
});

$router->get('/orders', 'OrderController@index');
"#;

/// Lumen project with every copied subtree and the four framework classes.
fn lumen_fixture(origin: &Path) {
    write_file(origin, "composer.json", LUMEN_MANIFEST);
    write_file(origin, ".env", "APP_NAME=ShopApi\nCACHE_DRIVER=redis\nAPP_KEY=\n");
    write_file(origin, "routes/web.php", LUMEN_ROUTES);
    write_file(origin, "public/index.php", "<?php // lumen front controller\n");
    write_file(origin, "public/robots.txt", "User-agent: *\n");
    write_file(
        origin,
        "app/Console/Kernel.php",
        "<?php\n\nnamespace App\\Console;\n\nuse Laravel\\Lumen\\Console\\Kernel as ConsoleKernel;\n",
    );
    write_file(
        origin,
        "app/Exceptions/Handler.php",
        "<?php\n\nuse Laravel\\Lumen\\Exceptions\\Handler as ExceptionHandler;\n",
    );
    write_file(
        origin,
        "app/Providers/EventServiceProvider.php",
        "<?php\n\nuse Laravel\\Lumen\\Providers\\EventServiceProvider as ServiceProvider;\n",
    );
    write_file(
        origin,
        "app/Http/Controllers/Controller.php",
        "<?php\n\nuse Laravel\\Lumen\\Routing\\Controller as BaseController;\n",
    );
    write_file(origin, "app/Http/Controllers/OrderController.php", "<?php\n");
    for subtree in ["resources", "config", "database", "storage", "tests"] {
        write_file(origin, &format!("{}/.gitkeep", subtree), "");
    }
}

#[test]
fn test_migrate_without_composer_reports_failures_and_continues() {
    let work = tempdir().unwrap();
    let origin = work.path().join("shop-api");
    lumen_fixture(&origin);
    let destination = work.path().join("shop-api_new");
    write_file(&destination, "composer.json", LARAVEL_MANIFEST);

    isolated_cmd(work.path())
        .args(["migrate", "shop-api", "--composer"])
        .arg(work.path().join("no-such-composer"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Laravel version: 9.*"))
        .stdout(predicate::str::contains("❌ Create Laravel project"))
        .stdout(predicate::str::contains("✅ Copy Lumen files"))
        .stdout(predicate::str::contains("✅ Merge composer.json"))
        .stdout(predicate::str::contains("✅ Move routes to api.php"))
        .stdout(predicate::str::contains("❌ Install dependencies"))
        .stdout(predicate::str::contains("Merge .env files").not());

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(destination.join("composer.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["require"]["guzzlehttp/guzzle"], "^7.2");
    assert_eq!(manifest["require"]["vendor/legacy"], "^1.2");
    assert!(manifest["require"].get("laravel/lumen-framework").is_none());

    let api = fs::read_to_string(destination.join("routes/api.php")).unwrap();
    assert!(api.contains(r"Route::get('/orders', [App\Http\Controllers\OrderController::class, 'index']);"));
    assert!(destination.join("public/robots.txt").exists());
    assert!(!destination.join("public/index.php").exists());
}

#[cfg(unix)]
mod with_fake_composer {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    const FAKE_COMPOSER: &str = r#"#!/bin/sh
echo "$*" >> "$LUMIGRATE_TEST_LOG"
case "$1" in
  create-project)
    mkdir -p "$4" && cp -R "$LUMIGRATE_TEST_SKELETON/." "$4"
    ;;
  install)
    case "$*" in
      *--no-scripts*) exit 0 ;;
    esac
    echo "  Problem 1" >&2
    echo "    - vendor/legacy[1.2.3] require php ^8.3 -> your php version (8.1.2) does not satisfy that requirement." >&2
    exit 2
    ;;
esac
"#;

    fn laravel_skeleton(root: &Path) {
        write_file(root, "composer.json", LARAVEL_MANIFEST);
        write_file(root, ".env", "APP_NAME=Laravel\nAPP_KEY=base64:skeleton\n");
        write_file(root, "public/index.php", "<?php // laravel front controller\n");
        write_file(root, "routes/web.php", "<?php // laravel web routes\n");
        write_file(root, "routes/api.php", "<?php // laravel api routes\n");
    }

    #[test]
    fn test_full_migration_with_conflict_resolution() {
        let work = tempdir().unwrap();
        let origin = work.path().join("repos/shop/api");
        lumen_fixture(&origin);
        let skeleton = work.path().join("skeleton");
        laravel_skeleton(&skeleton);
        let composer = work.path().join("fake-composer");
        fs::write(&composer, FAKE_COMPOSER).unwrap();
        fs::set_permissions(&composer, fs::Permissions::from_mode(0o755)).unwrap();
        let log = work.path().join("composer-calls.log");

        isolated_cmd(work.path())
            .env("LUMIGRATE_TEST_LOG", &log)
            .env("LUMIGRATE_TEST_SKELETON", &skeleton)
            .env("LUMIGRATE_COMPOSER", &composer)
            .args(["migrate", "repos/shop/api", "--name", "shop", "--with-env", "--no-interaction"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Migration of 'shop'"))
            .stdout(predicate::str::contains("✅ Install dependencies"))
            .stdout(predicate::str::contains("✅ Merge .env files"))
            .stdout(predicate::str::contains("Migration completed."));

        let destination = work.path().join("repos/shop/api_new");
        let calls = fs::read_to_string(&log).unwrap();
        let calls: Vec<&str> = calls.lines().collect();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].starts_with("create-project --prefer-dist laravel/laravel "));
        assert!(calls[0].ends_with("api_new 9.* --no-interaction"));
        assert_eq!(calls[1], "install --no-interaction");
        assert_eq!(calls[2], "install --no-scripts --no-interaction");

        assert_eq!(
            fs::read_to_string(destination.join("removed_packages.txt")).unwrap(),
            "Incompatible packages:\nvendor/legacy\n\n"
        );
        let manifest_text = fs::read_to_string(destination.join("composer.json")).unwrap();
        assert!(manifest_text.ends_with("}\n"));
        let manifest: serde_json::Value = serde_json::from_str(&manifest_text).unwrap();
        assert!(manifest["require"].get("vendor/legacy").is_none());
        assert_eq!(manifest["require"]["guzzlehttp/guzzle"], "^7.2");
        assert_eq!(manifest["require-dev"]["phpunit/phpunit"], "^9.5.10");
        assert_eq!(manifest["autoload"]["classmap"][0], "database/seeds");

        assert_eq!(
            fs::read_to_string(destination.join("public/index.php")).unwrap(),
            "<?php // laravel front controller\n"
        );
        let kernel = fs::read_to_string(destination.join("app/Console/Kernel.php")).unwrap();
        assert!(kernel.contains("use Illuminate\\Foundation\\Console\\Kernel as ConsoleKernel;"));
        let api = fs::read_to_string(destination.join("routes/api.php")).unwrap();
        assert!(api.starts_with("<?php\n\nuse Illuminate\\Support\\Facades\\Route;"));
        assert!(!api.contains("$router"));
        let web = fs::read_to_string(destination.join("routes/web.php")).unwrap();
        assert!(web.contains("return view('welcome');"));
        assert_eq!(
            fs::read_to_string(destination.join(".env")).unwrap(),
            "APP_NAME=Laravel\nCACHE_DRIVER=redis\nAPP_KEY=base64:skeleton"
        );
    }
}
