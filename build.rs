//! Stamps the build version, timestamp and ISO build time into the binary.

use chrono::Utc;

fn main() {
    let now = Utc::now();
    let timestamp = now.timestamp_millis();

    let version = std::env::var("STOREFRONT_BUILD_VERSION").unwrap_or_else(|_| {
        let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
        format!("{}-{}", pkg, timestamp)
    });

    println!("cargo:rustc-env=STOREFRONT_BUILD_VERSION={}", version);
    println!("cargo:rustc-env=STOREFRONT_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=STOREFRONT_BUILD_TIME={}", now.to_rfc3339());

    println!("cargo:rerun-if-env-changed=STOREFRONT_BUILD_VERSION");
    println!("cargo:rerun-if-changed=src");
}
