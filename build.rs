// build.rs

use std::env;

fn main() -> anyhow::Result<()> {
    let api_port = env::var("API_PORT").unwrap_or_else(|_| "8080".into());
    let store_file = env::var("STORE_FILE").unwrap_or_else(|_| "tempdash.store".into());

    println!("cargo:rustc-env=API_PORT={api_port}");
    println!("cargo:rustc-env=STORE_FILE={store_file}");
    println!("cargo:rerun-if-env-changed=API_PORT");
    println!("cargo:rerun-if-env-changed=STORE_FILE");

    Ok(())
}

// EOF
