//! Generate the OpenAPI specification file

use sessionkit_web::openapi::ApiDoc;
use std::fs;
use std::path::Path;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Generating OpenAPI specification...");

    let docs_dir = Path::new("sessionkit-web/docs");
    if !docs_dir.exists() {
        fs::create_dir_all(docs_dir)?;
    }

    let openapi = ApiDoc::openapi();

    let json_path = docs_dir.join("openapi.json");
    fs::write(&json_path, openapi.to_pretty_json()?)?;
    println!("Generated: {}", json_path.display());

    Ok(())
}
