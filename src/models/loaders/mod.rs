pub mod toml_loader;

pub use toml_loader::{load_all_request_files, load_catalog, load_material, load_toml_to_request};
