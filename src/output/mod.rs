mod console;
mod json;

pub use console::{format_search_results, format_summary, print_search_results, print_summary};
pub use json::{export_to_file, ExportDocument, ExportedPackage};
