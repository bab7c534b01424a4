pub mod output;

pub use output::{render_json, OutputMode};
