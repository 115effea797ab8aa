pub mod dom;
pub mod fragment_parser;
pub mod letter_items;
pub mod markdown_renderer;
pub mod math_spans;
pub mod postprocess;
pub mod sanitizer;
pub mod script_media;
pub mod tex_scripts;
