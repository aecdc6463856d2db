pub mod markdown;
pub mod response;

pub use markdown::{ escape_html, render_markdown };
pub use response::{ format_suggestion, FALLBACK_RESPONSE };
