//! URL grammar, query dialects and the encoding helpers used to render URLs
//! back out.

mod assembly;
mod encoding;
mod parser;
mod post_process;
mod privacy;
mod query;

pub use assembly::{UrlParts, url_assembly};
pub use encoding::{quote, unquote, urlencode};
pub use parser::{ParseOptions, ParsedUrl, parse_url};
pub use post_process::{parse, post_process};
pub use privacy::{PrivacyMode, pprint, pprint_default, redact_url};
pub use query::{QueryArgs, parse_qsd};
