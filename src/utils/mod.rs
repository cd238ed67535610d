//! Coercion and validation helpers shared by the URL parser and handlers.

pub mod call_sign;
pub mod host;
pub mod http;
pub mod parse;
pub mod phone;
pub mod validate;

pub use call_sign::{CallSign, is_call_sign, parse_call_sign};
pub use host::{is_hostname, is_ipaddr};
pub use http::{escape_html, escape_xml, http_response_code_lookup};
pub use parse::{ListInput, parse_bool, parse_list, parse_values, split_path};
pub use phone::{PhoneNumber, is_phone_no, parse_phone_no};
pub use validate::validate_regex;
