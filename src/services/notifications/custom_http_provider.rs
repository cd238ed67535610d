//! Custom HTTP notification handlers: `json://`, `form://` and `xml://`.
//!
//! The three handlers share everything except how the payload is encoded,
//! so they are one generic [`CustomHttpProvider`] over a [`PayloadFormat`].
//!
//! ```text
//! json://[user[:password]@]host[:port][/path]?method=POST&+Header=v&-param=v&:field=v
//! ```
//!
//! - `+key=value` adds an HTTP header
//! - `-key=value` adds a query parameter to the request URL
//! - `:key=value` adds a payload field; on a built-in field (version, title,
//!   message, type) it renames that field instead, or drops it when the value
//!   is empty

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, warn};

use super::base::{BaseArgs, ServiceBase, ServiceRuntime};
use super::details::{FieldKind, ServiceDetails, TemplateArg, TemplateToken};
use super::provider::{NotificationMessage, NotificationProvider, ProviderArgs, ProviderFactory};
use crate::config::Asset;
use crate::error::{NotifyError, NotifyResult};
use crate::external::build_client;
use crate::url::{ParseOptions, parse, quote, unquote, urlencode};
use crate::utils::{escape_xml, http_response_code_lookup};

/// Accepted `method=` values
const METHODS: &[&str] = &["POST", "GET", "DELETE", "PUT", "HEAD", "PATCH"];

const TEMPLATES: &[&str] = &[
    "{schema}://{host}",
    "{schema}://{host}:{port}",
    "{schema}://{user}@{host}",
    "{schema}://{user}@{host}:{port}",
    "{schema}://{user}:{password}@{host}",
    "{schema}://{user}:{password}@{host}:{port}",
];

const TOKENS: &[TemplateToken] = &[
    TemplateToken::new("host", "Hostname", FieldKind::String).required(),
    TemplateToken::new("port", "Port", FieldKind::Int { min: 1, max: 65535 }),
    TemplateToken::new("user", "Username", FieldKind::String),
    TemplateToken::new("password", "Password", FieldKind::String).private(),
];

const ARGS: &[TemplateArg] = &[TemplateArg::new("method", "Fetch Method", FieldKind::Choice(METHODS)).default("POST")];

const fn http_details(
    service_name: &'static str,
    protocols: &'static [&'static str],
    secure_protocols: &'static [&'static str],
) -> ServiceDetails {
    ServiceDetails {
        protocols,
        secure_protocols,
        request_rate_per_sec: 0.0,
        templates: TEMPLATES,
        tokens: TOKENS,
        args: ARGS,
        ..ServiceDetails::new(service_name)
    }
}

/// How a custom HTTP handler encodes its payload
pub trait PayloadFormat: Send + Sync + fmt::Debug + 'static {
    const DETAILS: &'static ServiceDetails;
    const CONTENT_TYPE: &'static str;
    /// Value of the version field
    const VERSION: &'static str;
    /// Names of the version, title, message and type fields
    const FIELDS: [&'static str; 4];

    /// Renders the payload from ordered `(name, value)` pairs
    fn render(fields: &[(String, String)]) -> String;

    /// Cleans up the name of a `:key` override; `None` drops it
    fn payload_key(key: &str) -> Option<String> {
        Some(key.to_string())
    }

    /// Whether `method` carries the payload in the query string
    fn payload_in_query(_method: &Method) -> bool {
        false
    }
}

/// `application/json` payload
#[derive(Debug, Clone, Copy)]
pub struct Json;

impl PayloadFormat for Json {
    const DETAILS: &'static ServiceDetails = &http_details("JSON", &["json"], &["jsons"]);
    const CONTENT_TYPE: &'static str = "application/json";
    const VERSION: &'static str = "1.0";
    const FIELDS: [&'static str; 4] = ["version", "title", "message", "type"];

    fn render(fields: &[(String, String)]) -> String {
        let object: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}

/// `application/x-www-form-urlencoded` payload
#[derive(Debug, Clone, Copy)]
pub struct Form;

impl PayloadFormat for Form {
    const DETAILS: &'static ServiceDetails = &http_details("Form", &["form"], &["forms"]);
    const CONTENT_TYPE: &'static str = "application/x-www-form-urlencoded";
    const VERSION: &'static str = "1.0";
    const FIELDS: [&'static str; 4] = ["version", "title", "message", "type"];

    fn render(fields: &[(String, String)]) -> String {
        urlencode(fields.iter().map(|(key, value)| (key, Some(value))))
    }

    fn payload_in_query(method: &Method) -> bool {
        method == Method::GET
    }
}

/// Characters that cannot appear in an XML element name
static XML_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("Invalid XML key regex"));

/// SOAP envelope payload
#[derive(Debug, Clone, Copy)]
pub struct Xml;

impl PayloadFormat for Xml {
    const DETAILS: &'static ServiceDetails = &http_details("XML", &["xml"], &["xmls"]);
    const CONTENT_TYPE: &'static str = "application/xml";
    const VERSION: &'static str = "1.1";
    const FIELDS: [&'static str; 4] = ["Version", "Subject", "Message", "MessageType"];

    fn render(fields: &[(String, String)]) -> String {
        let core: String = fields
            .iter()
            .map(|(key, value)| format!("<{key}>{}</{key}>", escape_xml(value)))
            .collect();

        format!(
            "<?xml version='1.0' encoding='utf-8'?>\n\
             <soapenv:Envelope\n    \
             xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\"\n    \
             xmlns:xsd=\"http://www.w3.org/2001/XMLSchema\"\n    \
             xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">\n    \
             <soapenv:Body>\n        \
             <Notification>\n            \
             {core}\n        \
             </Notification>\n    \
             </soapenv:Body>\n\
             </soapenv:Envelope>"
        )
    }

    fn payload_key(key: &str) -> Option<String> {
        let cleaned = XML_KEY_RE.replace_all(key, "");
        if cleaned.is_empty() {
            warn!("Ignoring invalid XML Stanza element name({})", key);
            return None;
        }
        Some(cleaned.into_owned())
    }
}

pub type JsonProvider = CustomHttpProvider<Json>;
pub type FormProvider = CustomHttpProvider<Form>;
pub type XmlProvider = CustomHttpProvider<Xml>;

/// Constructor arguments of a custom HTTP handler
#[derive(Debug, Clone, Default)]
pub struct CustomHttpArgs {
    pub base: BaseArgs,
    pub method: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub payload: BTreeMap<String, String>,
}

impl ProviderArgs for CustomHttpArgs {
    fn base_mut(&mut self) -> &mut BaseArgs {
        &mut self.base
    }
}

/// Posts every notification to an arbitrary HTTP endpoint
#[derive(Debug)]
pub struct CustomHttpProvider<F: PayloadFormat> {
    base: ServiceBase,
    runtime: ServiceRuntime,
    method: Method,
    headers: BTreeMap<String, String>,
    header_map: HeaderMap,
    params: BTreeMap<String, String>,
    payload: BTreeMap<String, String>,
    client: reqwest::Client,
    format: PhantomData<F>,
}

impl<F: PayloadFormat> CustomHttpProvider<F> {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn payload(&self) -> &BTreeMap<String, String> {
        &self.payload
    }

    fn default_port(&self) -> u16 {
        if self.base.secure { 443 } else { 80 }
    }

    /// Payload fields in order: the built-ins, then the extras
    fn payload_fields(&self, message: &NotificationMessage) -> Vec<(String, String)> {
        let values = [
            F::VERSION.to_string(),
            message.title_or_empty().to_string(),
            message.body.clone(),
            message.notify_type.to_string(),
        ];

        let mut fields = Vec::new();
        for (key, value) in F::FIELDS.into_iter().zip(values) {
            match self.payload.get(key) {
                Some(target) if target.is_empty() => {}
                Some(target) => fields.push((target.clone(), value)),
                None => fields.push((key.to_string(), value)),
            }
        }

        fields.extend(
            self.payload
                .iter()
                .filter(|(key, _)| !F::FIELDS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone())),
        );

        fields
    }
}

fn parse_method(method: Option<&str>) -> NotifyResult<Method> {
    let Some(method) = method else {
        return Ok(Method::POST);
    };

    let upper = method.trim().to_uppercase();
    if !METHODS.contains(&upper.as_str()) {
        warn!("The method specified ({}) is invalid.", method);
        return Err(NotifyError::validation(
            "method",
            format!("The method specified ({}) is invalid", method),
        ));
    }

    Method::from_bytes(upper.as_bytes()).map_err(|_| NotifyError::validation("method", format!("Invalid HTTP method: {}", method)))
}

fn build_header_map(headers: &BTreeMap<String, String>) -> NotifyResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| NotifyError::validation("headers", format!("Invalid HTTP header name: {}", key)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| NotifyError::validation("headers", format!("Invalid value for HTTP header {}", key)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[async_trait]
impl<F: PayloadFormat> NotificationProvider for CustomHttpProvider<F> {
    fn details(&self) -> &'static ServiceDetails {
        F::DETAILS
    }

    fn base(&self) -> &ServiceBase {
        &self.base
    }

    fn runtime(&self) -> &ServiceRuntime {
        &self.runtime
    }

    fn url(&self, privacy: bool) -> String {
        let mut params = BTreeMap::new();
        params.insert("method".to_string(), self.method.to_string());
        params.extend(self.base.url_parameters());
        params.extend(self.headers.iter().map(|(k, v)| (format!("+{k}"), v.clone())));
        params.extend(self.params.iter().map(|(k, v)| (format!("-{k}"), v.clone())));
        params.extend(self.payload.iter().map(|(k, v)| (format!(":{k}"), v.clone())));

        let fullpath = if self.base.fullpath.is_empty() {
            "/".to_string()
        } else {
            quote(&self.base.fullpath, "/")
        };

        format!(
            "{}://{}{}{}{}?{}",
            F::DETAILS.protocol(self.base.secure),
            self.base.auth_prefix(privacy),
            self.base.host.as_deref().unwrap_or_default(),
            self.base.port_suffix(Some(self.default_port())),
            fullpath,
            urlencode(params.iter().map(|(k, v)| (k, Some(v))))
        )
    }

    async fn send(&self, message: &NotificationMessage) -> bool {
        let name = F::DETAILS.service_name;
        let fields = self.payload_fields(message);
        let payload = F::render(&fields);

        let mut query: Vec<(&str, &str)> = self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        let in_query = F::payload_in_query(&self.method);
        if in_query {
            query.extend(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        let mut url = self.base.request_url();
        if !query.is_empty() {
            url.push('?');
            url.push_str(&urlencode(query.into_iter().map(|(k, v)| (k, Some(v)))));
        }

        debug!("{} {} URL: {} (cert_verify={})", name, self.method, url, self.base.verify_certificate);
        debug!("{} Payload: {}", name, payload);

        let mut request = self
            .client
            .request(self.method.clone(), &url)
            .header(CONTENT_TYPE, F::CONTENT_TYPE)
            .headers(self.header_map.clone());

        if !in_query {
            request = request.body(payload);
        }

        if let Some((user, password)) = self.base.request_auth() {
            request = request.basic_auth(user, password);
        }

        self.throttle(None, None).await;

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    let status_str = http_response_code_lookup(status.as_u16(), None);
                    warn!(
                        "Failed to send {} {} notification: {}{}error={}.",
                        name,
                        self.method,
                        status_str,
                        if status_str.is_empty() { "" } else { ", " },
                        status.as_u16()
                    );
                    debug!("Response Details:\r\n{}", response.text().await.unwrap_or_default());
                    return false;
                }

                info!("Sent {} {} notification.", name, self.method);
                true
            }
            Err(e) => {
                warn!(
                    "A Connection error occurred sending {} notification to {}.",
                    name,
                    self.base.host.as_deref().unwrap_or_default()
                );
                debug!("Socket Exception: {}", e);
                false
            }
        }
    }

    fn url_identifier(&self) -> Option<Vec<Option<String>>> {
        Some(
            self.base
                .identifier(F::DETAILS.protocol(self.base.secure), Some(self.default_port())),
        )
    }
}

impl<F: PayloadFormat> ProviderFactory for CustomHttpProvider<F> {
    const DETAILS: &'static ServiceDetails = F::DETAILS;

    type Args = CustomHttpArgs;

    fn parse_url(url: &str) -> Option<Self::Args> {
        let results = parse(url, &ParseOptions::default())?;
        if !F::DETAILS.schemas().any(|schema| schema == results.schema) {
            return None;
        }

        let unquoted = |map: &BTreeMap<String, String>| -> BTreeMap<String, String> {
            map.iter().map(|(k, v)| (k.clone(), unquote(v))).collect()
        };

        Some(CustomHttpArgs {
            base: BaseArgs::from_parsed(&results),
            method: results.args.get("method").filter(|m| !m.is_empty()),
            headers: unquoted(&results.args.qsd_plus),
            params: unquoted(&results.args.qsd_minus),
            payload: unquoted(&results.args.qsd_colon),
        })
    }

    fn from_args(args: Self::Args, asset: Arc<Asset>) -> NotifyResult<Self> {
        if args.base.host.as_deref().is_none_or(str::is_empty) {
            return Err(NotifyError::validation("host", "A hostname is required"));
        }

        let method = parse_method(args.method.as_deref())?;
        let header_map = build_header_map(&args.headers)?;
        let payload = args
            .payload
            .into_iter()
            .filter_map(|(key, value)| F::payload_key(&key).map(|key| (key, value)))
            .collect();

        let base = ServiceBase::new(args.base)?;
        let (connect_timeout, read_timeout) = base.request_timeout();
        let client = build_client(&asset.app_id, base.verify_certificate, connect_timeout, read_timeout)?;

        Ok(Self {
            runtime: ServiceRuntime::new(F::DETAILS, asset),
            base,
            method,
            headers: args.headers,
            header_map,
            params: args.params,
            payload,
            client,
            format: PhantomData,
        })
    }
}
