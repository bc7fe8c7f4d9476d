//! W3C WebDriver client (chromedriver, geckodriver) over blocking HTTP

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;

use super::{BrowserDriver, Condition, DriverError, Launcher, Locator};

/// Key WebDriver uses for element references in JSON
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Launches Chrome sessions through a running WebDriver server
#[derive(Debug, Clone)]
pub struct WebDriverLauncher {
    endpoint: String,
    browser_args: Vec<String>,
    request_timeout: Duration,
}

impl WebDriverLauncher {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            browser_args: vec![
                "--start-maximized".to_string(),
                "--disable-blink-features=AutomationControlled".to_string(),
            ],
            request_timeout: Duration::from_secs(60),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Launcher for WebDriverLauncher {
    type Driver = WebDriverSession;

    fn launch(&self) -> Result<WebDriverSession, DriverError> {
        WebDriverSession::start(&self.endpoint, &self.browser_args, self.request_timeout)
    }
}

/// One live browser session
pub struct WebDriverSession {
    client: Client,
    endpoint: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    pub fn start(
        endpoint: &str,
        browser_args: &[String],
        request_timeout: Duration,
    ) -> Result<Self, DriverError> {
        let client = Client::builder().timeout(request_timeout).build()?;

        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": browser_args }
                }
            }
        });

        let value = send(client.post(format!("{}/session", endpoint)).json(&capabilities))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Malformed("new session response has no sessionId".into()))?
            .to_string();

        tracing::debug!(%session_id, endpoint, "webdriver session started");

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            session_id,
            closed: false,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}/{}", self.endpoint, self.session_id, path)
    }

    fn post(&self, path: &str, body: Value) -> Result<Value, DriverError> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        tracing::trace!(path, %body, "webdriver POST");
        send(self.client.post(self.url(path)).json(&body))
    }

    fn get(&self, path: &str) -> Result<Value, DriverError> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        tracing::trace!(path, "webdriver GET");
        send(self.client.get(self.url(path)))
    }

    fn find_all(&self, locator: &Locator) -> Result<Vec<String>, DriverError> {
        let value = self.post("elements", locator_body(locator))?;
        element_ids(&value)
    }

    fn find_all_within(&self, element: &str, locator: &Locator) -> Result<Vec<String>, DriverError> {
        let value = self.post(&format!("element/{}/elements", element), locator_body(locator))?;
        element_ids(&value)
    }

    fn find_first(&self, locator: &Locator) -> Result<String, DriverError> {
        self.find_all(locator)?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(locator.to_string()))
    }

    fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.post("execute/sync", json!({ "script": script, "args": args }))
    }

    fn element_flag(&self, element: &str, flag: &str) -> Result<bool, DriverError> {
        let value = self.get(&format!("element/{}/{}", element, flag))?;
        value
            .as_bool()
            .ok_or_else(|| DriverError::Malformed(format!("'{}' is not a boolean", flag)))
    }

    fn element_text(&self, element: &str) -> Result<String, DriverError> {
        text_value(&self.get(&format!("element/{}/text", element))?)
    }
}

impl BrowserDriver for WebDriverSession {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        tracing::debug!(url, "navigate");
        self.post("url", json!({ "url": url }))?;
        Ok(())
    }

    fn find_and_click(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let element = self.find_first(locator)?;
        // Script click goes through overlays that swallow native clicks
        self.execute("arguments[0].click();", vec![element_ref(&element)])?;
        Ok(())
    }

    fn type_text(&mut self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let element = self.find_first(locator)?;
        self.post(&format!("element/{}/value", element), json!({ "text": text }))?;
        Ok(())
    }

    fn clear(&mut self, locator: &Locator) -> Result<(), DriverError> {
        let element = self.find_first(locator)?;
        self.post(&format!("element/{}/clear", element), json!({}))?;
        Ok(())
    }

    fn check(&mut self, condition: &Condition) -> Result<bool, DriverError> {
        match condition {
            Condition::Present(locator) => Ok(!self.find_all(locator)?.is_empty()),
            Condition::AtLeast(locator, n) => Ok(self.find_all(locator)?.len() >= *n),
            Condition::Visible(locator) => match self.find_all(locator)?.first() {
                Some(element) => self.element_flag(element, "displayed"),
                None => Ok(false),
            },
            Condition::Clickable(locator) => match self.find_all(locator)?.first() {
                Some(element) => Ok(self.element_flag(element, "displayed")?
                    && self.element_flag(element, "enabled")?),
                None => Ok(false),
            },
        }
    }

    fn count(&mut self, locator: &Locator) -> Result<usize, DriverError> {
        Ok(self.find_all(locator)?.len())
    }

    fn scroll_by(&mut self, pixels: u32) -> Result<(), DriverError> {
        self.execute("window.scrollBy(0, arguments[0]);", vec![json!(pixels)])?;
        Ok(())
    }

    fn viewport_height(&mut self) -> Result<u32, DriverError> {
        let value = self.execute("return window.innerHeight;", vec![])?;
        value
            .as_u64()
            .and_then(|h| u32::try_from(h).ok())
            .ok_or_else(|| DriverError::Malformed(format!("innerHeight was {}", value)))
    }

    fn read_text(&mut self, locator: &Locator) -> Result<String, DriverError> {
        let element = self.find_first(locator)?;
        self.element_text(&element)
    }

    fn card_texts(
        &mut self,
        card: &Locator,
        index: usize,
        field: &Locator,
    ) -> Result<Vec<String>, DriverError> {
        let cards = self.find_all(card)?;
        let card_element = cards
            .get(index)
            .ok_or_else(|| DriverError::NoSuchElement(format!("{} [{}]", card, index)))?;

        self.find_all_within(card_element, field)?
            .iter()
            .map(|element| self.element_text(element))
            .collect()
    }

    fn close_session(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        let url = format!("{}/session/{}", self.endpoint, self.session_id);
        self.closed = true;
        send(self.client.delete(url))?;
        tracing::debug!(session_id = %self.session_id, "webdriver session closed");
        Ok(())
    }
}

fn locator_body(locator: &Locator) -> Value {
    let (using, value) = match locator {
        Locator::Id(id) => ("css selector", format!("[id=\"{}\"]", id.replace('"', "\\\""))),
        Locator::Css(css) => ("css selector", css.clone()),
        Locator::XPath(xpath) => ("xpath", xpath.clone()),
    };
    json!({ "using": using, "value": value })
}

fn element_ref(element: &str) -> Value {
    json!({ ELEMENT_KEY: element })
}

fn element_ids(value: &Value) -> Result<Vec<String>, DriverError> {
    let items = value
        .as_array()
        .ok_or_else(|| DriverError::Malformed("element list is not an array".into()))?;

    items
        .iter()
        .map(|item| {
            item.get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| DriverError::Malformed("element reference without id".into()))
        })
        .collect()
}

fn text_value(value: &Value) -> Result<String, DriverError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DriverError::Malformed("element text is not a string".into()))
}

/// Send a request and unwrap the `value` member, mapping error bodies
fn send(request: RequestBuilder) -> Result<Value, DriverError> {
    let response = request.send()?;
    let status = response.status();
    let body: Value = response.json()?;
    let value = body.get("value").cloned().unwrap_or(Value::Null);

    if status.is_success() {
        return Ok(value);
    }

    Err(protocol_error(&value, status.as_u16()))
}

fn protocol_error(value: &Value, status: u16) -> DriverError {
    let error = value
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status));

    if error == "no such element" {
        DriverError::NoSuchElement(message)
    } else {
        DriverError::Protocol { error, message }
    }
}
