//! Mock usereg portal for testing
//!
//! A tiny HTTP server that answers the portal endpoints with canned bodies:
//! - POST /do.php answers `login_reply` and sets a session cookie
//! - GET /user_info.php answers `info_page`, GBK-encoded with no declared
//!   charset when `info_gbk` is set
//! - GET /online_user_ipv4.php answers `sessions_page`
//! - POST /online_user_ipv4.php answers `drop_reply`
//! - POST /ip_login.php answers `ip_login_reply`
//!
//! Pages other than the login endpoint require the session cookie, like the
//! real portal. Every request is recorded for assertions.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use url::form_urlencoded;

use crate::config::PortalConfig;

pub const SESSION_COOKIE: &str = "PHPSESSID=mock-session";

/// Page served to requests without the session cookie
const LOGGED_OUT_PAGE: &str = "<html><body>请先登录</body></html>";

/// Mock portal server for testing
pub struct MockPortalServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Canned portal behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub login_reply: String,
    pub info_page: String,
    pub sessions_page: String,
    pub drop_reply: String,
    pub ip_login_reply: String,
    /// Close the connection without answering the login request
    pub drop_login_connection: bool,
    /// Status code for the info page
    pub info_status: u16,
    /// Send the info page as GBK bytes under a bare `text/html`
    pub info_gbk: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            login_reply: "ok".to_string(),
            info_page: info_page(&[
                ("姓名", "Zhang San"),
                ("证件号", "110101199001011234"),
                ("帐户余额", "42.00 元"),
                ("使用流量(IPV4)", "1048576 Bytes"),
                ("使用流量(IPV6)", "0 Bytes"),
            ]),
            sessions_page: sessions_page(&[]),
            drop_reply: "下线请求已发送".to_string(),
            ip_login_reply: "上线请求已发送".to_string(),
            drop_login_connection: false,
            info_status: 200,
            info_gbk: false,
        }
    }
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub cookie: Option<String>,
    pub form: HashMap<String, String>,
}

/// Render label/value rows the way the account page does
pub fn info_page(rows: &[(&str, &str)]) -> String {
    let cells: String = rows
        .iter()
        .map(|(label, value)| {
            format!(
                "<tr>\n  <td class=\"maintd\" width=\"30%\">{}</td>\n  <td class=\"maintd\">{}&nbsp;</td>\n</tr>\n",
                label, value
            )
        })
        .collect();
    format!(
        "<html><head><title>用户信息</title></head><body><table>\n{}</table></body></html>",
        cells
    )
}

/// Render the sessions table: a header row, then one 14-cell row per session
/// of (id, ip, start time, usage, device name)
pub fn sessions_page(rows: &[(&str, &str, &str, &str, &str)]) -> String {
    let td = |text: &str| format!("<td class=\"maintd\">{}</td>", text);

    let mut html = String::from("<html><body><table>\n<tr>");
    for title in [
        "", "IP地址", "上线时间", "流量", "a", "b", "c", "d", "e", "f", "g", "设备名", "h", "i",
    ] {
        html.push_str(&td(title));
    }
    html.push_str("</tr>\n");

    for (id, ip, start, usage, device) in rows {
        html.push_str("<tr>");
        html.push_str(&td(&format!(
            "<input type=\"checkbox\" name=\"ips\" value=\"{}\">",
            id
        )));
        html.push_str(&td(ip));
        html.push_str(&td(start));
        html.push_str(&td(usage));
        for _ in 4..11 {
            html.push_str(&td("-"));
        }
        html.push_str(&td(device));
        html.push_str(&td(""));
        html.push_str(&td(""));
        html.push_str("</tr>\n");
    }

    html.push_str("</table></body></html>");
    html
}

impl MockPortalServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(Mutex::new(Vec::new()));

        // Non-blocking accept so the server can be stopped
        listener.set_nonblocking(true)?;

        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let log = requests_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &log);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Portal config pointing at this server
    pub fn portal_config(&self) -> PortalConfig {
        PortalConfig {
            base_url: self.base_url(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockPortalServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Read one request: headers, then as much body as Content-Length announces
fn read_request(stream: &mut TcpStream) -> Option<(String, Vec<u8>)> {
    let mut data = Vec::new();
    let mut buffer = [0; 4096];

    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while data.len() < header_end + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }

    Some((head, data[header_end..].to_vec()))
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, log: &Mutex<Vec<RecordedRequest>>) {
    // Accepted sockets may inherit non-blocking mode from the listener
    let _ = stream.set_nonblocking(false);

    let Some((head, body)) = read_request(&mut stream) else {
        return;
    };

    let first_line = head.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        send_response(&mut stream, 400, "Bad Request", &[], "");
        return;
    }

    let method = parts[0].to_string();
    let path = parts[1].split('?').next().unwrap_or(parts[1]).to_string();
    let cookie = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("cookie"))
        .map(|(_, value)| value.trim().to_string());
    let form: HashMap<String, String> = form_urlencoded::parse(&body).into_owned().collect();

    if let Ok(mut requests) = log.lock() {
        requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            cookie: cookie.clone(),
            form,
        });
    }

    let logged_in = cookie
        .as_deref()
        .map(|c| c.contains(SESSION_COOKIE))
        .unwrap_or(false);

    match (method.as_str(), path.as_str()) {
        ("POST", "/do.php") => {
            if config.drop_login_connection {
                // Hang up without a response
                return;
            }
            let set_cookie = format!("Set-Cookie: {}; path=/", SESSION_COOKIE);
            send_response(&mut stream, 200, "OK", &[set_cookie.as_str()], &config.login_reply);
        }
        (_, "/user_info.php" | "/online_user_ipv4.php" | "/ip_login.php") if !logged_in => {
            send_response(&mut stream, 200, "OK", &[], LOGGED_OUT_PAGE);
        }
        ("GET", "/user_info.php") => {
            let status_text = if config.info_status == 200 { "OK" } else { "Error" };
            if config.info_gbk {
                let (bytes, _, _) = encoding_rs::GBK.encode(&config.info_page);
                send_bytes(&mut stream, config.info_status, status_text, "text/html", &[], &bytes);
            } else {
                send_response(&mut stream, config.info_status, status_text, &[], &config.info_page);
            }
        }
        ("GET", "/online_user_ipv4.php") => {
            send_response(&mut stream, 200, "OK", &[], &config.sessions_page);
        }
        ("POST", "/online_user_ipv4.php") => {
            send_response(&mut stream, 200, "OK", &[], &config.drop_reply);
        }
        ("POST", "/ip_login.php") => {
            send_response(&mut stream, 200, "OK", &[], &config.ip_login_reply);
        }
        _ => send_response(&mut stream, 404, "Not Found", &[], "Not Found"),
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, headers: &[&str], body: &str) {
    send_bytes(
        stream,
        status,
        status_text,
        "text/html; charset=utf-8",
        headers,
        body.as_bytes(),
    );
}

fn send_bytes(
    stream: &mut TcpStream,
    status: u16,
    status_text: &str,
    content_type: &str,
    headers: &[&str],
    body: &[u8],
) {
    let extra: String = headers.iter().map(|h| format!("{}\r\n", h)).collect();
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n",
        status,
        status_text,
        content_type,
        body.len(),
        extra
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::usereg::UseregClient;
    use crate::domain::{CredentialDigest, LoginOutcome};
    use crate::ports::Portal;

    #[test]
    fn test_login_posts_form_fields() {
        let server = MockPortalServer::start(MockConfig::default()).unwrap();
        let client = UseregClient::new(&server.portal_config()).unwrap();
        let credential = CredentialDigest::from_password("password");

        let outcome = client.login("zhangsan", &credential).unwrap();
        assert_eq!(outcome, LoginOutcome::Accepted);

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        let login = &requests[0];
        assert_eq!(login.method, "POST");
        assert_eq!(login.path, "/do.php");
        assert_eq!(login.form["action"], "login");
        assert_eq!(login.form["user_login_name"], "zhangsan");
        assert_eq!(login.form["user_password"], "5f4dcc3b5aa765d61d8327deb882cf99");
    }

    #[test]
    fn test_session_cookie_is_carried_over() {
        let server = MockPortalServer::start(MockConfig::default()).unwrap();
        let client = UseregClient::new(&server.portal_config()).unwrap();
        let credential = CredentialDigest::from_password("password");

        client.login("zhangsan", &credential).unwrap();
        let page = client.fetch_info_page().unwrap();
        assert!(page.contains("Zhang San"));

        let requests = server.requests();
        assert_eq!(requests[1].path, "/user_info.php");
        assert!(requests[1].cookie.as_deref().unwrap_or("").contains(SESSION_COOKIE));
    }

    #[test]
    fn test_fresh_client_has_no_cookie() {
        let server = MockPortalServer::start(MockConfig::default()).unwrap();
        let client = UseregClient::new(&server.portal_config()).unwrap();

        let page = client.fetch_info_page().unwrap();
        assert_eq!(page, LOGGED_OUT_PAGE);
    }

    #[test]
    fn test_undeclared_charset_is_decoded_as_gb() {
        let page = info_page(&[("姓名", "张三"), ("帐户余额", "12.50 元")]);
        let server = MockPortalServer::start(MockConfig {
            info_page: page.clone(),
            info_gbk: true,
            ..Default::default()
        })
        .unwrap();
        let client = UseregClient::new(&server.portal_config()).unwrap();
        client
            .login("zhangsan", &CredentialDigest::from_password("password"))
            .unwrap();

        assert_eq!(client.fetch_info_page().unwrap(), page);
    }

    #[test]
    fn test_drop_session_form() {
        let server = MockPortalServer::start(MockConfig::default()).unwrap();
        let client = UseregClient::new(&server.portal_config()).unwrap();
        client
            .login("zhangsan", &CredentialDigest::from_password("password"))
            .unwrap();

        let reply = client.drop_session("12345").unwrap();
        assert_eq!(reply, "下线请求已发送");

        let requests = server.requests();
        assert_eq!(requests[1].form["action"], "drops");
        assert_eq!(requests[1].form["user_ip"], "12345,");
    }

    #[test]
    fn test_error_status_is_portal_error() {
        let server = MockPortalServer::start(MockConfig {
            info_status: 500,
            ..Default::default()
        })
        .unwrap();
        let client = UseregClient::new(&server.portal_config()).unwrap();
        client
            .login("zhangsan", &CredentialDigest::from_password("password"))
            .unwrap();

        let err = client.fetch_info_page().unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
    }
}
