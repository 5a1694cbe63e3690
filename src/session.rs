// src/session.rs
//! Authenticated browser-like session against the groups web app.
//!
//! The app has no API, so we log in the way a browser does (GET the login page
//! for a cookie, POST the form with it) and then send every request with the
//! same header set a browser's XHR would carry. Without those headers the server
//! rejects the calls as automated.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::config::consts::*;
use crate::credentials::Credential;
use crate::error::{CatsError, Result};

/// Raw answer from the server. Status is not checked here; callers decide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub text: String,
}

impl Response {
    pub fn ok(&self) -> bool {
        self.status == 200
    }
}

/// Anything that can POST to a path under the app's host.
/// `Session` is the real one; tests plug in a scripted server.
pub trait Transport {
    fn post(&mut self, path: &str) -> Result<Response>;
    fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> Result<Response>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    Closed,
}

pub struct Session {
    base: String,
    client: Option<Client>,
    headers: HeaderMap,
    state: SessionState,
}

impl Session {
    /// Log into the default host.
    pub fn open(credential: &Credential) -> Result<Self> {
        Self::open_at(BASE_URL, credential)
    }

    /// Log into `base` (scheme + host, no trailing slash).
    pub fn open_at(base: &str, credential: &Credential) -> Result<Self> {
        let base = base.trim_end_matches('/').to_string();
        let base_url = Url::parse(&base).map_err(|e| CatsError::Config(format!("bad base url {base}: {e}")))?;
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut session = Self {
            base,
            client: None,
            headers: HeaderMap::new(),
            state: SessionState::Unauthenticated,
        };
        let login_url = join!(&session.base, LOGIN_PATH);

        // The login page hands out the first session cookie; the jar keeps it.
        logd!("obtaining session");
        client.get(&login_url).send()?;

        let form = [
            ("netid", credential.netid.as_str()),
            ("password", credential.password.as_str()),
            ("submit", "1"),
        ];
        let resp = client.post(&login_url).form(&form).send()?;
        if resp.status().as_u16() != 200 {
            loge!("couldn't login as user {} (HTTP {})", credential.netid, resp.status().as_u16());
            return Err(CatsError::Authentication { netid: credential.netid.clone() });
        }
        logd!("logged in as {}", credential.netid);

        let token = jar
            .cookies(&base_url)
            .and_then(|v| v.to_str().ok().and_then(|s| cookie_value(s, SESSION_COOKIE)))
            .ok_or_else(|| CatsError::MissingCookie { name: s!(SESSION_COOKIE) })?;

        session.headers = browser_headers(&session.base, &token)?;
        session.client = Some(client);
        session.state = SessionState::Authenticated;
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Release the connection pool. Safe to call more than once.
    pub fn close(&mut self) {
        if self.client.take().is_some() {
            logd!("session closed");
        }
        self.state = SessionState::Closed;
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(CatsError::SessionClosed)
    }

    fn url(&self, path: &str) -> String {
        join!(&self.base, path)
    }
}

impl Transport for Session {
    fn post(&mut self, path: &str) -> Result<Response> {
        let resp = self.client()?
            .post(self.url(path))
            .headers(self.headers.clone())
            .send()?;
        let status = resp.status().as_u16();
        Ok(Response { status, text: resp.text()? })
    }

    fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> Result<Response> {
        let resp = self.client()?
            .post(self.url(path))
            .form(form)
            .headers(self.headers.clone())
            .send()?;
        let status = resp.status().as_u16();
        Ok(Response { status, text: resp.text()? })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

/// Pull `name`'s value out of a `Cookie:`-style `a=1; b=2` string.
fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|kv| kv.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| s!(v))
}

/// The fixed header set sent on every call after login.
/// Accept-Encoding is left to reqwest so it can decode what it asked for.
fn browser_headers(base: &str, token: &str) -> Result<HeaderMap> {
    let mut h = HeaderMap::new();
    h.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    h.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    h.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded; charset=UTF-8"),
    );
    h.insert(header::COOKIE, HeaderValue::from_str(&format!("{SESSION_COOKIE}={token}"))?);
    h.insert(header::ORIGIN, HeaderValue::from_str(base)?);
    h.insert(header::REFERER, HeaderValue::from_str(&join!(base, "/dashboard/"))?);
    h.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    h.insert(HeaderName::from_static("sec-fetch-dest"), HeaderValue::from_static("empty"));
    h.insert(HeaderName::from_static("sec-fetch-mode"), HeaderValue::from_static("cors"));
    h.insert(HeaderName::from_static("sec-fetch-site"), HeaderValue::from_static("same-origin"));
    h.insert(HeaderName::from_static("x-requested-with"), HeaderValue::from_static("XMLHttpRequest"));
    h.insert(HeaderName::from_static("sec-ch-ua"), HeaderValue::from_static(SEC_CH_UA));
    h.insert(HeaderName::from_static("sec-ch-ua-mobile"), HeaderValue::from_static("?0"));
    h.insert(HeaderName::from_static("sec-ch-ua-platform"), HeaderValue::from_static("\"Windows\""));
    Ok(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_session_token() {
        let jar = "PHPSESSID=zzz; catsgroups=abc123; theme=dark";
        assert_eq!(cookie_value(jar, "catsgroups").as_deref(), Some("abc123"));
        assert_eq!(cookie_value(jar, "missing"), None);
    }

    #[test]
    fn browser_headers_carry_token_and_xhr_marker() {
        let h = browser_headers(BASE_URL, "abc123").unwrap();
        assert_eq!(h.get(header::COOKIE).unwrap(), "catsgroups=abc123");
        assert_eq!(h.get("x-requested-with").unwrap(), "XMLHttpRequest");
        assert_eq!(h.get(header::USER_AGENT).unwrap(), USER_AGENT);
        assert_eq!(h.get(header::REFERER).unwrap(), "https://groups.richmond.edu/dashboard/");
        assert!(h.get(header::CONTENT_TYPE).is_some());
    }

    #[test]
    fn bad_token_is_rejected() {
        assert!(browser_headers(BASE_URL, "bad\ntoken").is_err());
    }

    mod live {
        use std::io::{Read, Write};
        use std::net::{TcpListener, TcpStream};
        use std::sync::{Arc, Mutex};
        use std::thread;

        use super::super::*;

        const OK_WITH_COOKIE: &str = "HTTP/1.1 200 OK\r\nSet-Cookie: catsgroups=tok42; Path=/\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
        const OK_PLAIN: &str = "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
        const OK_BODY: &str = "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nrows!";
        const DENIED: &str = "HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

        /// Answers one connection per scripted reply and records each raw request.
        fn stub_server(replies: Vec<&'static str>) -> (String, Arc<Mutex<Vec<String>>>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}", listener.local_addr().unwrap());
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            thread::spawn(move || {
                for reply in replies {
                    let Ok((mut stream, _)) = listener.accept() else { return };
                    let req = read_request(&mut stream);
                    sink.lock().unwrap().push(req);
                    let _ = stream.write_all(reply.as_bytes());
                }
            });
            (base, seen)
        }

        fn read_request(stream: &mut TcpStream) -> String {
            let mut buf = Vec::new();
            let mut chunk = [0u8; 2048];
            loop {
                let n = stream.read(&mut chunk).unwrap_or(0);
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(end) = text.find("\r\n\r\n") {
                    let body_len = text[..end]
                        .lines()
                        .filter_map(|l| l.split_once(':'))
                        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if buf.len() >= end + 4 + body_len {
                        break;
                    }
                }
            }
            String::from_utf8_lossy(&buf).into_owned()
        }

        fn jdoe() -> Credential {
            Credential::new("jdoe", "hunter2")
        }

        #[test]
        fn login_then_calls_carry_session_headers() {
            let (base, seen) = stub_server(vec![OK_WITH_COOKIE, OK_PLAIN, OK_BODY, OK_PLAIN]);
            let mut session = Session::open_at(&base, &jdoe()).unwrap();
            assert_eq!(session.state(), SessionState::Authenticated);

            let resp = session.post("/members/101").unwrap();
            assert_eq!(resp, Response { status: 200, text: s!("rows!") });
            assert!(session.post_form(SEARCH_PATH, &[("lname", "Doe")]).unwrap().ok());

            let reqs = seen.lock().unwrap().clone();
            assert_eq!(reqs.len(), 4);
            assert!(reqs[0].starts_with("GET /login "));
            assert!(reqs[1].starts_with("POST /login "));
            assert!(reqs[1].contains("netid=jdoe"));
            assert!(reqs[1].contains("submit=1"));

            let call = reqs[2].to_lowercase();
            assert!(reqs[2].starts_with("POST /members/101 "));
            assert!(call.contains("cookie: catsgroups=tok42"));
            assert!(call.contains("x-requested-with: xmlhttprequest"));

            assert!(reqs[3].starts_with("POST /members/search/ "));
            assert!(reqs[3].to_lowercase().contains("cookie: catsgroups=tok42"));
            assert!(reqs[3].ends_with("lname=Doe"));
        }

        #[test]
        fn non_200_login_is_an_authentication_error() {
            let (base, _) = stub_server(vec![OK_WITH_COOKIE, DENIED]);
            match Session::open_at(&base, &jdoe()) {
                Err(CatsError::Authentication { netid }) => assert_eq!(netid, "jdoe"),
                Err(e) => panic!("expected authentication error, got {e}"),
                Ok(_) => panic!("login should have failed"),
            }
        }

        #[test]
        fn login_without_session_cookie_fails() {
            let (base, _) = stub_server(vec![OK_PLAIN, OK_PLAIN]);
            match Session::open_at(&base, &jdoe()) {
                Err(CatsError::MissingCookie { name }) => assert_eq!(name, SESSION_COOKIE),
                Err(e) => panic!("expected missing cookie, got {e}"),
                Ok(_) => panic!("login should have failed"),
            }
        }

        #[test]
        fn closed_session_refuses_calls() {
            let (base, seen) = stub_server(vec![OK_WITH_COOKIE, OK_PLAIN]);
            let mut session = Session::open_at(&base, &jdoe()).unwrap();
            session.close();
            session.close();
            assert_eq!(session.state(), SessionState::Closed);
            assert!(matches!(session.post("/members/101"), Err(CatsError::SessionClosed)));
            assert!(matches!(session.post_form(SEARCH_PATH, &[]), Err(CatsError::SessionClosed)));
            assert_eq!(seen.lock().unwrap().len(), 2);
        }
    }
}
