//! Low-level reachability primitives shared by the protocol checks.
//!
//! Every helper takes the remaining time budget explicitly; the coordinator
//! still wraps the whole probe in a hard deadline.

use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

/// Upper bound on bytes read from a probe reply.
const MAX_REPLY_BYTES: usize = 64 * 1024;

/// Host and port extracted from a candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    host: String,
    port: u16,
}

impl ProbeTarget {
    /// Extracts the first host of `url`, falling back to `default_port`.
    ///
    /// Returns `None` when the URL cannot be parsed or has no host.
    #[must_use]
    pub fn from_url(url: &str, default_port: u16) -> Option<Self> {
        let parsed = Url::parse(url).ok()?;
        let host = parsed
            .host_str()?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_owned();
        if host.is_empty() {
            return None;
        }
        Some(Self {
            host,
            port: parsed.port().unwrap_or(default_port),
        })
    }

    /// Returns the host name or address literal.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the TCP port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

/// Extracts every seed host of a connection string.
///
/// Multi-host strings such as `mongodb://a:27017,b:27018/app` are not valid
/// URLs, so the authority is split by hand: user info up to the last `@` is
/// dropped and each comma-separated seed becomes one target. Bracketed IPv6
/// literals are supported. Seeds that do not parse are skipped.
#[must_use]
pub fn seed_targets(url: &str, default_port: u16) -> Vec<ProbeTarget> {
    let Some((_, rest)) = url.trim().split_once("://") else {
        return Vec::new();
    };
    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    let hosts = authority.rsplit_once('@').map_or(authority, |(_, seeds)| seeds);
    hosts
        .split(',')
        .filter_map(|seed| parse_seed(seed.trim(), default_port))
        .collect()
}

fn parse_seed(seed: &str, default_port: u16) -> Option<ProbeTarget> {
    let (host, port) = seed
        .strip_prefix('[')
        .map_or_else(|| Some(split_host_port(seed)), split_bracketed)?;
    if host.is_empty() {
        return None;
    }
    let port = port.map_or(Ok(default_port), str::parse::<u16>).ok()?;
    Some(ProbeTarget {
        host: host.to_owned(),
        port,
    })
}

fn split_host_port(seed: &str) -> (&str, Option<&str>) {
    seed.rsplit_once(':')
        .map_or((seed, None), |(host, port)| (host, Some(port)))
}

fn split_bracketed(seed: &str) -> Option<(&str, Option<&str>)> {
    let (host, after) = seed.split_once(']')?;
    if after.is_empty() {
        return Some((host, None));
    }
    after.strip_prefix(':').map(|port| (host, Some(port)))
}

fn timed_out(operation: &str) -> io::Error {
    io::Error::new(io::ErrorKind::TimedOut, format!("{operation} timed out"))
}

/// Opens a TCP connection within `budget`.
///
/// # Errors
///
/// Returns the connection error, or [`io::ErrorKind::TimedOut`] when the
/// budget elapses first.
pub async fn connect(target: &ProbeTarget, budget: Duration) -> io::Result<TcpStream> {
    timeout(budget, TcpStream::connect((target.host(), target.port())))
        .await
        .map_err(|_| timed_out("connect"))?
}

/// Writes `request` and reads until `is_complete` accepts the reply, the
/// peer closes the stream, or the reply grows past 64 KiB.
///
/// # Errors
///
/// Returns I/O failures, or [`io::ErrorKind::TimedOut`] when `budget`
/// elapses before the exchange finishes.
pub async fn exchange(
    stream: &mut TcpStream,
    request: &[u8],
    budget: Duration,
    is_complete: impl Fn(&[u8]) -> bool,
) -> io::Result<Vec<u8>> {
    let conversation = async {
        stream.write_all(request).await?;
        stream.flush().await?;

        let mut reply = Vec::new();
        let mut chunk = [0_u8; 1024];
        loop {
            let read = stream.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            reply.extend(chunk.iter().take(read));
            if is_complete(&reply) || reply.len() >= MAX_REPLY_BYTES {
                break;
            }
        }
        Ok(reply)
    };

    timeout(budget, conversation)
        .await
        .map_err(|_| timed_out("exchange"))?
}

/// Connects to `url` and performs one request/reply exchange.
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidInput`] when `url` has no usable host,
/// otherwise the errors of [`connect`] and [`exchange`].
pub async fn request_reply(
    url: &str,
    default_port: u16,
    request: &[u8],
    budget: Duration,
    is_complete: impl Fn(&[u8]) -> bool,
) -> io::Result<Vec<u8>> {
    let target = ProbeTarget::from_url(url, default_port).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "candidate URL has no host")
    })?;
    let mut stream = connect(&target, budget).await?;
    exchange(&mut stream, request, budget, is_complete).await
}

/// Builds the HTTP client shared by an adapter's probes.
///
/// Redirects are not followed: a diagnostic endpoint that redirects is not
/// the service being looked for.
#[must_use]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_default()
}

/// Resolves `path` against the candidate base URL.
///
/// # Errors
///
/// Returns the parse error when `base` or the joined URL is invalid.
pub fn diagnostic_url(base: &str, path: &str) -> Result<Url, url::ParseError> {
    Url::parse(base)?.join(path)
}

/// Issues one `GET` against `path` on `base` and returns the response when
/// the status is a success.
pub async fn http_get_success(
    client: &reqwest::Client,
    base: &str,
    path: &str,
    budget: Duration,
) -> Option<reqwest::Response> {
    let url = diagnostic_url(base, path).ok()?;
    let response = client.get(url).timeout(budget).send().await.ok()?;
    response.status().is_success().then_some(response)
}
