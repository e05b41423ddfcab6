//! `buri fetch`: fetch a remote text file (or any endpoint) and print the body.

use anyhow::{bail, Context, Result};
use buri_fleet::{HttpClient, HttpRequest, Method, UreqClient};

/// Form/query pairs from `key=value` arguments.
pub fn parse_pairs(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|item| match item.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
            _ => bail!("Expected KEY=VALUE, got '{}'", item),
        })
        .collect()
}

/// Build the request: GET carries the pairs as query parameters, other
/// methods as a form body.
pub fn build_request(url: &str, method: Method, data: &[String]) -> Result<HttpRequest> {
    let mut request = HttpRequest::new(method, url);
    for (key, value) in parse_pairs(data)? {
        request = if method == Method::Get {
            request.query(key, value)
        } else {
            request.form(key, value)
        };
    }
    Ok(request)
}

pub fn cmd_fetch(url: &str, method: Method, data: &[String]) -> Result<()> {
    let request = build_request(url, method, data)?;
    let body = UreqClient::new()
        .send(&request)
        .with_context(|| format!("Failed in fetching remote {}", url))?;
    println!("{}", body);
    Ok(())
}
