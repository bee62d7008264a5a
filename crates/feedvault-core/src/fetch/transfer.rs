//! One libcurl GET, body handed to a sink chunk by chunk.

use std::collections::HashMap;

use crate::error::FetchError;

use super::CurlOptions;

/// Performs a single GET of `url`, passing each body chunk to `sink`.
/// Returns the number of body bytes delivered. Non-2xx statuses are errors.
pub(super) fn get<F>(
    url: &str,
    headers: &HashMap<String, String>,
    opts: &CurlOptions,
    mut sink: F,
) -> Result<u64, FetchError>
where
    F: FnMut(&[u8]) -> Result<(), FetchError>,
{
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    // Low-speed abort instead of a tight wall-clock limit so large media on slow links survive.
    easy.low_speed_limit(opts.low_speed_limit)?;
    easy.low_speed_time(opts.low_speed_time)?;
    easy.timeout(opts.timeout)?;
    if let Some(ua) = opts.user_agent.as_deref() {
        easy.useragent(ua)?;
    }

    let mut list = curl::easy::List::new();
    for (k, v) in headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))?;
    }
    if !headers.is_empty() {
        easy.http_headers(list)?;
    }

    let mut received = 0u64;
    let mut sink_error: Option<FetchError> = None;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match sink(data) {
            Ok(()) => {
                received += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                sink_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Err(e) = performed {
        if let Some(se) = sink_error.take() {
            return Err(se);
        }
        return Err(FetchError::Curl(e));
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(received)
}
