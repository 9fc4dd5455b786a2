//! Builds the Easy2 handle for one segment GET.

use crate::config::FetchSettings;

use super::handler::BodyHandler;

/// Configure a plain GET for `url` carrying the `Referer` header, with the
/// connect / low-speed / optional hard timeouts from `settings`.
pub(super) fn build_request(
    url: &str,
    referer: &str,
    settings: &FetchSettings,
) -> Result<curl::easy::Easy2<BodyHandler>, curl::Error> {
    let mut easy = curl::easy::Easy2::new(BodyHandler::new());
    easy.url(url)?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(settings.connect_timeout)?;
    // Abort stalled transfers instead of capping wall-clock time for large segments.
    easy.low_speed_limit(settings.low_speed_limit)?;
    easy.low_speed_time(settings.low_speed_time)?;
    if let Some(t) = settings.request_timeout {
        easy.timeout(t)?;
    }

    let mut list = curl::easy::List::new();
    list.append(&referer_header(referer))?;
    easy.http_headers(list)?;
    Ok(easy)
}

/// The referer is sent exactly as configured.
fn referer_header(referer: &str) -> String {
    format!("Referer: {}", referer)
}
