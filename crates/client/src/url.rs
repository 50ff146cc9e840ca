//! URL composition for the service's HTTP and WebSocket endpoints.

/// Joins `base` and `path` with exactly one separating slash, whatever
/// combination of trailing/leading slashes the inputs carry.
#[must_use]
pub fn compose(base: &str, path: &str) -> String {
	format!(
		"{}/{}",
		base.trim_end_matches('/'),
		path.trim_start_matches('/')
	)
}

/// Composes a WebSocket URL from an HTTP(S) base, rewriting the scheme to
/// `ws`/`wss` and leaving the authority and path untouched.
#[must_use]
pub fn ws_url(base: &str, path: &str) -> String {
	let url = compose(base, path);

	if let Some(rest) = url.strip_prefix("https://") {
		format!("wss://{rest}")
	} else if let Some(rest) = url.strip_prefix("http://") {
		format!("ws://{rest}")
	} else {
		url
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn compose_normalizes_slashes() {
		let expected = "http://h:8000/ws?token=abc";

		assert_eq!(compose("http://h:8000", "ws?token=abc"), expected);
		assert_eq!(compose("http://h:8000/", "ws?token=abc"), expected);
		assert_eq!(compose("http://h:8000", "/ws?token=abc"), expected);
		assert_eq!(compose("http://h:8000/", "/ws?token=abc"), expected);
	}

	#[test]
	fn ws_url_rewrites_scheme() {
		assert_eq!(ws_url("http://h", "ws?token=abc"), "ws://h/ws?token=abc");
		assert_eq!(ws_url("https://h", "ws?token=abc"), "wss://h/ws?token=abc");
	}

	#[test]
	fn ws_url_leaves_authority_and_path_untouched() {
		assert_eq!(
			ws_url("https://h:8443/api/", "/ws?token=abc"),
			"wss://h:8443/api/ws?token=abc"
		);
	}

	#[test]
	fn ws_url_without_http_scheme_is_passed_through() {
		assert_eq!(ws_url("wss://h", "ws"), "wss://h/ws");
	}
}
