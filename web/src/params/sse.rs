use serde::Deserialize;

/// Query parameters accepted when opening an event stream.
///
/// Browser `EventSource` cannot set request headers, so the bearer token may be
/// passed as `?token=` instead of in `Authorization`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct StreamParams {
    pub(crate) token: Option<String>,
}
