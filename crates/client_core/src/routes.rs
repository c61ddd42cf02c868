use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use shared::domain::RequestId;

/// Characters escaped when an id becomes a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    RequestList,
    RequestDetail(RequestId),
    NewRequest,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::RequestList => "/requests".to_string(),
            Route::RequestDetail(id) => {
                format!("/requests/{}", utf8_percent_encode(id.as_str(), SEGMENT))
            }
            Route::NewRequest => "/request/new".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        match path {
            "/requests" => Some(Route::RequestList),
            "/request/new" => Some(Route::NewRequest),
            _ => path
                .strip_prefix("/requests/")
                .filter(|id| !id.is_empty() && !id.contains('/'))
                .and_then(|id| percent_decode_str(id).decode_utf8().ok())
                .map(|id| Route::RequestDetail(RequestId(id.into_owned()))),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
