//! Define our own macros to simplify the code
//!

/// Call the HTTP client with the proper arguments
///
/// - plain unauthenticated GET
///
#[macro_export]
macro_rules! http_get {
    ($self:ident, $url:ident) => {
        $self
            .client
            .clone()
            .get($url)
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("content-type", "application/json")
            .timeout($self.timeout)
            .send()
    };
}

/// Call the HTTP client with the proper arguments for BASIC authentication
///
#[macro_export]
macro_rules! http_get_basic {
    ($self:ident, $url:ident, $user:expr, $pwd:expr) => {
        $self
            .client
            .clone()
            .get($url)
            .basic_auth($user, Some($pwd))
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("content-type", "application/json")
            .timeout($self.timeout)
            .send()
    };
}

/// Call the HTTP client with an API key in a named header
///
#[macro_export]
macro_rules! http_get_key {
    ($self:ident, $url:ident, $($hdr:expr => $val:expr),+) => {
        $self
            .client
            .clone()
            .get($url)
            $(.header($hdr, $val))+
            .header(
                "user-agent",
                format!("{}/{}", crate_name!(), crate_version!()),
            )
            .header("content-type", "application/json")
            .timeout($self.timeout)
            .send()
    };
}
