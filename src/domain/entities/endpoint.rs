//! Remote endpoint entity

/// Shell used on the remote side when none is configured
pub const DEFAULT_SHELL: &str = "sh";

/// One configured remote connection target.
///
/// `directory` is a POSIX path relative to the remote user's home and is
/// never interpreted with local path rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub host: String,
    pub directory: String,
    pub shell: String,
    pub shell_options: String,
    pub supports_gssapi: bool,
    pub label: Option<String>,
    pub port: Option<u16>,
}

impl RemoteEndpoint {
    pub fn new(host: impl Into<String>, directory: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            directory: directory.into(),
            shell: DEFAULT_SHELL.to_string(),
            shell_options: String::new(),
            supports_gssapi: true,
            label: None,
            port: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_gssapi(mut self, supports_gssapi: bool) -> Self {
        self.supports_gssapi = supports_gssapi;
        self
    }

    /// `host:directory`, as rsync expects a remote location
    pub fn location(&self) -> String {
        format!("{}:{}", self.host, self.directory)
    }
}
