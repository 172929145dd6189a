use std::fmt;

/// A zone name without the trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneName(String);

impl ZoneName {
    /// Strips one trailing dot, if present. No further validation is done.
    pub fn new(raw: &str) -> Self {
        Self(raw.strip_suffix('.').unwrap_or(raw).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Expands `hostname` to a fully qualified name with a trailing dot.
    /// Both `""` and `"@"` denote the apex.
    pub fn fqdn(&self, hostname: &str) -> String {
        format!("{}.", self.join(hostname))
    }

    /// Same as [`ZoneName::fqdn`] without the trailing dot.
    pub fn join(&self, hostname: &str) -> String {
        match hostname {
            "" | "@" => self.0.clone(),
            _ => format!("{}.{}", hostname, self.0),
        }
    }

    /// Maps a fully qualified name to the form the provider stores: `@` for
    /// the apex, the leading labels for names inside the zone, and the bare
    /// name otherwise.
    pub fn relative(&self, fqdn: &str) -> String {
        let name = fqdn.strip_suffix('.').unwrap_or(fqdn);
        if name == self.0 {
            return "@".to_string();
        }
        match name.strip_suffix(&self.0) {
            Some(host) if host.ends_with('.') => host.trim_end_matches('.').to_string(),
            _ => name.to_string(),
        }
    }
}

impl fmt::Display for ZoneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
