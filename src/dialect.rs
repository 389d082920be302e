//! Server generation dialects.
//!
//! The supported server generations share one management protocol and one
//! launch procedure, but differ in defaults and in a few launch details.
//! [`ServerDialect`] captures those differences as data so the rest of the
//! library can stay generation-agnostic.

/// Supported server generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Generation {
    As7,
    WildFly8,
}

/// Describes one application server generation.
///
/// A dialect supplies the defaults for a server entry (version, management
/// port, install path, distribution coordinate) and the generation-specific
/// launch arguments.
///
/// # Example
///
/// ```
/// use jboss_runner::dialect::ServerDialect;
///
/// let dialect = ServerDialect::wildfly8();
/// assert_eq!(dialect.default_port(), 9990);
/// assert_eq!(
///     dialect.distribution("8.1.0.Final"),
///     "org.wildfly:wildfly-dist:zip:8.1.0.Final"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDialect {
    generation: Generation,
}

impl ServerDialect {
    /// Creates the JBoss AS7 dialect.
    pub fn as7() -> Self {
        Self {
            generation: Generation::As7,
        }
    }

    /// Creates the WildFly 8 dialect.
    pub fn wildfly8() -> Self {
        Self {
            generation: Generation::WildFly8,
        }
    }

    /// Looks a dialect up by its short name.
    ///
    /// Accepts `"as7"` for JBoss AS7 and `"wf8"` or `"wildfly8"` for
    /// WildFly 8. Returns `None` for anything else.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "as7" => Some(Self::as7()),
            "wf8" | "wildfly8" => Some(Self::wildfly8()),
            _ => None,
        }
    }

    /// Short name of the dialect, usable as a configuration key.
    pub fn name(&self) -> &'static str {
        match self.generation {
            Generation::As7 => "as7",
            Generation::WildFly8 => "wf8",
        }
    }

    /// Human readable description of the server generation.
    pub fn description(&self) -> &'static str {
        match self.generation {
            Generation::As7 => "JBoss AS7",
            Generation::WildFly8 => "WildFly 8",
        }
    }

    /// Version installed when the configuration names none.
    pub fn default_version(&self) -> &'static str {
        match self.generation {
            Generation::As7 => "7.1.1.Final",
            Generation::WildFly8 => "8.1.0.Final",
        }
    }

    /// Management port used when the configuration names none.
    ///
    /// AS7 exposes its native management protocol on 9999, WildFly 8 its
    /// HTTP management interface on 9990.
    pub fn default_port(&self) -> u16 {
        match self.generation {
            Generation::As7 => 9999,
            Generation::WildFly8 => 9990,
        }
    }

    /// Install location used when the configuration names none.
    pub fn default_path(&self) -> &'static str {
        match self.generation {
            Generation::As7 => "target/jboss-as-dist",
            Generation::WildFly8 => "target/wildfly-dist",
        }
    }

    /// Distribution coordinate for the given version.
    pub fn distribution(&self, version: &str) -> String {
        match self.generation {
            Generation::As7 => format!("org.jboss.as:jboss-as-dist:zip:{}", version),
            Generation::WildFly8 => format!("org.wildfly:wildfly-dist:zip:{}", version),
        }
    }

    /// Marker the server logs when it has shut down.
    ///
    /// Both generations log the `JBAS015950` stopped message on the console.
    pub fn shutdown_sentinel(&self) -> Option<&'static str> {
        match self.generation {
            Generation::As7 | Generation::WildFly8 => Some("JBAS015950"),
        }
    }

    /// Extra launch arguments appended after the common command line.
    pub fn extra_launch_args(&self, management_port: u16) -> Vec<String> {
        match self.generation {
            Generation::As7 => Vec::new(),
            Generation::WildFly8 => {
                if management_port == 0 {
                    Vec::new()
                } else {
                    vec![format!("-Djboss.management.http.port={}", management_port)]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(ServerDialect::by_name("as7"), Some(ServerDialect::as7()));
        assert_eq!(ServerDialect::by_name("wf8"), Some(ServerDialect::wildfly8()));
        assert_eq!(
            ServerDialect::by_name("wildfly8"),
            Some(ServerDialect::wildfly8())
        );
        assert_eq!(ServerDialect::by_name("glassfish"), None);
    }

    #[test]
    fn test_defaults() {
        let as7 = ServerDialect::as7();
        assert_eq!(as7.default_port(), 9999);
        assert_eq!(as7.default_path(), "target/jboss-as-dist");
        assert_eq!(
            as7.distribution(as7.default_version()),
            "org.jboss.as:jboss-as-dist:zip:7.1.1.Final"
        );

        let wf8 = ServerDialect::wildfly8();
        assert_eq!(wf8.default_port(), 9990);
        assert_eq!(wf8.default_path(), "target/wildfly-dist");
        assert_eq!(
            wf8.distribution("8.1.0.Final"),
            "org.wildfly:wildfly-dist:zip:8.1.0.Final"
        );
    }

    #[test]
    fn test_extra_launch_args() {
        assert!(ServerDialect::as7().extra_launch_args(9999).is_empty());
        assert_eq!(
            ServerDialect::wildfly8().extra_launch_args(10090),
            vec!["-Djboss.management.http.port=10090".to_string()]
        );
        assert!(ServerDialect::wildfly8().extra_launch_args(0).is_empty());
    }
}
