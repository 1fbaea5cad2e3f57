use crate::config::{BrokerConfig, CacheConfig, TlsConfig};

/// Overlays the explicitly set fields of a fragment onto a base value.
///
/// A field counts as explicitly set when it differs from the same field of
/// `Self::default()`. Consequently a fragment cannot ask for the default value
/// itself; such a field is indistinguishable from an unset one.
pub trait Overlay: Default {
    fn overlay(&self, fragment: &Self) -> Self;

    /// Dotted names of the fields `self` sets, in declaration order.
    fn explicit_fields(&self) -> Vec<&'static str>;
}

fn pick<T: PartialEq + Clone>(fragment: &T, blank: &T, base: &T) -> T {
    if fragment != blank {
        fragment.clone()
    } else {
        base.clone()
    }
}

fn mark<T: PartialEq>(out: &mut Vec<&'static str>, name: &'static str, value: &T, blank: &T) {
    if value != blank {
        out.push(name);
    }
}

// Each impl destructures exhaustively: adding a field without merging it is a compile error.

impl Overlay for BrokerConfig {
    fn overlay(&self, fragment: &Self) -> Self {
        let blank = BrokerConfig::default();
        let BrokerConfig {
            host,
            port,
            addresses,
            username,
            password,
            virtual_host,
            heartbeat_secs,
            connection_timeout_ms,
            publisher_confirms,
            publisher_returns,
            tls,
            cache,
        } = fragment;

        BrokerConfig {
            host: pick(host, &blank.host, &self.host),
            port: pick(port, &blank.port, &self.port),
            addresses: pick(addresses, &blank.addresses, &self.addresses),
            username: pick(username, &blank.username, &self.username),
            password: pick(password, &blank.password, &self.password),
            virtual_host: pick(virtual_host, &blank.virtual_host, &self.virtual_host),
            heartbeat_secs: pick(heartbeat_secs, &blank.heartbeat_secs, &self.heartbeat_secs),
            connection_timeout_ms: pick(
                connection_timeout_ms,
                &blank.connection_timeout_ms,
                &self.connection_timeout_ms,
            ),
            publisher_confirms: pick(
                publisher_confirms,
                &blank.publisher_confirms,
                &self.publisher_confirms,
            ),
            publisher_returns: pick(
                publisher_returns,
                &blank.publisher_returns,
                &self.publisher_returns,
            ),
            tls: self.tls.overlay(tls),
            cache: self.cache.overlay(cache),
        }
    }

    fn explicit_fields(&self) -> Vec<&'static str> {
        let blank = BrokerConfig::default();
        let BrokerConfig {
            host,
            port,
            addresses,
            username,
            password,
            virtual_host,
            heartbeat_secs,
            connection_timeout_ms,
            publisher_confirms,
            publisher_returns,
            tls,
            cache,
        } = self;

        let mut out = Vec::new();
        mark(&mut out, "host", host, &blank.host);
        mark(&mut out, "port", port, &blank.port);
        mark(&mut out, "addresses", addresses, &blank.addresses);
        mark(&mut out, "username", username, &blank.username);
        mark(&mut out, "password", password, &blank.password);
        mark(&mut out, "virtual_host", virtual_host, &blank.virtual_host);
        mark(&mut out, "heartbeat_secs", heartbeat_secs, &blank.heartbeat_secs);
        mark(
            &mut out,
            "connection_timeout_ms",
            connection_timeout_ms,
            &blank.connection_timeout_ms,
        );
        mark(
            &mut out,
            "publisher_confirms",
            publisher_confirms,
            &blank.publisher_confirms,
        );
        mark(
            &mut out,
            "publisher_returns",
            publisher_returns,
            &blank.publisher_returns,
        );
        out.extend(tls.explicit_fields());
        out.extend(cache.explicit_fields());
        out
    }
}

impl Overlay for TlsConfig {
    fn overlay(&self, fragment: &Self) -> Self {
        let blank = TlsConfig::default();
        let TlsConfig {
            enabled,
            algorithm,
            key_store,
            key_store_password,
            trust_store,
            trust_store_password,
        } = fragment;

        TlsConfig {
            enabled: pick(enabled, &blank.enabled, &self.enabled),
            algorithm: pick(algorithm, &blank.algorithm, &self.algorithm),
            key_store: pick(key_store, &blank.key_store, &self.key_store),
            key_store_password: pick(
                key_store_password,
                &blank.key_store_password,
                &self.key_store_password,
            ),
            trust_store: pick(trust_store, &blank.trust_store, &self.trust_store),
            trust_store_password: pick(
                trust_store_password,
                &blank.trust_store_password,
                &self.trust_store_password,
            ),
        }
    }

    fn explicit_fields(&self) -> Vec<&'static str> {
        let blank = TlsConfig::default();
        let TlsConfig {
            enabled,
            algorithm,
            key_store,
            key_store_password,
            trust_store,
            trust_store_password,
        } = self;

        let mut out = Vec::new();
        mark(&mut out, "tls.enabled", enabled, &blank.enabled);
        mark(&mut out, "tls.algorithm", algorithm, &blank.algorithm);
        mark(&mut out, "tls.key_store", key_store, &blank.key_store);
        mark(
            &mut out,
            "tls.key_store_password",
            key_store_password,
            &blank.key_store_password,
        );
        mark(&mut out, "tls.trust_store", trust_store, &blank.trust_store);
        mark(
            &mut out,
            "tls.trust_store_password",
            trust_store_password,
            &blank.trust_store_password,
        );
        out
    }
}

impl Overlay for CacheConfig {
    fn overlay(&self, fragment: &Self) -> Self {
        let blank = CacheConfig::default();
        let CacheConfig {
            channel_size,
            channel_checkout_timeout_ms,
            connection_mode,
            connection_size,
        } = fragment;

        CacheConfig {
            channel_size: pick(channel_size, &blank.channel_size, &self.channel_size),
            channel_checkout_timeout_ms: pick(
                channel_checkout_timeout_ms,
                &blank.channel_checkout_timeout_ms,
                &self.channel_checkout_timeout_ms,
            ),
            connection_mode: pick(connection_mode, &blank.connection_mode, &self.connection_mode),
            connection_size: pick(connection_size, &blank.connection_size, &self.connection_size),
        }
    }

    fn explicit_fields(&self) -> Vec<&'static str> {
        let blank = CacheConfig::default();
        let CacheConfig {
            channel_size,
            channel_checkout_timeout_ms,
            connection_mode,
            connection_size,
        } = self;

        let mut out = Vec::new();
        mark(&mut out, "cache.channel_size", channel_size, &blank.channel_size);
        mark(
            &mut out,
            "cache.channel_checkout_timeout_ms",
            channel_checkout_timeout_ms,
            &blank.channel_checkout_timeout_ms,
        );
        mark(
            &mut out,
            "cache.connection_mode",
            connection_mode,
            &blank.connection_mode,
        );
        mark(&mut out, "cache.connection_size", connection_size, &blank.connection_size);
        out
    }
}

/// Final configuration for one routing key: `shared` overlaid with the fields `fragment` sets.
pub fn merge(shared: &BrokerConfig, fragment: &BrokerConfig) -> BrokerConfig {
    shared.overlay(fragment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyq_client::CacheMode;

    #[test]
    fn only_set_fields_are_reported() {
        let fragment = BrokerConfig {
            host: Some("b2".into()),
            tls: TlsConfig {
                enabled: true,
                ..Default::default()
            },
            cache: CacheConfig {
                connection_mode: Some(CacheMode::Connection),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            fragment.explicit_fields(),
            vec!["host", "tls.enabled", "cache.connection_mode"]
        );
        assert!(BrokerConfig::default().explicit_fields().is_empty());
    }

    #[test]
    fn tls_leaves_merge_independently() {
        let shared = TlsConfig {
            enabled: true,
            algorithm: Some("TLSv1.2".into()),
            key_store: Some("/shared.p12".into()),
            ..Default::default()
        };
        let fragment = TlsConfig {
            algorithm: Some("TLSv1.3".into()),
            ..Default::default()
        };

        let merged = shared.overlay(&fragment);

        assert!(merged.enabled, "enabled comes from the shared side");
        assert_eq!(merged.algorithm.as_deref(), Some("TLSv1.3"));
        assert_eq!(merged.key_store, shared.key_store);
    }

    #[test]
    fn fragment_cannot_reset_to_default() {
        let shared = TlsConfig {
            enabled: true,
            ..Default::default()
        };
        let fragment = TlsConfig {
            enabled: false,
            ..Default::default()
        };

        assert!(shared.overlay(&fragment).enabled);
    }
}
