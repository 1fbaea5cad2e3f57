use flyq_client::CacheMode;
use flyq_multi::{merge, BrokerConfig, CacheConfig, Overlay, TlsConfig};

fn populated_shared() -> BrokerConfig {
    BrokerConfig {
        host: Some("b1".into()),
        port: Some(5672),
        addresses: Some("b1:5672,b1-replica:5672".into()),
        username: Some("app".into()),
        password: Some("secret".into()),
        virtual_host: Some("/prod".into()),
        heartbeat_secs: Some(60),
        connection_timeout_ms: Some(3_000),
        publisher_confirms: Some(true),
        publisher_returns: Some(false),
        tls: TlsConfig {
            enabled: true,
            algorithm: Some("TLSv1.2".into()),
            key_store: Some("/shared/ks".into()),
            key_store_password: Some("ks-pass".into()),
            trust_store: Some("/shared/ts".into()),
            trust_store_password: Some("ts-pass".into()),
        },
        cache: CacheConfig {
            channel_size: Some(10),
            channel_checkout_timeout_ms: Some(500),
            connection_mode: Some(CacheMode::Channel),
            connection_size: Some(2),
        },
    }
}

/// One fragment per field, each setting exactly that field to a non-default value.
fn single_field_fragments() -> Vec<(&'static str, BrokerConfig)> {
    let base = BrokerConfig::default;
    vec![
        ("host", BrokerConfig { host: Some("b2".into()), ..base() }),
        ("port", BrokerConfig { port: Some(5673), ..base() }),
        ("addresses", BrokerConfig { addresses: Some("x:1".into()), ..base() }),
        ("username", BrokerConfig { username: Some("other".into()), ..base() }),
        ("password", BrokerConfig { password: Some("p2".into()), ..base() }),
        ("virtual_host", BrokerConfig { virtual_host: Some("/dev".into()), ..base() }),
        ("heartbeat_secs", BrokerConfig { heartbeat_secs: Some(5), ..base() }),
        ("connection_timeout_ms", BrokerConfig { connection_timeout_ms: Some(1), ..base() }),
        ("publisher_confirms", BrokerConfig { publisher_confirms: Some(false), ..base() }),
        ("publisher_returns", BrokerConfig { publisher_returns: Some(true), ..base() }),
        (
            "tls.algorithm",
            BrokerConfig {
                tls: TlsConfig { algorithm: Some("TLSv1.3".into()), ..Default::default() },
                ..base()
            },
        ),
        (
            "tls.trust_store",
            BrokerConfig {
                tls: TlsConfig { trust_store: Some("/other/ts".into()), ..Default::default() },
                ..base()
            },
        ),
        (
            "cache.connection_mode",
            BrokerConfig {
                cache: CacheConfig {
                    connection_mode: Some(CacheMode::Connection),
                    ..Default::default()
                },
                ..base()
            },
        ),
        (
            "cache.channel_size",
            BrokerConfig {
                cache: CacheConfig { channel_size: Some(1), ..Default::default() },
                ..base()
            },
        ),
    ]
}

#[test]
fn default_fragment_is_identity() {
    for shared in [BrokerConfig::default(), populated_shared()] {
        assert_eq!(merge(&shared, &BrokerConfig::default()), shared);
    }
}

#[test]
fn each_field_overrides_in_isolation() {
    let shared = populated_shared();

    for (name, fragment) in single_field_fragments() {
        assert_eq!(fragment.explicit_fields(), vec![name]);

        let merged = merge(&shared, &fragment);

        // rebuild the expectation by hand: shared with that single field swapped in
        let mut expected = shared.clone();
        match name {
            "host" => expected.host = fragment.host.clone(),
            "port" => expected.port = fragment.port,
            "addresses" => expected.addresses = fragment.addresses.clone(),
            "username" => expected.username = fragment.username.clone(),
            "password" => expected.password = fragment.password.clone(),
            "virtual_host" => expected.virtual_host = fragment.virtual_host.clone(),
            "heartbeat_secs" => expected.heartbeat_secs = fragment.heartbeat_secs,
            "connection_timeout_ms" => {
                expected.connection_timeout_ms = fragment.connection_timeout_ms
            }
            "publisher_confirms" => expected.publisher_confirms = fragment.publisher_confirms,
            "publisher_returns" => expected.publisher_returns = fragment.publisher_returns,
            "tls.algorithm" => expected.tls.algorithm = fragment.tls.algorithm.clone(),
            "tls.trust_store" => expected.tls.trust_store = fragment.tls.trust_store.clone(),
            "cache.connection_mode" => {
                expected.cache.connection_mode = fragment.cache.connection_mode
            }
            "cache.channel_size" => expected.cache.channel_size = fragment.cache.channel_size,
            other => unreachable!("no expectation for {other}"),
        }
        assert_eq!(merged, expected, "override of {name} leaked into siblings");
    }
}

#[test]
fn override_of_host_keeps_port_and_heartbeat() {
    let shared = BrokerConfig {
        host: Some("b1".into()),
        port: Some(5672),
        heartbeat_secs: Some(60),
        ..Default::default()
    };
    let fragment = BrokerConfig {
        host: Some("b2".into()),
        ..Default::default()
    };

    let merged = merge(&shared, &fragment);

    assert_eq!(
        merged,
        BrokerConfig {
            host: Some("b2".into()),
            port: Some(5672),
            heartbeat_secs: Some(60),
            ..Default::default()
        }
    );
}

#[test]
fn tls_override_enables_tls_on_plain_shared() {
    let shared = BrokerConfig {
        host: Some("b1".into()),
        ..Default::default()
    };
    let fragment = BrokerConfig {
        tls: TlsConfig {
            enabled: true,
            key_store: Some("/ks".into()),
            ..Default::default()
        },
        ..Default::default()
    };

    let merged = merge(&shared, &fragment);

    assert!(merged.tls.enabled);
    assert_eq!(merged.tls.key_store.as_deref(), Some(std::path::Path::new("/ks")));
    assert_eq!(merged.host.as_deref(), Some("b1"));
    assert!(!shared.tls.enabled, "shared config is untouched");
}

#[test]
fn later_overlay_wins_over_earlier() {
    let shared = populated_shared();
    let a = BrokerConfig {
        port: Some(1),
        ..Default::default()
    };
    let b = BrokerConfig {
        port: Some(2),
        ..Default::default()
    };

    assert_eq!(shared.overlay(&a).overlay(&b).port, Some(2));
}
