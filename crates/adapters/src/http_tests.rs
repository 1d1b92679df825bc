// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    adds_slash     = { "http://vault:8200",      "http://vault:8200/" },
    keeps_slash    = { "http://vault:8200/",     "http://vault:8200/" },
    nested_path    = { "https://ui/api",         "https://ui/api/" },
    trims_spaces   = { "  https://ui/api/  ",    "https://ui/api/" },
)]
fn normalize_base_url_cases(input: &str, expected: &str) {
    assert_eq!(normalize_base_url(input), expected);
}

#[yare::parameterized(
    default_vhost = { "http://rabbit:15672",    "api/queues", &["/", "tb"],     "http://rabbit:15672/api/queues/%2F/tb" },
    plain         = { "http://vault:8200/",     "v1/user_pks", &["42"],         "http://vault:8200/v1/user_pks/42" },
    slash_in_id   = { "http://vault:8200",      "v1/user_pks", &["a/b"],        "http://vault:8200/v1/user_pks/a%2Fb" },
    dotted        = { "http://rabbit:15672",    "api/exchanges", &["ui.tb.event"], "http://rabbit:15672/api/exchanges/ui.tb.event" },
    spaces        = { "http://vault:8200",      "v1", &["a b"],                 "http://vault:8200/v1/a%20b" },
    percent       = { "http://vault:8200",      "v1", &["100%"],                "http://vault:8200/v1/100%25" },
    nested_base   = { "http://rabbit/mgmt/",    "api/queues", &["pht"],         "http://rabbit/mgmt/api/queues/pht" },
    no_segments   = { "http://vault:8200",      "v1/services/tb", &[],          "http://vault:8200/v1/services/tb" },
)]
fn join_path_cases(base: &str, path: &str, segments: &[&str], expected: &str) {
    let base = parse_base_url(base).unwrap();
    assert_eq!(join_path(&base, path, segments).unwrap().as_str(), expected);
}

#[yare::parameterized(
    not_a_url = { "vault:8200 " },
    relative  = { "/v1/secret" },
    mailto    = { "mailto:ops@pht.local" },
)]
fn unusable_base_urls(raw: &str) {
    assert!(parse_base_url(raw).is_err());
}
