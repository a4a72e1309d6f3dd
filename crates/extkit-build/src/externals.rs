//! Modules the bundler must leave external
//!
//! The host runtime supplies or stubs each of these at execution time, so
//! inlining them would either duplicate the host's copy or break it.

use std::collections::BTreeSet;

/// The UI framework and its JSX runtime entry points.
pub const FRAMEWORK_MODULES: &[&str] = &[
    "react",
    "react-dom",
    "react/jsx-runtime",
    "react/jsx-dev-runtime",
];

/// Prefix of the host's API compatibility shim family.
pub const SHIM_PREFIX: &str = "@raycast/";

/// Shim packages, listed explicitly as well as by wildcard.
pub const SHIM_MODULES: &[&str] = &["@raycast/api", "@raycast/utils"];

/// Packages backed by native binaries, unusable in a sandboxed context.
pub const NATIVE_MODULES: &[&str] = &[
    "fsevents",
    "sharp",
    "better-sqlite3",
    "node-pty",
    "keytar",
    "canvas",
    "bufferutil",
    "utf-8-validate",
    "cpu-features",
];

/// Cross-extension call package; unsupported and stubbed by the host.
pub const CROSS_EXTENSION_MODULES: &[&str] = &["raycast-cross-extension"];

/// HTTP and archive utilities that must stay interceptable by the host's
/// file-I/O shim. Bundled copies lose access to the real filesystem.
pub const IO_INTERCEPTED_MODULES: &[&str] = &[
    "tar",
    "extract-zip",
    "adm-zip",
    "yauzl",
    "unzipper",
    "decompress",
    "follow-redirects",
];

/// Node built-in modules.
pub const NODE_BUILTINS: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// The complete external set for an extension, including the extension's own
/// declared `externals`. Ordered and deduplicated.
pub fn external_modules(extra: &[String]) -> BTreeSet<String> {
    let mut set: BTreeSet<String> = FRAMEWORK_MODULES
        .iter()
        .chain(SHIM_MODULES)
        .chain(NATIVE_MODULES)
        .chain(CROSS_EXTENSION_MODULES)
        .chain(IO_INTERCEPTED_MODULES)
        .chain(NODE_BUILTINS)
        .map(|m| m.to_string())
        .collect();

    set.insert(format!("{SHIM_PREFIX}*"));
    set.insert("node:*".to_string());
    set.extend(
        extra
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(str::to_string),
    );
    set
}

/// Whether `specifier` would be left external given `extra` declared externals.
pub fn is_external(specifier: &str, extra: &[String]) -> bool {
    if specifier.starts_with(SHIM_PREFIX) || specifier.starts_with("node:") {
        return true;
    }
    external_modules(extra).contains(specifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("react")]
    #[case("react/jsx-runtime")]
    #[case("@raycast/api")]
    #[case("@raycast/anything-new")]
    #[case("sharp")]
    #[case("raycast-cross-extension")]
    #[case("extract-zip")]
    #[case("fs")]
    #[case("node:crypto")]
    fn host_supplied_modules_are_external(#[case] specifier: &str) {
        assert!(is_external(specifier, &[]));
    }

    #[rstest]
    #[case("date-fns")]
    #[case("lodash")]
    #[case("react-markdown")]
    fn ordinary_dependencies_are_bundled(#[case] specifier: &str) {
        assert!(!is_external(specifier, &[]));
    }

    #[test]
    fn declared_externals_are_added() {
        let extra = vec!["  pdfjs-dist ".to_string(), String::new()];
        let set = external_modules(&extra);
        assert!(set.contains("pdfjs-dist"));
        assert!(!set.contains(""));
        assert!(is_external("pdfjs-dist", &extra));
    }
}
