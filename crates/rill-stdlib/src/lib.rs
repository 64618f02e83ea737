//! Rill standard library
//!
//! Native implementations of the capability modules preloaded into every
//! engine instance: filesystem, HTTP client, structured-data parsing,
//! pattern matching, text utilities, networking, time, and value
//! inspection. Registration is per instance and has no cross-instance
//! effect.

#![warn(missing_docs)]

pub mod fs;
pub mod globals;
pub mod http;
pub mod inspect;
pub mod json;
pub mod logger;
pub mod path;
pub mod regexp;
pub mod strings;
pub mod tcp;
pub mod time;
pub mod xml;
pub mod yaml;

use rill_engine::NativeFunctionRegistry;

/// Register the full capability-module set into the given registry.
///
/// Called once per engine instance. After this, the registry maps every
/// symbolic name (e.g. "json.encode", "time.sleep", "error") to its
/// handler.
pub fn register_stdlib(registry: &mut NativeFunctionRegistry) {
    globals::register_globals(registry);
    logger::register_logger(registry);
    strings::register_strings(registry);
    regexp::register_regexp(registry);
    json::register_json(registry);
    yaml::register_yaml(registry);
    xml::register_xml(registry);
    fs::register_fs(registry);
    path::register_path(registry);
    time::register_time(registry);
    tcp::register_tcp(registry);
    http::register_http(registry);
    inspect::register_inspect(registry);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_set_is_registered() {
        let mut registry = NativeFunctionRegistry::new();
        register_stdlib(&mut registry);
        for name in [
            "error",
            "len",
            "logger.info",
            "strings.upper",
            "regexp.find",
            "json.encode",
            "yaml.decode",
            "xml.decode",
            "fs.read_file",
            "path.join",
            "time.sleep",
            "tcp.connect",
            "http.get",
            "inspect.inspect",
        ] {
            assert!(registry.contains(name), "missing native '{}'", name);
        }
    }

    #[test]
    fn test_registration_is_repeatable() {
        // Two instances register independently; the second registration
        // must not interfere with the first.
        let mut a = NativeFunctionRegistry::new();
        let mut b = NativeFunctionRegistry::new();
        register_stdlib(&mut a);
        register_stdlib(&mut b);
        assert_eq!(a.len(), b.len());
    }
}
