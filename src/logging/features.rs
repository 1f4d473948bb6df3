//! Feature-specific logging macros and utilities
//!
//! Each feature logs under its own `dm8gen::<feature>` target so levels can be
//! tuned per component from the logging configuration.

/// Feature categories for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFeature {
    Index,
    Resolver,
    Zones,
    TypeMapping,
    Cache,
    Reverse,
}

impl LogFeature {
    pub const ALL: [LogFeature; 6] = [
        LogFeature::Index,
        LogFeature::Resolver,
        LogFeature::Zones,
        LogFeature::TypeMapping,
        LogFeature::Cache,
        LogFeature::Reverse,
    ];

    /// Get the target string for this feature
    pub fn target(&self) -> &'static str {
        match self {
            LogFeature::Index => "dm8gen::index",
            LogFeature::Resolver => "dm8gen::resolver",
            LogFeature::Zones => "dm8gen::zones",
            LogFeature::TypeMapping => "dm8gen::type_mapping",
            LogFeature::Cache => "dm8gen::cache",
            LogFeature::Reverse => "dm8gen::reverse",
        }
    }

    /// Name used for this feature in configuration files and env overrides
    pub fn name(&self) -> &'static str {
        match self {
            LogFeature::Index => "index",
            LogFeature::Resolver => "resolver",
            LogFeature::Zones => "zones",
            LogFeature::TypeMapping => "type_mapping",
            LogFeature::Cache => "cache",
            LogFeature::Reverse => "reverse",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

// Macros for entity index build, refresh and persistence
#[macro_export]
macro_rules! log_index_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "dm8gen::index", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_index_info {
    ($($arg:tt)*) => {
        log::info!(target: "dm8gen::index", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_index_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "dm8gen::index", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_index_error {
    ($($arg:tt)*) => {
        log::error!(target: "dm8gen::index", $($arg)*)
    };
}


// Macros for locator resolution and entity lookup
#[macro_export]
macro_rules! log_resolver_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "dm8gen::resolver", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_resolver_info {
    ($($arg:tt)*) => {
        log::info!(target: "dm8gen::resolver", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_resolver_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "dm8gen::resolver", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_resolver_error {
    ($($arg:tt)*) => {
        log::error!(target: "dm8gen::resolver", $($arg)*)
    };
}


// Macros for zone registry loading
#[macro_export]
macro_rules! log_zones_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "dm8gen::zones", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_zones_info {
    ($($arg:tt)*) => {
        log::info!(target: "dm8gen::zones", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_zones_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "dm8gen::zones", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_zones_error {
    ($($arg:tt)*) => {
        log::error!(target: "dm8gen::zones", $($arg)*)
    };
}


// Macros for type mapping resolution
#[macro_export]
macro_rules! log_type_mapping_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "dm8gen::type_mapping", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_type_mapping_info {
    ($($arg:tt)*) => {
        log::info!(target: "dm8gen::type_mapping", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_type_mapping_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "dm8gen::type_mapping", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_type_mapping_error {
    ($($arg:tt)*) => {
        log::error!(target: "dm8gen::type_mapping", $($arg)*)
    };
}


// Macros for mapping cache
#[macro_export]
macro_rules! log_cache_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "dm8gen::cache", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_cache_info {
    ($($arg:tt)*) => {
        log::info!(target: "dm8gen::cache", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_cache_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "dm8gen::cache", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_cache_error {
    ($($arg:tt)*) => {
        log::error!(target: "dm8gen::cache", $($arg)*)
    };
}


// Macros for reverse engineering of source systems
#[macro_export]
macro_rules! log_reverse_debug {
    ($($arg:tt)*) => {
        log::debug!(target: "dm8gen::reverse", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_reverse_info {
    ($($arg:tt)*) => {
        log::info!(target: "dm8gen::reverse", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_reverse_warn {
    ($($arg:tt)*) => {
        log::warn!(target: "dm8gen::reverse", $($arg)*)
    };
}

#[macro_export]
macro_rules! log_reverse_error {
    ($($arg:tt)*) => {
        log::error!(target: "dm8gen::reverse", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for feature in LogFeature::ALL {
            assert_eq!(LogFeature::from_name(feature.name()), Some(feature));
            assert!(feature.target().ends_with(feature.name()));
        }
        assert_eq!(LogFeature::from_name("TYPE_MAPPING"), Some(LogFeature::TypeMapping));
        assert_eq!(LogFeature::from_name("network"), None);
    }
}
