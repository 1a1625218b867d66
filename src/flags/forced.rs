//! Flags that are forced on regardless of what any flag source says.

use std::collections::BTreeMap;

/// Built-in forced flags.
pub const FORCED_FLAGS: &[(&str, bool)] = &[
    ("custom_agents", true),
    ("agentPlaygroundFlagFrontend", true),
    ("marketplaceFlagFrontend", true),
    ("agentPlaygroundEnabled", true),
    ("marketplaceEnabled", true),
    // backend feature gates
    ("agent_marketplace", true),
    ("knowledge_base", true),
    ("agent_builder", true),
    ("workflows", true),
    ("scheduling", true),
    ("secure_mcp", true),
];

pub fn is_overridden(name: &str) -> bool {
    FORCED_FLAGS.iter().any(|(n, _)| *n == name)
}

/// Forced value, `false` for names outside the table.
pub fn value_of(name: &str) -> bool {
    FORCED_FLAGS
        .iter()
        .find(|(n, _)| *n == name)
        .is_some_and(|(_, v)| *v)
}

/// The built-in table plus names forced on through configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagOverrides {
    extra: BTreeMap<String, bool>,
}

impl FlagOverrides {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn with_forced<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !name.is_empty() {
                self.extra.insert(name, true);
            }
        }
        self
    }

    pub fn is_overridden(&self, name: &str) -> bool {
        is_overridden(name) || self.extra.contains_key(name)
    }

    pub fn value_of(&self, name: &str) -> bool {
        if is_overridden(name) {
            return value_of(name);
        }
        self.extra.get(name).copied().unwrap_or(false)
    }

    pub fn entries(&self) -> BTreeMap<String, bool> {
        let mut all: BTreeMap<String, bool> = FORCED_FLAGS.iter().map(|(n, v)| (n.to_string(), *v)).collect();
        for (name, value) in &self.extra {
            all.entry(name.clone()).or_insert(*value);
        }
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_flags_are_forced_on() {
        for (name, _) in FORCED_FLAGS {
            assert!(is_overridden(name));
            assert!(value_of(name));
        }
        for name in [
            "custom_agents",
            "marketplaceEnabled",
            "agent_marketplace",
            "knowledge_base",
            "agent_builder",
            "workflows",
            "scheduling",
            "secure_mcp",
        ] {
            assert!(value_of(name), "{name} should be forced on");
        }
        assert_eq!(FORCED_FLAGS.len(), 11);
    }

    #[test]
    fn unknown_flags_are_not_overridden() {
        assert!(!is_overridden("dark_mode"));
        assert!(!value_of("dark_mode"));
        assert!(!is_overridden("Custom_Agents"));
    }

    #[test]
    fn configured_names_extend_the_table() {
        let overrides = FlagOverrides::builtin().with_forced(["beta_tools", ""]);
        assert!(overrides.is_overridden("beta_tools"));
        assert!(overrides.value_of("beta_tools"));
        assert!(overrides.value_of("custom_agents"));
        assert!(!overrides.is_overridden(""));
        assert_eq!(overrides.entries().len(), FORCED_FLAGS.len() + 1);
    }
}
