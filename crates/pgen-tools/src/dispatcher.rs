//! Tool dispatcher that routes tool names to integrations

use crate::eclipse::EclipseGnuMcu;
use crate::integration::ToolIntegration;
use crate::makefile::MakefileGccArm;

/// A built-in tool and the names it answers to.
#[derive(Debug, Clone, Copy)]
struct ToolRegistration {
    slug: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
}

const BUILTIN_TOOLS: &[ToolRegistration] = &[
    ToolRegistration {
        slug: "gcc_arm",
        aliases: &["make_gcc_arm"],
        description: "GNU Make project for arm-none-eabi-gcc",
    },
    ToolRegistration {
        slug: "gnu_mcu_eclipse",
        aliases: &[],
        description: "Eclipse project for the GNU MCU Eclipse plugin",
    },
];

/// Dispatches tool names to their integrations.
#[derive(Debug, Default)]
pub struct ToolDispatcher;

impl ToolDispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Canonical name for a tool name or alias.
    pub fn resolve(&self, tool_name: &str) -> Option<&'static str> {
        BUILTIN_TOOLS
            .iter()
            .find(|reg| reg.slug == tool_name || reg.aliases.contains(&tool_name))
            .map(|reg| reg.slug)
    }

    /// Get an integration for a tool by name or alias.
    ///
    /// Returns `None` if the tool name is not recognized.
    pub fn get_integration(&self, tool_name: &str) -> Option<Box<dyn ToolIntegration>> {
        let integration: Box<dyn ToolIntegration> = match self.resolve(tool_name)? {
            "gcc_arm" => Box::new(MakefileGccArm::new()),
            "gnu_mcu_eclipse" => Box::new(EclipseGnuMcu::new()),
            _ => return None,
        };
        Some(integration)
    }

    pub fn has_tool(&self, tool_name: &str) -> bool {
        self.resolve(tool_name).is_some()
    }

    /// Canonical names of all built-in tools, sorted.
    pub fn list_available(&self) -> Vec<String> {
        let mut tools: Vec<String> = BUILTIN_TOOLS.iter().map(|r| r.slug.to_string()).collect();
        tools.sort();
        tools
    }

    /// Aliases of a tool.
    pub fn aliases(&self, tool_name: &str) -> &'static [&'static str] {
        BUILTIN_TOOLS
            .iter()
            .find(|reg| reg.slug == tool_name)
            .map(|reg| reg.aliases)
            .unwrap_or(&[])
    }

    /// One-line description of a tool.
    pub fn description(&self, tool_name: &str) -> Option<&'static str> {
        let slug = self.resolve(tool_name)?;
        BUILTIN_TOOLS
            .iter()
            .find(|reg| reg.slug == slug)
            .map(|reg| reg.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("gcc_arm", "gcc_arm")]
    #[case("make_gcc_arm", "gcc_arm")]
    #[case("gnu_mcu_eclipse", "gnu_mcu_eclipse")]
    fn resolves_names_and_aliases(#[case] requested: &str, #[case] canonical: &str) {
        let dispatcher = ToolDispatcher::new();
        let integration = dispatcher.get_integration(requested).unwrap();
        assert_eq!(integration.name(), canonical);
    }

    #[test]
    fn unknown_tool_has_no_integration() {
        let dispatcher = ToolDispatcher::new();
        assert!(dispatcher.get_integration("uvision").is_none());
        assert!(!dispatcher.has_tool("uvision"));
    }

    #[test]
    fn list_available_is_sorted() {
        let tools = ToolDispatcher::new().list_available();
        assert_eq!(tools, vec!["gcc_arm".to_string(), "gnu_mcu_eclipse".to_string()]);
    }

    #[test]
    fn eclipse_shares_the_gcc_toolchain() {
        let eclipse = ToolDispatcher::new().get_integration("gnu_mcu_eclipse").unwrap();
        assert_eq!(eclipse.keywords(), vec!["gcc_arm", "gnu_mcu_eclipse"]);
    }
}
