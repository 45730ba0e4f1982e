//! Analysis configuration.

use kiln_diagnostic::DiagnosticConfig;

/// Settings for one compilation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SemaConfig {
    /// Width of `usize`/`isize` on the target.
    pub pointer_bits: u16,
    /// Emit runtime checks (array bounds) in function bodies.
    pub safety_checks: bool,
    pub diagnostics: DiagnosticConfig,
}

impl Default for SemaConfig {
    fn default() -> Self {
        Self {
            pointer_bits: 64,
            safety_checks: true,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl SemaConfig {
    /// Default settings with no diagnostic limit or deduplication.
    pub fn for_tests() -> Self {
        Self {
            diagnostics: DiagnosticConfig::unlimited(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_pointer_bits(mut self, bits: u16) -> Self {
        self.pointer_bits = bits;
        self
    }

    #[must_use]
    pub fn with_safety_checks(mut self, enabled: bool) -> Self {
        self.safety_checks = enabled;
        self
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticConfig) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_64_bit_with_safety() {
        let config = SemaConfig::default();
        assert_eq!(config.pointer_bits, 64);
        assert!(config.safety_checks);
        assert_eq!(config.diagnostics.error_limit, 10);
    }

    #[test]
    fn builder_setters() {
        let config = SemaConfig::for_tests()
            .with_pointer_bits(32)
            .with_safety_checks(false);
        assert_eq!(config.pointer_bits, 32);
        assert!(!config.safety_checks);
        assert_eq!(config.diagnostics, DiagnosticConfig::unlimited());
    }
}
