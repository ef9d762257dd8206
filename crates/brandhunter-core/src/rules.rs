//! 规则文件加载（TOML）
//!
//! 规则文件可以覆盖内置的品牌正则与邮箱正则，两个字段都是可选的：
//!
//! ```toml
//! brand = '[Rr][Ee][Dd]\s?[Hh][Aa][Tt]'
//! email = '<[^@]+@redhat\.com>'
//! ```
use serde::Deserialize;
use std::path::Path;

use crate::error::ScanError;

/// 品牌名：red / hat 两个词逐字母大小写不敏感，中间允许零或一个空白
pub const DEFAULT_BRAND_PATTERN: &str = r"(?m)[Rr][Ee][Dd]\s?[Hh][Aa][Tt]";
/// 尖括号包裹、域名为 redhat.com 的邮箱
pub const DEFAULT_EMAIL_PATTERN: &str = r"<[^@]+@redhat\.com>";

/// 规则文件结构
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternRules {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl PatternRules {
    pub(crate) fn brand_pattern(&self) -> &str {
        self.brand.as_deref().unwrap_or(DEFAULT_BRAND_PATTERN)
    }

    pub(crate) fn email_pattern(&self) -> &str {
        self.email.as_deref().unwrap_or(DEFAULT_EMAIL_PATTERN)
    }
}

/// 从 TOML 规则文件加载
pub fn load_pattern_rules(path: &Path) -> Result<PatternRules, ScanError> {
    let txt = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
    toml::from_str(&txt).map_err(|source| ScanError::Rules { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_builtin() {
        let rules: PatternRules = toml::from_str("").unwrap();
        assert_eq!(rules.brand_pattern(), DEFAULT_BRAND_PATTERN);
        assert_eq!(rules.email_pattern(), DEFAULT_EMAIL_PATTERN);
    }

    #[test]
    fn overrides_only_what_is_given() {
        let rules: PatternRules = toml::from_str(r#"email = '<[^@]+@example\.org>'"#).unwrap();
        assert_eq!(rules.brand_pattern(), DEFAULT_BRAND_PATTERN);
        assert_eq!(rules.email_pattern(), r"<[^@]+@example\.org>");
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "brand = [1, 2]\n").unwrap();
        let err = load_pattern_rules(&path).unwrap_err();
        assert!(matches!(err, ScanError::Rules { .. }));
        assert!(err.to_string().contains("rules.toml"));
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "brnad = 'typo'\n").unwrap();
        assert!(load_pattern_rules(&path).is_err());
    }
}
