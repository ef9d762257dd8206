//! 品牌名与邮箱检测器
use regex::bytes::Regex;

use crate::error::ScanError;
use crate::rules::PatternRules;

/// 编译好的检测器（字节级正则，避免非 UTF-8 文本导致漏检）
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    pub(crate) brand: Regex,
    pub(crate) email: Regex,
}

impl BrandMatcher {
    /// 内置规则
    pub fn builtin() -> Result<Self, ScanError> {
        Self::from_rules(&PatternRules::default())
    }

    /// 从规则构建；正则无效时直接报错，而不是静默跳过
    pub fn from_rules(rules: &PatternRules) -> Result<Self, ScanError> {
        Ok(Self { brand: Regex::new(rules.brand_pattern())?, email: Regex::new(rules.email_pattern())? })
    }

    /// 该行的品牌命中是否全部来自邮箱
    pub(crate) fn is_email_only(&self, line: &[u8]) -> bool {
        let emails = self.email.find_iter(line).count();
        emails > 0 && emails == self.brand.find_iter(line).count()
    }
}
