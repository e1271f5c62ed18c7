//! 翻译前的替换规则
//!
//! 品牌名、国家名、货币代码的字面替换，在文本进入批次之前执行。

use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::translation::error::{TranslationError, TranslationResult};

/// 单条替换规则
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuleSpec {
    pub enabled: bool,
    pub from: String,
    pub to: String,
}

impl RuleSpec {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            enabled: true,
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    fn is_active(&self) -> bool {
        self.enabled && !self.from.is_empty() && !self.to.is_empty()
    }
}

/// 替换规则集合，按品牌、国家、货币的顺序执行
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SubstitutionRules {
    pub brand: Option<RuleSpec>,
    pub country: Option<RuleSpec>,
    pub currency: Option<RuleSpec>,
}

impl SubstitutionRules {
    /// 是否有生效的规则
    pub fn is_empty(&self) -> bool {
        [&self.brand, &self.country, &self.currency]
            .iter()
            .all(|rule| !rule.as_ref().is_some_and(RuleSpec::is_active))
    }

    /// 编译为可执行的规则
    pub fn compile(&self) -> TranslationResult<CompiledRules> {
        let mut rules = Vec::new();

        // 名称替换不区分大小写，货币代码区分大小写
        for (spec, case_insensitive) in [
            (&self.brand, true),
            (&self.country, true),
            (&self.currency, false),
        ] {
            let Some(spec) = spec.as_ref().filter(|spec| spec.is_active()) else {
                continue;
            };

            let pattern = RegexBuilder::new(&regex::escape(&spec.from))
                .case_insensitive(case_insensitive)
                .build()
                .map_err(|e| {
                    TranslationError::InvalidInput(format!("替换规则无效 '{}': {}", spec.from, e))
                })?;

            rules.push((pattern, spec.to.clone()));
        }

        Ok(CompiledRules { rules })
    }
}

/// 编译后的替换规则
#[derive(Debug, Clone, Default)]
pub struct CompiledRules {
    rules: Vec<(Regex, String)>,
}

impl CompiledRules {
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 依次应用所有规则
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (pattern, replacement) in &self.rules {
            out = pattern
                .replace_all(&out, NoExpand(replacement.as_str()))
                .into_owned();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_and_country_ignore_case() {
        let rules = SubstitutionRules {
            brand: Some(RuleSpec::new("Acme", "Globex")),
            country: Some(RuleSpec::new("USA", "Canada")),
            currency: None,
        }
        .compile()
        .unwrap();

        assert_eq!(rules.apply("ACME ships to the usa"), "Globex ships to the Canada");
    }

    #[test]
    fn test_currency_is_case_sensitive() {
        let rules = SubstitutionRules {
            currency: Some(RuleSpec::new("USD", "EUR")),
            ..Default::default()
        }
        .compile()
        .unwrap();

        assert_eq!(rules.apply("Price: 10 USD (usd)"), "Price: 10 EUR (usd)");
    }

    #[test]
    fn test_special_characters_are_literal() {
        let rules = SubstitutionRules {
            brand: Some(RuleSpec::new("A.B (beta)", "$1 Corp")),
            ..Default::default()
        }
        .compile()
        .unwrap();

        assert_eq!(rules.apply("Try A.B (beta) or AxB (beta)"), "Try $1 Corp or AxB (beta)");
    }

    #[test]
    fn test_disabled_or_incomplete_rules_are_skipped() {
        let mut brand = RuleSpec::new("Acme", "Globex");
        brand.enabled = false;
        let rules = SubstitutionRules {
            brand: Some(brand),
            country: Some(RuleSpec::new("USA", "")),
            currency: Some(RuleSpec::new("", "EUR")),
        };

        assert!(rules.is_empty());
        let compiled = rules.compile().unwrap();
        assert!(compiled.is_empty());
        assert_eq!(compiled.apply("Acme USA"), "Acme USA");
    }

    #[test]
    fn test_rules_deserialize_from_request_shape() {
        let rules: SubstitutionRules = serde_json::from_str(
            r#"{"brand":{"enabled":true,"from":"Acme","to":"Globex"},"currency":{"enabled":false}}"#,
        )
        .unwrap();

        assert_eq!(rules.brand, Some(RuleSpec::new("Acme", "Globex")));
        assert!(rules.country.is_none());
        assert!(!rules.currency.unwrap().enabled);
    }
}
