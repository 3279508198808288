//! # Rule Hints / 规则提示
//!
//! Classification of the free-text messages returned by the backend rule
//! check. The backend does not tag quantity reductions, so they are found by
//! phrase matching in all three languages.
//!
//! 后端规则检查返回的文本消息分类。数量削减通过三种语言的短语匹配识别。

use once_cell::sync::Lazy;

/// Lower-cased phrases that mark a quantity reduction.
static REDUCTION_PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "menge auf",
        "mengenbeschränkung",
        "quantité réduite",
        "quantité ramenée",
        "quantità ridotta",
    ]
});

/// Marker of the rule result emitted when no LKN could be identified at all.
const NO_VALID_LKN: &str = "keine gültige lkn";

/// Kind of a rule-check message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HintKind {
    /// The backend reduced the billed quantity.
    QuantityReduction,
    /// No valid LKN was found.
    NoValidLkn,
    Other,
}

pub fn classify(message: &str) -> HintKind {
    let lower = message.to_lowercase();
    if REDUCTION_PHRASES.iter().any(|p| lower.contains(p)) {
        return HintKind::QuantityReduction;
    }
    if lower.contains(NO_VALID_LKN) {
        return HintKind::NoValidLkn;
    }
    if lower.contains("menge") || lower.contains("quantit") {
        tracing::debug!(
            "Rule message mentions a quantity but matched no reduction phrase: {}",
            message
        );
    }
    HintKind::Other
}

pub fn is_quantity_reduction(message: &str) -> bool {
    classify(message) == HintKind::QuantityReduction
}

pub fn is_no_valid_lkn(message: &str) -> bool {
    classify(message) == HintKind::NoValidLkn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_is_case_insensitive() {
        assert!(is_quantity_reduction("MENGE AUF 2 reduziert"));
        assert!(is_quantity_reduction("Quantité réduite à 1"));
    }

    #[test]
    fn unrelated_text_is_other() {
        assert_eq!(classify("Kumulationsverbot mit AA.00.0010"), HintKind::Other);
    }
}
