//! Candidate item codes for an unknown SKU

/// Case and separator variants of `sku`, deduplicated in generation order
/// and never containing `sku` itself.
pub fn sku_variants(sku: &str) -> Vec<String> {
    let candidates = [
        sku.to_uppercase(),
        sku.to_lowercase(),
        sku.replace('-', ""),
        sku.replace('_', ""),
        sku.replace(' ', ""),
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate != sku && !candidate.is_empty() && !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_exclude_original_and_duplicates() {
        let variants = sku_variants("abc-123");
        assert_eq!(variants, vec!["ABC-123".to_string(), "abc123".to_string()]);
    }

    #[test]
    fn variants_keep_generation_order() {
        let variants = sku_variants("Ab_c-1 x");
        assert_eq!(variants, ["AB_C-1 X", "ab_c-1 x", "Ab_c1 x", "Abc-1 x", "Ab_c-1x"]);
    }

    #[test]
    fn already_canonical_sku_has_no_variants() {
        assert!(sku_variants("123").is_empty());
    }

    #[test]
    fn every_variant_is_unique() {
        for sku in ["abc-123", "A_B_C", "w i-d_g", "MIXED-case_sku 9"] {
            let variants = sku_variants(sku);
            let mut deduped = variants.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(deduped.len(), variants.len(), "duplicates for {sku}");
            assert!(!variants.iter().any(|v| v == sku));
        }
    }
}
