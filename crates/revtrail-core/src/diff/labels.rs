//! Label resolution and group summaries.
//!
//! Resolution order: exact normalized path in the dictionary, then the last
//! segment, then the humanizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Language;
use crate::diff::noise::{last_segment, normalize_path};

/// Label shown for an opaque (unparseable) snapshot pair
pub const OPAQUE_LABEL: LabelPair = LabelPair {
    vi: "Dữ liệu thô",
    en: "Raw snapshot",
};

/// Label shown for the empty sentinel
pub const EMPTY_LABEL: LabelPair = LabelPair {
    vi: "Không có thay đổi",
    en: "No changes",
};

/// Static label pair for built-in labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelPair {
    pub vi: &'static str,
    pub en: &'static str,
}

impl LabelPair {
    pub fn get(&self, language: Language) -> &'static str {
        match language {
            Language::Vi => self.vi,
            Language::En => self.en,
        }
    }
}

/// A dictionary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelText {
    pub vi: String,
    pub en: String,
}

impl LabelText {
    pub fn new(vi: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            vi: vi.into(),
            en: en.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Vi => &self.vi,
            Language::En => &self.en,
        }
    }
}

/// Field labels keyed by normalized path (`address.zipCode`) or field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelDictionary {
    entries: BTreeMap<String, LabelText>,
}

const BUILTIN_LABELS: &[(&str, &str, &str)] = &[
    ("companyName", "Tên công ty", "Company name"),
    ("contractNumber", "Số hợp đồng", "Contract number"),
    ("orderNumber", "Số đơn hàng", "Order number"),
    ("status", "Trạng thái", "Status"),
    ("startDate", "Ngày bắt đầu", "Start date"),
    ("endDate", "Ngày kết thúc", "End date"),
    ("deliveryDate", "Ngày giao hàng", "Delivery date"),
    ("unitPrice", "Đơn giá", "Unit price"),
    ("quantity", "Số lượng", "Quantity"),
    ("tags", "Nhãn", "Tags"),
    ("active", "Đang hoạt động", "Active"),
    ("taxCode", "Mã số thuế", "Tax code"),
    ("contactEmail", "Email liên hệ", "Contact email"),
    ("attachmentUrl", "Tệp đính kèm", "Attachment"),
    ("address", "Địa chỉ", "Address"),
    ("street", "Đường", "Street"),
    ("ward", "Phường/Xã", "Ward"),
    ("district", "Quận/Huyện", "District"),
    ("city", "Tỉnh/Thành phố", "City"),
    ("zipCode", "Mã bưu chính", "Zip code"),
    ("address.street", "Địa chỉ - Đường", "Address - Street"),
    ("address.city", "Địa chỉ - Tỉnh/Thành phố", "Address - City"),
    ("address.zipCode", "Địa chỉ - Mã bưu chính", "Address - Zip code"),
    ("contract.companyName", "Công ty ký hợp đồng", "Contracting company"),
];

impl LabelDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Labels for the fields of the built-in entities
    pub fn builtin() -> Self {
        let mut dict = Self::new();
        for (key, vi, en) in BUILTIN_LABELS {
            dict.insert(*key, LabelText::new(*vi, *en));
        }
        dict
    }

    pub fn insert(&mut self, key: impl Into<String>, text: LabelText) {
        self.entries.insert(key.into(), text);
    }

    pub fn get(&self, key: &str) -> Option<&LabelText> {
        self.entries.get(key)
    }

    /// Add `other`'s entries, replacing ours on conflict
    pub fn merge(&mut self, other: LabelDictionary) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve the display label of a flattened path
pub fn resolve_label(path: &str, dictionary: &LabelDictionary, language: Language) -> String {
    let normalized = normalize_path(path);
    if let Some(text) = dictionary.get(&normalized) {
        return text.get(language).to_string();
    }
    let last = last_segment(path);
    if let Some(text) = dictionary.get(last) {
        return text.get(language).to_string();
    }
    if last.is_empty() {
        return path.to_string();
    }
    humanize(last)
}

/// Turn a field name into words: `zipCode` → `Zip code`, `contractID` →
/// `Contract ID`, `reseller_name` → `Reseller name`
pub fn humanize(name: &str) -> String {
    let words: Vec<String> = split_words(name)
        .into_iter()
        .map(|w| {
            if w.chars().count() > 1 && w.chars().all(|c| !c.is_lowercase()) {
                w
            } else {
                w.to_lowercase()
            }
        })
        .collect();

    let mut out = words.join(" ");
    if let Some(first) = out.chars().next() {
        let upper: String = first.to_uppercase().collect();
        out.replace_range(..first.len_utf8(), &upper);
    }
    out
}

fn split_words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == ' ' || c == '.' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(&prev) = i.checked_sub(1).and_then(|p| chars.get(p)) {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                // acronym followed by a word: "HTTPStatus" → "HTTP" | "Status"
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()))
                || (prev.is_alphabetic() && c.is_ascii_digit())
                || (prev.is_ascii_digit() && c.is_alphabetic());
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// First `limit` labels joined with ", ", plus " +K" for the rest
pub fn summarize(labels: &[String], limit: usize) -> String {
    let shown = labels.len().min(limit);
    let mut summary = labels[..shown].join(", ");
    let remaining = labels.len() - shown;
    if remaining > 0 {
        summary.push_str(&format!(" +{}", remaining));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("zipCode"), "Zip code");
        assert_eq!(humanize("contractID"), "Contract ID");
        assert_eq!(humanize("HTTPStatus"), "HTTP status");
        assert_eq!(humanize("reseller_name"), "Reseller name");
        assert_eq!(humanize("billing-cycle"), "Billing cycle");
        assert_eq!(humanize("addressLine2"), "Address line 2");
        assert_eq!(humanize("vat"), "Vat");
    }

    #[test]
    fn test_resolution_prefers_exact_path() {
        let dict = LabelDictionary::builtin();
        assert_eq!(
            resolve_label("address.zipCode", &dict, Language::En),
            "Address - Zip code"
        );
        assert_eq!(
            resolve_label("reseller.address.zipCode", &dict, Language::En),
            "Zip code"
        );
        assert_eq!(resolve_label("companyName", &dict, Language::Vi), "Tên công ty");
        assert_eq!(resolve_label("meterSerial", &dict, Language::Vi), "Meter serial");
    }

    #[test]
    fn test_resolution_strips_indices() {
        let dict = LabelDictionary::builtin();
        assert_eq!(resolve_label("tags[1]", &dict, Language::En), "Tags");
        assert_eq!(resolve_label("items[0].status", &dict, Language::En), "Status");
    }

    #[test]
    fn test_merge_overrides() {
        let mut dict = LabelDictionary::builtin();
        let mut extra = LabelDictionary::new();
        extra.insert("status", LabelText::new("Tình trạng", "State"));
        dict.merge(extra);
        assert_eq!(resolve_label("status", &dict, Language::En), "State");
    }

    #[test]
    fn test_summarize() {
        let labels: Vec<String> = ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect();
        assert_eq!(summarize(&labels, 3), "A, B, C +2");
        assert_eq!(summarize(&labels[..2], 3), "A, B");
        assert_eq!(summarize(&[], 3), "");
    }
}
