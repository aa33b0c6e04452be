//! Cross-language query normalization.
//!
//! A [`TermMapping`] is an ordered table of canonical terms, each with the
//! alternate spellings and translations that should be rewritten to it.
//! Normalization lowercases the query and then, for every canonical term in
//! insertion order and every alternate in declared order, replaces all
//! occurrences of the alternate with the canonical term.
//!
//! Replacement is plain substring replacement, so the table order matters
//! when alternates overlap. The built-in table declares longer phrases
//! before their sub-phrases (`như thế nào` before `thế nào`). Normalization
//! stays idempotent as long as no alternate is a substring of a canonical
//! term and no canonical term is a substring of an alternate declared
//! earlier. [`TermMapping::conflicts`] reports both cases.

use std::sync::OnceLock;

/// Built-in English/Vietnamese mapping, in application order.
const BUILTIN_TERMS: &[(&str, &[&str])] = &[
    ("what is", &["là gì", "la gi", "what's", "whats"]),
    ("service", &["dịch vụ", "dich vu"]),
    ("benefits", &["lợi ích", "loi ich"]),
    (
        "auto scaling",
        &[
            "autoscaling",
            "tự động mở rộng",
            "tu dong mo rong",
            "co giãn tự động",
        ],
    ),
    // After "auto scaling": its alternates contain that canonical term.
    (
        "auto scaling group",
        &["nhóm auto scaling", "nhom auto scaling", "asg"],
    ),
    ("target tracking", &["theo dõi mục tiêu", "theo doi muc tieu"]),
    ("instance", &["máy chủ ảo", "may chu ao"]),
    ("cost", &["chi phí", "chi phi"]),
    ("weather", &["thời tiết", "thoi tiet"]),
    ("traffic", &["giao thông", "giao thong", "kẹt xe", "ket xe"]),
    ("restaurant", &["nhà hàng", "nha hang", "quán ăn", "quan an"]),
    ("how", &["như thế nào", "nhu the nao", "thế nào", "the nao"]),
    ("when", &["khi nào", "khi nao"]),
    ("why", &["tại sao", "tai sao", "vì sao", "vi sao"]),
    ("hanoi", &["hà nội", "ha noi"]),
    (
        "ho chi minh",
        &["hồ chí minh", "tp hcm", "tp.hcm", "sài gòn", "saigon"],
    ),
    ("da nang", &["đà nẵng", "danang"]),
];

/// Ordered canonical-term → alternates table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermMapping {
    terms: Vec<(String, Vec<String>)>,
}

impl TermMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in English/Vietnamese table.
    pub fn builtin() -> Self {
        let mut mapping = Self::new();
        for (canonical, alternates) in BUILTIN_TERMS {
            mapping.insert(canonical, alternates.iter().copied());
        }
        mapping
    }

    /// Register alternates under `canonical`.
    ///
    /// A canonical term that is already present keeps its position and gains
    /// the new alternates at the end of its list. Terms are stored lowercased.
    pub fn insert<'a>(&mut self, canonical: &str, alternates: impl IntoIterator<Item = &'a str>) {
        let canonical = canonical.to_lowercase();
        let alternates = alternates.into_iter().map(str::to_lowercase);
        match self.terms.iter_mut().find(|(c, _)| *c == canonical) {
            Some((_, existing)) => {
                for alt in alternates {
                    if !existing.contains(&alt) {
                        existing.push(alt);
                    }
                }
            }
            None => self.terms.push((canonical, alternates.collect())),
        }
    }

    /// Iterate `(canonical, alternates)` in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.terms.iter().map(|(c, a)| (c.as_str(), a.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Lowercase `query` and rewrite every registered alternate to its
    /// canonical term.
    pub fn normalize(&self, query: &str) -> String {
        let mut text = query.to_lowercase();
        for (canonical, alternates) in &self.terms {
            for alt in alternates {
                if alt.is_empty() || alt == canonical {
                    continue;
                }
                if text.contains(alt.as_str()) {
                    text = text.replace(alt.as_str(), canonical);
                }
            }
        }
        text
    }

    /// `(alternate, canonical)` pairs that can make normalization
    /// non-idempotent.
    ///
    /// A pair is reported when the alternate occurs inside a canonical term,
    /// or when a canonical term occurs inside an alternate of a term declared
    /// before it. In the second case the later rewrite produces text the
    /// earlier alternate matches on the next pass. The application logs
    /// these when user-supplied terms are merged into the table.
    pub fn conflicts(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for (i, (_, alternates)) in self.iter().enumerate() {
            for alt in alternates {
                for (j, (canonical, _)) in self.iter().enumerate() {
                    if alt == canonical {
                        continue;
                    }
                    if canonical.contains(alt.as_str()) || (i < j && alt.contains(canonical)) {
                        out.push((alt.clone(), canonical.to_string()));
                    }
                }
            }
        }
        out
    }
}

/// Normalize with the built-in table.
pub fn normalize(query: &str) -> String {
    static BUILTIN: OnceLock<TermMapping> = OnceLock::new();
    BUILTIN.get_or_init(TermMapping::builtin).normalize(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize("Amazon EC2"), "amazon ec2");
    }

    #[test]
    fn test_vietnamese_what_is() {
        assert_eq!(
            normalize("Amazon EC2 Auto Scaling là gì?"),
            "amazon ec2 auto scaling what is?"
        );
    }

    #[test]
    fn test_uppercase_vietnamese_is_lowered_before_mapping() {
        assert_eq!(
            normalize("Dịch vụ Amazon EC2 Auto Scaling LÀ GÌ"),
            "service amazon ec2 auto scaling what is"
        );
    }

    #[test]
    fn test_longer_phrase_declared_first_wins() {
        // "như thế nào" must not be left as "như how"
        assert_eq!(normalize("thời tiết như thế nào"), "weather how");
    }

    #[test]
    fn test_unchanged_without_alternates() {
        assert_eq!(normalize("hello world"), "hello world");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Amazon EC2 Auto Scaling là gì?",
            "Dịch vụ Amazon EC2 Auto Scaling là gì",
            "Lợi ích của Amazon EC2 Auto Scaling là gì?",
            "ASG là gì?",
            "nhóm auto scaling là gì",
            "nhóm autoscaling là gì",
            "nhom tự động mở rộng",
            "Nhóm Auto Scaling tự động mở rộng như thế nào?",
            "Thời tiết hôm nay ở Hà Nội như thế nào?",
            "Kẹt xe ở Sài Gòn khi nào?",
            "What's autoscaling?",
            "tp.hcm nhà hàng quán ăn",
            "",
            "   ",
        ];
        for s in samples {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_builtin_has_no_conflicts() {
        assert!(TermMapping::builtin().conflicts().is_empty());
    }

    #[test]
    fn test_group_alternates_reach_group_term_in_one_pass() {
        assert_eq!(
            normalize("nhóm autoscaling là gì"),
            "auto scaling group what is"
        );
        assert_eq!(normalize("nhom tự động mở rộng"), "auto scaling group");
    }

    #[test]
    fn test_canonical_inside_earlier_alternate_is_a_conflict() {
        // Group term declared before the term its alternate contains.
        let mut m = TermMapping::new();
        m.insert("auto scaling group", ["nhóm auto scaling"]);
        m.insert("auto scaling", ["autoscaling"]);
        assert_eq!(
            m.conflicts(),
            vec![("nhóm auto scaling".to_string(), "auto scaling".to_string())]
        );

        let once = m.normalize("nhóm autoscaling");
        assert_eq!(once, "nhóm auto scaling");
        assert_ne!(m.normalize(&once), once);
    }

    #[test]
    fn test_canonical_inside_later_alternate_is_not_a_conflict() {
        let mut m = TermMapping::new();
        m.insert("auto scaling", ["autoscaling"]);
        m.insert("auto scaling group", ["nhóm auto scaling"]);
        assert!(m.conflicts().is_empty());

        let once = m.normalize("nhóm autoscaling");
        assert_eq!(once, "auto scaling group");
        assert_eq!(m.normalize(&once), once);
    }

    #[test]
    fn test_iter_follows_declaration_order() {
        let m = TermMapping::builtin();
        let canonicals: Vec<&str> = m.iter().map(|(c, _)| c).collect();
        let plain = canonicals.iter().position(|c| *c == "auto scaling").unwrap();
        let group = canonicals
            .iter()
            .position(|c| *c == "auto scaling group")
            .unwrap();
        assert!(plain < group);
        assert_eq!(canonicals.len(), m.len());
    }

    #[test]
    fn test_alternate_equal_to_canonical_is_skipped() {
        let mut m = TermMapping::new();
        m.insert("cost", ["cost", "chi phí"]);
        assert_eq!(m.normalize("Cost chi phí"), "cost cost");
    }

    #[test]
    fn test_insert_merges_into_existing_term() {
        let mut m = TermMapping::builtin();
        let before = m.len();
        m.insert("weather", ["khí hậu"]);
        assert_eq!(m.len(), before);
        assert_eq!(m.normalize("khí hậu"), "weather");
    }

    #[test]
    fn test_declaration_order_applies() {
        let mut m = TermMapping::new();
        m.insert("scaling", ["co giãn"]);
        m.insert("auto scaling", ["tự động co giãn"]);
        // The shorter alternate is applied first and breaks the longer one.
        assert_eq!(m.normalize("tự động co giãn"), "tự động scaling");
    }

    #[test]
    fn test_conflicts_detected() {
        let mut m = TermMapping::new();
        m.insert("auto scaling", ["scaling"]);
        assert_eq!(
            m.conflicts(),
            vec![("scaling".to_string(), "auto scaling".to_string())]
        );
    }
}
