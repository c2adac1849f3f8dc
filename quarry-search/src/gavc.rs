// SPDX-FileCopyrightText: 2026 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! GAVC search criteria and their query-expression rendering.

use quarry_store_db::LikePattern;

/// Group/Artifact/Version/Classifier search criteria.
///
/// Every field is independently optional; a blank field is a full
/// wildcard. Within a field `*` and `?` are the user-facing wildcards;
/// everything else, including index metacharacters, matches literally.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GavcCriteria {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: String,
}

impl GavcCriteria {
    pub fn is_blank(&self) -> bool {
        [&self.group, &self.artifact, &self.version, &self.classifier]
            .iter()
            .all(|f| f.trim().is_empty())
    }

    /// Path pattern for the group dimension, `None` when blank.
    ///
    /// Group segments are split on `.` and escaped individually, so a
    /// wildcard never crosses into the separator position unless the user
    /// wrote one.
    pub(crate) fn group_path_pattern(&self) -> Option<LikePattern> {
        let group = self.group.trim();
        if group.is_empty() {
            return None;
        }
        let mut pattern = LikePattern::empty();
        for (i, segment) in group.split('.').enumerate() {
            if i > 0 {
                pattern = pattern.then_literal("/");
            }
            pattern = pattern.then_user(segment);
        }
        Some(pattern.then_literal("/").then_any())
    }

    /// Name pattern for the artifact and version dimensions, `None` when
    /// both are blank.
    ///
    /// The version is appended as a literal prefix rather than a separate
    /// escaped segment: a version can start with a digit and is
    /// structurally ambiguous with a path segment, so it only ever
    /// constrains the file name.
    pub(crate) fn file_name_pattern(&self) -> Option<LikePattern> {
        let artifact = self.artifact.trim();
        let version = self.version.trim();
        if artifact.is_empty() && version.is_empty() {
            return None;
        }
        let mut pattern = if artifact.is_empty() {
            LikePattern::empty().then_any()
        } else {
            LikePattern::from_user(artifact)
        };
        pattern = pattern.then_literal("-");
        if !version.is_empty() {
            pattern = pattern.then_literal(version);
        }
        Some(pattern.then_any())
    }

    /// Additional `*-classifier.*` name pattern, `None` when blank.
    pub(crate) fn classifier_pattern(&self) -> Option<LikePattern> {
        let classifier = self.classifier.trim();
        if classifier.is_empty() {
            return None;
        }
        Some(
            LikePattern::empty()
                .then_any()
                .then_literal("-")
                .then_user(classifier)
                .then_literal(".")
                .then_any(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_blank_fields_are_wildcards() {
        let c = GavcCriteria::default();
        assert!(c.is_blank());
        assert!(c.group_path_pattern().is_none());
        assert!(c.file_name_pattern().is_none());
        assert!(c.classifier_pattern().is_none());
    }

    #[rstest]
    #[case("org.example", "org/example/%")]
    #[case("org.exam_ple", "org/exam\\_ple/%")]
    #[case("org.*", "org/%/%")]
    fn test_group_segments_escaped_individually(#[case] group: &str, #[case] expected: &str) {
        let c = GavcCriteria {
            group: group.into(),
            ..Default::default()
        };
        assert_eq!(c.group_path_pattern().unwrap().as_sql(), expected);
    }

    #[rstest]
    #[case("lib", "1.0", "lib-1.0%")]
    #[case("lib*", "1.0", "lib%-1.0%")]
    #[case("lib", "1.0_rc%", "lib-1.0\\_rc\\%%")]
    #[case("", "1.0", "%-1.0%")]
    #[case("lib", "", "lib-%")]
    fn test_version_is_literal_prefix(
        #[case] artifact: &str,
        #[case] version: &str,
        #[case] expected: &str,
    ) {
        let c = GavcCriteria {
            artifact: artifact.into(),
            version: version.into(),
            ..Default::default()
        };
        assert_eq!(c.file_name_pattern().unwrap().as_sql(), expected);
    }

    #[test]
    fn test_classifier_suffix_pattern() {
        let c = GavcCriteria {
            classifier: "sources".into(),
            ..Default::default()
        };
        assert_eq!(c.classifier_pattern().unwrap().as_sql(), "%-sources.%");
    }
}
