// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use thiserror::Error;

/// Error taxonomy shared by every declustering crate.
///
/// All variants are fatal: the computation is deterministic, so nothing here
/// is worth retrying.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DeclusterError {
    /// Neither a full year/month/day triple nor a timestamp column was supplied.
    #[error("invalid catalogue schema: {0}")]
    InvalidCatalogueSchema(String),
    /// Columns are present but their contents are unusable.
    #[error("invalid catalogue: {0}")]
    InvalidCatalogue(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("numerical issue: {0}")]
    NumericalIssue(String),
}

impl DeclusterError {
    pub fn invalid_schema(msg: impl Into<String>) -> Self {
        Self::InvalidCatalogueSchema(msg.into())
    }

    pub fn invalid_catalogue(msg: impl Into<String>) -> Self {
        Self::InvalidCatalogue(msg.into())
    }

    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    pub fn numerical_issue(msg: impl Into<String>) -> Self {
        Self::NumericalIssue(msg.into())
    }

    /// Stable machine-readable code, used by the CLI error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCatalogueSchema(_) => "invalid_catalogue_schema",
            Self::InvalidCatalogue(_) => "invalid_catalogue",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::NumericalIssue(_) => "numerical_issue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DeclusterError;

    #[test]
    fn constructors_map_to_expected_variants() {
        assert!(matches!(
            DeclusterError::invalid_schema("x"),
            DeclusterError::InvalidCatalogueSchema(_)
        ));
        assert!(matches!(
            DeclusterError::invalid_catalogue("x"),
            DeclusterError::InvalidCatalogue(_)
        ));
        assert!(matches!(
            DeclusterError::invalid_configuration("x"),
            DeclusterError::InvalidConfiguration(_)
        ));
        assert!(matches!(
            DeclusterError::numerical_issue("x"),
            DeclusterError::NumericalIssue(_)
        ));
    }

    #[test]
    fn display_prefixes_variant_context() {
        let err = DeclusterError::invalid_schema("missing time columns");
        assert_eq!(
            err.to_string(),
            "invalid catalogue schema: missing time columns"
        );
        assert_eq!(err.code(), "invalid_catalogue_schema");

        let err = DeclusterError::invalid_configuration("fs_time_prop=2");
        assert_eq!(err.to_string(), "invalid configuration: fs_time_prop=2");
        assert_eq!(err.code(), "invalid_configuration");
    }
}
