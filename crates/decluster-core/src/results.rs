// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{DeclusterError, Diagnostics};

/// Role of an event within its cluster.
///
/// Unclustered events are reported as [`ShockType::Mainshock`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "i8", try_from = "i8"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShockType {
    Foreshock,
    #[default]
    Mainshock,
    Aftershock,
}

impl ShockType {
    /// Integer code: -1 foreshock, 0 mainshock or unclustered, 1 aftershock.
    pub fn code(self) -> i8 {
        match self {
            Self::Foreshock => -1,
            Self::Mainshock => 0,
            Self::Aftershock => 1,
        }
    }
}

impl From<ShockType> for i8 {
    fn from(value: ShockType) -> Self {
        value.code()
    }
}

impl TryFrom<i8> for ShockType {
    type Error = DeclusterError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Foreshock),
            0 => Ok(Self::Mainshock),
            1 => Ok(Self::Aftershock),
            other => Err(DeclusterError::invalid_catalogue(format!(
                "shock type code must be -1, 0 or 1; got {other}"
            ))),
        }
    }
}

/// Checks the structural contract of a cluster assignment.
///
/// - `cluster_ids` and `shock_types` have equal length
/// - unclustered events (id 0) are mainshocks
/// - every id in `1..=k` is used, and by exactly one mainshock
pub fn validate_assignments(
    cluster_ids: &[usize],
    shock_types: &[ShockType],
) -> Result<usize, DeclusterError> {
    if cluster_ids.len() != shock_types.len() {
        return Err(DeclusterError::numerical_issue(format!(
            "assignment length mismatch: cluster_ids={}, shock_types={}",
            cluster_ids.len(),
            shock_types.len()
        )));
    }

    let n_clusters = cluster_ids.iter().copied().max().unwrap_or(0);
    let mut mainshocks = vec![0usize; n_clusters + 1];
    let mut members = vec![0usize; n_clusters + 1];

    for (idx, (&id, &shock)) in cluster_ids.iter().zip(shock_types).enumerate() {
        members[id] += 1;
        if shock == ShockType::Mainshock {
            mainshocks[id] += 1;
        } else if id == 0 {
            return Err(DeclusterError::numerical_issue(format!(
                "unclustered event {idx} has shock type {}; expected 0",
                shock.code()
            )));
        }
    }

    for id in 1..=n_clusters {
        if members[id] == 0 {
            return Err(DeclusterError::numerical_issue(format!(
                "cluster ids must be contiguous: id {id} has no members (max id {n_clusters})"
            )));
        }
        if mainshocks[id] != 1 {
            return Err(DeclusterError::numerical_issue(format!(
                "cluster {id} must have exactly one mainshock; found {}",
                mainshocks[id]
            )));
        }
    }

    Ok(n_clusters)
}

/// Per-event cluster assignment aligned to the input catalog order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct DeclusterResult {
    /// 0 for background events, otherwise the 1-based cluster id.
    pub cluster_ids: Vec<usize>,
    pub shock_types: Vec<ShockType>,
    pub diagnostics: Diagnostics,
}

impl DeclusterResult {
    /// Builds a validated result.
    pub fn new(
        cluster_ids: Vec<usize>,
        shock_types: Vec<ShockType>,
        diagnostics: Diagnostics,
    ) -> Result<Self, DeclusterError> {
        validate_assignments(&cluster_ids, &shock_types)?;
        Ok(Self {
            cluster_ids,
            shock_types,
            diagnostics,
        })
    }

    pub fn len(&self) -> usize {
        self.cluster_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cluster_ids.is_empty()
    }

    pub fn n_clusters(&self) -> usize {
        self.cluster_ids.iter().copied().max().unwrap_or(0)
    }

    /// Row indices of every member of cluster `id`, in catalog order.
    pub fn cluster_members(&self, id: usize) -> Vec<usize> {
        if id == 0 {
            return vec![];
        }
        self.cluster_ids
            .iter()
            .enumerate()
            .filter_map(|(idx, &cluster)| (cluster == id).then_some(idx))
            .collect()
    }

    /// Row index of the mainshock that seeded cluster `id`.
    pub fn mainshock_of(&self, id: usize) -> Option<usize> {
        if id == 0 {
            return None;
        }
        self.cluster_ids
            .iter()
            .zip(&self.shock_types)
            .position(|(&cluster, &shock)| cluster == id && shock == ShockType::Mainshock)
    }

    /// Row indices of events that belong to no cluster.
    pub fn background_indices(&self) -> Vec<usize> {
        self.cluster_ids
            .iter()
            .enumerate()
            .filter_map(|(idx, &cluster)| (cluster == 0).then_some(idx))
            .collect()
    }

    /// Events kept in a declustered catalog: background events plus one
    /// mainshock per cluster.
    pub fn independent_mask(&self) -> Vec<bool> {
        self.shock_types
            .iter()
            .map(|&shock| shock == ShockType::Mainshock)
            .collect()
    }

    pub fn shock_type_codes(&self) -> Vec<i8> {
        self.shock_types.iter().map(|&shock| shock.code()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{DeclusterResult, ShockType, validate_assignments};
    use crate::Diagnostics;

    use ShockType::{Aftershock as A, Foreshock as F, Mainshock as M};

    #[test]
    fn shock_type_codes_roundtrip() {
        for shock in [F, M, A] {
            assert_eq!(ShockType::try_from(shock.code()).expect("valid code"), shock);
        }
        assert_eq!(i8::from(F), -1);
        assert_eq!(ShockType::default(), M);
        let err = ShockType::try_from(2).expect_err("2 is not a shock type");
        assert!(err.to_string().contains("got 2"));
    }

    #[test]
    fn accepts_well_formed_assignment() {
        let ids = vec![0, 1, 1, 2, 1, 2, 0];
        let shocks = vec![M, M, F, M, A, A, M];
        assert_eq!(validate_assignments(&ids, &shocks).expect("valid"), 2);
        assert_eq!(validate_assignments(&[], &[]).expect("empty is valid"), 0);
    }

    #[test]
    fn rejects_length_mismatch() {
        let err = validate_assignments(&[0, 0], &[M]).expect_err("mismatch must fail");
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn rejects_non_mainshock_background_event() {
        let err = validate_assignments(&[0, 1, 1], &[A, M, A]).expect_err("must fail");
        assert!(err.to_string().contains("unclustered event 0"));
    }

    #[test]
    fn rejects_cluster_without_single_mainshock() {
        let err = validate_assignments(&[1, 1], &[A, A]).expect_err("no mainshock");
        assert!(err.to_string().contains("exactly one mainshock; found 0"));

        let err = validate_assignments(&[1, 1], &[M, M]).expect_err("two mainshocks");
        assert!(err.to_string().contains("exactly one mainshock; found 2"));
    }

    #[test]
    fn rejects_gaps_in_cluster_ids() {
        let err = validate_assignments(&[1, 1, 3, 3], &[M, A, M, A]).expect_err("gap at 2");
        assert!(err.to_string().contains("id 2 has no members"));
    }

    #[test]
    fn queries_report_members_mainshocks_and_background() {
        let result = DeclusterResult::new(
            vec![0, 1, 1, 2, 1, 2, 0],
            vec![M, M, F, M, A, A, M],
            Diagnostics::default(),
        )
        .expect("valid result");

        assert_eq!(result.len(), 7);
        assert!(!result.is_empty());
        assert_eq!(result.n_clusters(), 2);
        assert_eq!(result.cluster_members(1), vec![1, 2, 4]);
        assert_eq!(result.cluster_members(2), vec![3, 5]);
        assert!(result.cluster_members(0).is_empty());
        assert_eq!(result.mainshock_of(1), Some(1));
        assert_eq!(result.mainshock_of(2), Some(3));
        assert_eq!(result.mainshock_of(0), None);
        assert_eq!(result.mainshock_of(9), None);
        assert_eq!(result.background_indices(), vec![0, 6]);
        assert_eq!(
            result.independent_mask(),
            vec![true, true, false, true, false, false, true]
        );
        assert_eq!(result.shock_type_codes(), vec![0, 0, -1, 0, 1, 1, 0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn shock_types_serialize_as_integer_codes() {
        let encoded = serde_json::to_string(&vec![F, M, A]).expect("should serialize");
        assert_eq!(encoded, "[-1,0,1]");
        let decoded: Vec<ShockType> = serde_json::from_str("[1,-1]").expect("should parse");
        assert_eq!(decoded, vec![A, F]);
        assert!(serde_json::from_str::<ShockType>("5").is_err());
    }
}
