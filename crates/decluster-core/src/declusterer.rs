// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::{CatalogView, DeclusterError, DeclusterResult, ExecutionContext};

/// Declustering contract: full catalog in, per-event assignment out.
///
/// Implementations hold no state between calls.
pub trait Declusterer {
    fn decluster(
        &self,
        catalog: &CatalogView<'_>,
        ctx: &ExecutionContext<'_>,
    ) -> Result<DeclusterResult, DeclusterError>;
}

#[cfg(test)]
mod tests {
    use super::Declusterer;
    use crate::{
        CatalogView, DeclusterError, DeclusterResult, Diagnostics, EventTimes, ExecutionContext,
        ShockType,
    };
    use std::borrow::Cow;

    /// Treats every event as background.
    struct MockDeclusterer;

    impl Declusterer for MockDeclusterer {
        fn decluster(
            &self,
            catalog: &CatalogView<'_>,
            _ctx: &ExecutionContext<'_>,
        ) -> Result<DeclusterResult, DeclusterError> {
            let diagnostics = Diagnostics {
                n: catalog.len(),
                algorithm: Cow::Borrowed("mock"),
                ..Diagnostics::default()
            };
            DeclusterResult::new(
                vec![0; catalog.len()],
                vec![ShockType::Mainshock; catalog.len()],
                diagnostics,
            )
        }
    }

    #[test]
    fn declusterer_trait_shape_sanity() {
        let magnitude = [3.0, 4.0];
        let coords = [0.0, 0.0];
        let year = [2000, 2000];
        let month = [1, 1];
        let day = [1, 2];
        let catalog = CatalogView::new(
            &magnitude,
            &coords,
            &coords,
            EventTimes::YearMonthDay {
                year: &year,
                month: &month,
                day: &day,
            },
        )
        .expect("catalog should be valid");

        let result = MockDeclusterer
            .decluster(&catalog, &ExecutionContext::new())
            .expect("mock should succeed");
        assert_eq!(result.cluster_ids, vec![0, 0]);
        assert_eq!(result.diagnostics.n, 2);
    }

    #[test]
    fn declusterer_is_object_safe() {
        let boxed: Box<dyn Declusterer> = Box::new(MockDeclusterer);
        let catalog = CatalogView::new(&[], &[], &[], EventTimes::Timestamps(&[]))
            .expect("empty catalog is valid");
        let result = boxed
            .decluster(&catalog, &ExecutionContext::new())
            .expect("mock should succeed");
        assert!(result.is_empty());
    }
}
