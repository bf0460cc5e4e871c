// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Owned synthetic catalog for benchmarks.
#[derive(Clone, Debug)]
pub struct SyntheticCatalog {
    pub magnitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub year: Vec<i32>,
    pub month: Vec<u32>,
    pub day: Vec<u32>,
}

fn lcg_next(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    *state
}

fn unit(state: &mut u64) -> f64 {
    (lcg_next(state) >> 11) as f64 / (1u64 << 53) as f64
}

impl SyntheticCatalog {
    /// Deterministic catalog of `n` events over a 5x5 degree region and ten
    /// years. Magnitudes follow a Gutenberg-Richter law with b = 1 on [2, 7],
    /// and a fifth of the events are placed close to an earlier event so that
    /// clusters actually form.
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut state = seed ^ 0xfeed_f00d_dead_beef_u64;
        let mut catalog = Self {
            magnitude: Vec::with_capacity(n),
            longitude: Vec::with_capacity(n),
            latitude: Vec::with_capacity(n),
            year: Vec::with_capacity(n),
            month: Vec::with_capacity(n),
            day: Vec::with_capacity(n),
        };

        for idx in 0..n {
            let magnitude = 2.0 - unit(&mut state).max(1.0e-5).log10();
            let (longitude, latitude, year, month, day) = if idx > 0 && lcg_next(&mut state) % 5 == 0
            {
                let parent = (lcg_next(&mut state) as usize) % idx;
                let day = (catalog.day[parent] + (lcg_next(&mut state) % 3) as u32).min(28);
                (
                    catalog.longitude[parent] + (unit(&mut state) - 0.5) * 0.1,
                    catalog.latitude[parent] + (unit(&mut state) - 0.5) * 0.1,
                    catalog.year[parent],
                    catalog.month[parent],
                    day,
                )
            } else {
                (
                    unit(&mut state) * 5.0,
                    40.0 + unit(&mut state) * 5.0,
                    2000 + (lcg_next(&mut state) % 10) as i32,
                    1 + (lcg_next(&mut state) % 12) as u32,
                    1 + (lcg_next(&mut state) % 28) as u32,
                )
            };

            catalog.magnitude.push(magnitude);
            catalog.longitude.push(longitude);
            catalog.latitude.push(latitude);
            catalog.year.push(year);
            catalog.month.push(month);
            catalog.day.push(day);
        }

        catalog
    }

    pub fn len(&self) -> usize {
        self.magnitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude.is_empty()
    }

    pub fn view(&self) -> Result<decluster_core::CatalogView<'_>, decluster_core::DeclusterError> {
        decluster_core::CatalogView::new(
            &self.magnitude,
            &self.longitude,
            &self.latitude,
            decluster_core::EventTimes::YearMonthDay {
                year: &self.year,
                month: &self.month,
                day: &self.day,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::SyntheticCatalog;

    #[test]
    fn generation_is_deterministic_and_valid() {
        let a = SyntheticCatalog::generate(500, 7);
        let b = SyntheticCatalog::generate(500, 7);
        assert_eq!(a.magnitude, b.magnitude);
        assert_eq!(a.len(), 500);
        assert!(a.magnitude.iter().all(|&m| (2.0..=7.0).contains(&m)));
        assert!(a.day.iter().all(|&d| (1..=28).contains(&d)));
        a.view().expect("synthetic catalog should be valid");
    }
}
