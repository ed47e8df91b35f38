use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use records::{REF_ID_MAX_SUFFIX, REF_ID_MIN_SUFFIX, format_ref_id};

/// `FMR-<year>-<suffix>` with the suffix drawn uniformly. Uniqueness is left
/// to the store's issued set.
pub fn generate_ref_id<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> String {
    let suffix = rng.gen_range(REF_ID_MIN_SUFFIX..=REF_ID_MAX_SUFFIX);

    format_ref_id(now.year(), suffix)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rand::{SeedableRng, rngs::StdRng};
    use records::is_well_formed;

    use super::generate_ref_id;

    #[test]
    fn test_generated_ids_are_well_formed() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        for _ in 0..1000 {
            let ref_id = generate_ref_id(&mut rng, now);

            assert!(is_well_formed(&ref_id), "{ref_id}");
            assert!(ref_id.starts_with("FMR-2026-"));

            let suffix: u32 = ref_id[9..].parse().unwrap();
            assert!((10000..=99999).contains(&suffix));
        }
    }
}
