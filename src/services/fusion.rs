use std::collections::{BTreeMap, HashSet};

use crate::models::vendor::VendorRecord;

/// Merge local listings, provider results and social profiles into one
/// de-duplicated, ranked list.
///
/// Ordering: claimed/approved local vendors first, then provider results by
/// the provider's own rank, then social profiles. Duplicates collapse onto
/// the earliest (highest-priority) occurrence, keyed by
/// [`VendorRecord::identity`].
///
/// The business-listing provider has no server-side subcategory filter, so a
/// requested subcategory is enforced here with a text match over
/// name/subcategory/description rather than being silently dropped.
#[must_use]
pub fn fuse(
    local: Vec<VendorRecord>,
    provider: Vec<VendorRecord>,
    social: Vec<VendorRecord>,
    subcategory: Option<&str>,
) -> Vec<VendorRecord> {
    let needle = subcategory.map(str::trim).filter(|s| !s.is_empty());

    let mut provider = provider;
    provider.sort_by_key(|r| r.rank);

    let mut seen = HashSet::new();
    let mut fused: Vec<VendorRecord> = Vec::new();

    for record in local.into_iter().chain(provider).chain(social) {
        if let Some(sub) = needle
            && !record.matches_text(sub)
        {
            continue;
        }
        if !seen.insert(record.identity()) {
            continue;
        }
        fused.push(record);
    }

    for (idx, record) in fused.iter_mut().enumerate() {
        record.rank = u32::try_from(idx + 1).unwrap_or(u32::MAX);
    }

    fused
}

/// Per-source result counts for the response envelope.
#[must_use]
pub fn source_breakdown(records: &[VendorRecord]) -> BTreeMap<&'static str, usize> {
    let mut breakdown = BTreeMap::new();
    for record in records {
        *breakdown.entry(record.source.as_str()).or_insert(0) += 1;
    }
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vendor::VendorSource;

    fn record(name: &str, source: VendorSource, rank: u32) -> VendorRecord {
        VendorRecord {
            name: name.to_string(),
            category: "photographers".into(),
            subcategory: None,
            description: None,
            address: Some(format!("{name} address")),
            city: "Dallas".into(),
            state: "Texas".into(),
            phone: None,
            email: None,
            website: None,
            instagram_handle: None,
            rating: None,
            place_id: None,
            rank,
            source,
        }
    }

    fn partition(records: &[VendorRecord]) -> (Vec<VendorRecord>, Vec<VendorRecord>, Vec<VendorRecord>) {
        let by = |source| {
            records
                .iter()
                .filter(|r| r.source == source)
                .cloned()
                .collect::<Vec<_>>()
        };
        (
            by(VendorSource::Local),
            by(VendorSource::Provider),
            by(VendorSource::Social),
        )
    }

    #[test]
    fn test_ordering_local_provider_social() {
        let fused = fuse(
            vec![record("Claimed Studio", VendorSource::Local, 0)],
            vec![
                record("Maps Two", VendorSource::Provider, 2),
                record("Maps One", VendorSource::Provider, 1),
            ],
            vec![record("IG Studio", VendorSource::Social, 0)],
            None,
        );

        let names: Vec<_> = fused.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Claimed Studio", "Maps One", "Maps Two", "IG Studio"]);

        let ranks: Vec<_> = fused.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, [1, 2, 3, 4]);
    }

    #[test]
    fn test_dedup_prefers_place_id_then_name_address() {
        let mut a = record("Golden Hour", VendorSource::Provider, 1);
        a.place_id = Some("ChIJsame".into());
        let mut b = record("Golden Hour Studio", VendorSource::Provider, 2);
        b.place_id = Some("ChIJsame".into());

        // Same normalized name+address, no place id.
        let c = record("Duplicate Name", VendorSource::Provider, 3);
        let d = record("  duplicate  NAME ", VendorSource::Social, 0);

        let fused = fuse(vec![], vec![a, b, c], vec![d], None);
        assert_eq!(fused.len(), 2);
        assert_eq!(fused[0].name, "Golden Hour");
    }

    #[test]
    fn test_dedup_keeps_highest_priority_source() {
        let mut local = record("Golden Hour", VendorSource::Local, 0);
        local.place_id = Some("ChIJgh".into());
        let mut provider = record("Golden Hour", VendorSource::Provider, 1);
        provider.place_id = Some("ChIJgh".into());

        let fused = fuse(vec![local], vec![provider], vec![], None);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].source, VendorSource::Local);
    }

    #[test]
    fn test_subcategory_text_filter_fallback() {
        let mut matching = record("Aerial Co", VendorSource::Provider, 1);
        matching.description = Some("Drone and aerial wedding photography".into());
        let other = record("Plain Studio", VendorSource::Provider, 2);

        let fused = fuse(vec![], vec![matching, other], vec![], Some("aerial"));
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].name, "Aerial Co");
    }

    #[test]
    fn test_blank_subcategory_filters_nothing() {
        let fused = fuse(
            vec![],
            vec![record("A", VendorSource::Provider, 1)],
            vec![],
            Some("   "),
        );
        assert_eq!(fused.len(), 1);
    }

    #[test]
    fn test_fuse_is_idempotent() {
        let mut tagged = record("Aerial Co", VendorSource::Provider, 1);
        tagged.description = Some("aerial specialist".into());
        let mut social = record("IG Aerial", VendorSource::Social, 0);
        social.description = Some("aerial wedding films".into());

        let first = fuse(
            vec![record("Local Aerial", VendorSource::Local, 0)],
            vec![tagged],
            vec![social],
            Some("aerial"),
        );

        let (local, provider, social) = partition(&first);
        let second = fuse(local, provider, social, Some("aerial"));

        let a: Vec<_> = first.iter().map(|r| (r.name.clone(), r.rank, r.source)).collect();
        let b: Vec<_> = second.iter().map(|r| (r.name.clone(), r.rank, r.source)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_record_tagged_and_counted() {
        let fused = fuse(
            vec![record("L", VendorSource::Local, 0)],
            vec![
                record("P1", VendorSource::Provider, 1),
                record("P2", VendorSource::Provider, 2),
            ],
            vec![record("S", VendorSource::Social, 0)],
            None,
        );

        let breakdown = source_breakdown(&fused);
        assert_eq!(breakdown.get("local"), Some(&1));
        assert_eq!(breakdown.get("provider"), Some(&2));
        assert_eq!(breakdown.get("social"), Some(&1));
        assert_eq!(breakdown.values().sum::<usize>(), fused.len());
    }
}
