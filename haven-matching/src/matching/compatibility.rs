use serde::Serialize;

use crate::models::Profile;

// -- Weights (points out of 100) --
const W_INTERESTS: f64 = 50.0;
const W_STYLE: f64 = 20.0;
const W_AGE: f64 = 15.0;
const W_LOCATION: f64 = 15.0;

/// Age gap at which the age component reaches zero.
const AGE_SPAN_YEARS: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Compatibility {
    pub total: f64,
    pub interests: f64,
    pub communication: f64,
    pub age: f64,
    pub location: f64,
}

/// Score how well `candidate` fits `viewer`, in [0, 100].
///
/// Interest overlap is measured against the viewer's own tags, so sharing one
/// of two interests earns half of the interest weight.
pub fn score(viewer: &Profile, candidate: &Profile) -> Compatibility {
    let interests = interest_score(&viewer.interest_tags(), &candidate.interest_tags());
    let communication = style_score(
        viewer.communication_style.as_deref(),
        candidate.communication_style.as_deref(),
    );
    let age = age_score(viewer.age, candidate.age);
    let location = location_score(viewer.location.as_deref(), candidate.location.as_deref());

    let total = (interests + communication + age + location).clamp(0.0, 100.0);

    Compatibility {
        total: round1(total),
        interests,
        communication,
        age,
        location,
    }
}

pub fn interest_score(viewer: &[String], candidate: &[String]) -> f64 {
    if viewer.is_empty() {
        return 0.0;
    }
    let shared = viewer
        .iter()
        .filter(|tag| candidate.iter().any(|c| c.eq_ignore_ascii_case(tag)))
        .count();
    W_INTERESTS * shared as f64 / viewer.len() as f64
}

fn style_score(viewer: Option<&str>, candidate: Option<&str>) -> f64 {
    match (viewer, candidate) {
        (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => W_STYLE,
        (None, _) | (_, None) => W_STYLE / 2.0,
        _ => 0.0,
    }
}

fn age_score(viewer: Option<i32>, candidate: Option<i32>) -> f64 {
    match (viewer, candidate) {
        (Some(a), Some(b)) => {
            let diff = a.abs_diff(b) as f64;
            W_AGE * (1.0 - diff / AGE_SPAN_YEARS).max(0.0)
        }
        _ => W_AGE / 2.0,
    }
}

fn location_score(viewer: Option<&str>, candidate: Option<&str>) -> f64 {
    match (viewer, candidate) {
        (Some(a), Some(b)) if a.trim().eq_ignore_ascii_case(b.trim()) => W_LOCATION,
        (None, _) | (_, None) => 5.0,
        _ => 0.0,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::profile_with;

    #[test]
    fn half_interest_overlap_earns_partial_credit() {
        let viewer = profile_with(|p| p.interests = serde_json::json!(["Coding", "Cats"]));
        let candidate = profile_with(|p| p.interests = serde_json::json!(["Coding", "Hiking"]));

        let result = score(&viewer, &candidate);
        assert!(result.interests > 0.0 && result.interests < 50.0);
        assert_eq!(result.interests, 25.0);
        assert!((0.0..=100.0).contains(&result.total));
    }

    #[test]
    fn identical_profiles_score_full_marks() {
        let make = || {
            profile_with(|p| {
                p.interests = serde_json::json!(["Art", "Gaming"]);
                p.communication_style = Some("direct".into());
                p.age = Some(29);
                p.location = Some("Portland".into());
            })
        };
        assert_eq!(score(&make(), &make()).total, 100.0);
    }

    #[test]
    fn interest_matching_ignores_case() {
        let shared = interest_score(&["coding".into()], &["CODING".into()]);
        assert_eq!(shared, 50.0);
    }

    #[test]
    fn extreme_ages_do_not_overflow() {
        assert_eq!(age_score(Some(i32::MAX), Some(-1)), 0.0);
        assert_eq!(age_score(Some(30), Some(30)), W_AGE);
    }

    #[test]
    fn empty_profiles_stay_in_range() {
        let blank = profile_with(|_| {});
        let result = score(&blank, &blank);
        assert_eq!(result.interests, 0.0);
        assert!((0.0..=100.0).contains(&result.total));
    }

    #[test]
    fn large_age_gap_zeroes_age_component() {
        assert_eq!(age_score(Some(20), Some(60)), 0.0);
        assert_eq!(age_score(Some(30), Some(30)), W_AGE);
    }
}
