//! Matching signatures against the reference patterns.

use log::info;

use crate::graphlets::Graphlet;
use crate::patterns::{reference_patterns, PatternKind, ReferencePattern};
use crate::signature::Signature;
use crate::Error;

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifierConfig {
    /// Minimum cosine similarity for a pattern to be reported.
    pub threshold: f64,
    /// Number of ranked matches to return.
    pub top_k: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            top_k: 3,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::ThresholdOutOfRange {
                got: self.threshold,
            });
        }
        if self.top_k < 1 {
            return Err(Error::ZeroTopK);
        }
        Ok(())
    }
}

/// One graphlet's share of a match score.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Evidence {
    pub graphlet: Graphlet,
    pub contribution: f64,
}

/// A reference pattern together with how well the signature matches it.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PatternMatch {
    pub pattern: PatternKind,
    pub score: f64,
    /// The three largest per-component contributions to the score.
    pub evidence: Vec<Evidence>,
    pub recommendations: &'static [&'static str],
    /// Set when no pattern reached the threshold and this is merely the
    /// nearest one.
    pub low_confidence: bool,
}

impl PatternMatch {
    /// The reporting label: the pattern name, or `UNKNOWN` for a
    /// low-confidence nearest match.
    pub fn label(&self) -> &'static str {
        if self.low_confidence {
            "UNKNOWN"
        } else {
            self.pattern.name()
        }
    }
}

/// Ranks the reference patterns against the signature.
///
/// Patterns scoring at least the configured threshold (and their own
/// minimum confidence) are returned best-first, ties broken by name. When
/// nothing qualifies, the single nearest pattern is returned flagged
/// low-confidence. An all-zero signature yields no matches at all.
pub fn classify(signature: &Signature, config: &ClassifierConfig) -> Result<Vec<PatternMatch>, Error> {
    config.validate()?;

    if signature.is_zero() {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(&'static ReferencePattern, f64)> = reference_patterns()
        .iter()
        .map(|pattern| (pattern, signature.cosine(&pattern.signature)))
        .collect();
    scored.sort_by(|a, b| {
        b.1.total_cmp(&a.1)
            .then_with(|| a.0.kind.name().cmp(b.0.kind.name()))
    });

    let mut matches: Vec<PatternMatch> = scored
        .iter()
        .filter(|(pattern, score)| *score >= config.threshold.max(pattern.min_confidence))
        .take(config.top_k)
        .map(|&(pattern, score)| to_match(signature, pattern, score, false))
        .collect();

    if matches.is_empty() {
        // `scored` is never empty: the pattern table is built in.
        let &(nearest, score) = &scored[0];
        matches.push(to_match(signature, nearest, score, true));
    }

    info!(
        "Classified as {} (score {:.3}) out of {} candidates",
        matches[0].label(),
        matches[0].score,
        scored.len()
    );

    Ok(matches)
}

fn to_match(
    signature: &Signature,
    pattern: &ReferencePattern,
    score: f64,
    low_confidence: bool,
) -> PatternMatch {
    let mut contributions: Vec<Evidence> = Graphlet::ALL
        .iter()
        .map(|&graphlet| Evidence {
            graphlet,
            contribution: signature.component(graphlet) * pattern.signature.component(graphlet),
        })
        .collect();
    contributions.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| a.graphlet.index().cmp(&b.graphlet.index()))
    });
    contributions.truncate(3);

    PatternMatch {
        pattern: pattern.kind,
        score,
        evidence: contributions,
        recommendations: pattern.recommendations,
        low_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::reference_patterns;

    fn config(threshold: f64, top_k: usize) -> ClassifierConfig {
        ClassifierConfig { threshold, top_k }
    }

    #[test]
    fn validates_threshold_and_top_k() {
        assert!(matches!(
            classify(&Signature::from_raw([0.0; 9]), &config(1.5, 3)),
            Err(Error::ThresholdOutOfRange { .. })
        ));
        assert!(matches!(
            classify(&Signature::from_raw([0.0; 9]), &config(0.5, 0)),
            Err(Error::ZeroTopK)
        ));
    }

    #[test]
    fn zero_signature_yields_no_matches() {
        let matches = classify(&Signature::from_raw([0.0; 9]), &ClassifierConfig::default()).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn each_reference_matches_itself_perfectly() {
        for pattern in reference_patterns() {
            let matches = classify(&pattern.signature, &ClassifierConfig::default()).unwrap();
            assert_eq!(matches[0].pattern, pattern.kind);
            assert!((matches[0].score - 1.0).abs() < 1e-9);
            assert!(!matches[0].low_confidence);
            assert_eq!(matches[0].label(), pattern.kind.name());
        }
    }

    #[test]
    fn nothing_above_threshold_reports_nearest_as_unknown() {
        // A pure-diamond signature resembles no reference.
        let odd = Signature::from_raw([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let matches = classify(&odd, &ClassifierConfig::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].low_confidence);
        assert_eq!(matches[0].label(), "UNKNOWN");
        assert!(matches[0].score < 0.6);
    }

    #[test]
    fn top_k_truncates_the_ranking() {
        let sequential = reference_patterns()[0].signature;
        let matches = classify(&sequential, &config(0.0, 2)).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].score >= matches[1].score);
    }

    #[test]
    fn evidence_tracks_the_dominant_components() {
        let working_set = reference_patterns()
            .iter()
            .find(|p| p.kind == PatternKind::WorkingSet)
            .unwrap();
        let matches = classify(&working_set.signature, &ClassifierConfig::default()).unwrap();
        let top = &matches[0];
        assert_eq!(top.evidence.len(), 3);
        assert_eq!(top.evidence[0].graphlet, Graphlet::FourClique);
    }
}
